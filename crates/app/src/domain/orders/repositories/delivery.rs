//! Delivery Info Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_optional_timestamp,
    domain::orders::{
        data::DeliveryInfoUpdate,
        records::{DeliveryInfoRecord, DeliveryInfoUuid, OrderUuid},
    },
};

const UPSERT_DELIVERY_INFO_SQL: &str = include_str!("../sql/upsert_delivery_info.sql");
const GET_DELIVERY_INFO_SQL: &str = include_str!("../sql/get_delivery_info.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDeliveryInfoRepository;

impl PgDeliveryInfoRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Creates the order's delivery info, or updates the fields set in `update`.
    pub(crate) async fn upsert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        update: DeliveryInfoUpdate,
    ) -> Result<DeliveryInfoRecord, sqlx::Error> {
        query_as::<Postgres, DeliveryInfoRecord>(UPSERT_DELIVERY_INFO_SQL)
            .bind(DeliveryInfoUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(update.driver_name)
            .bind(update.driver_phone)
            .bind(update.vehicle_info)
            .bind(update.estimated_arrival.map(SqlxTimestamp::from))
            .bind(update.actual_arrival.map(SqlxTimestamp::from))
            .bind(update.delivery_notes)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Option<DeliveryInfoRecord>, sqlx::Error> {
        query_as::<Postgres, DeliveryInfoRecord>(GET_DELIVERY_INFO_SQL)
            .bind(order.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for DeliveryInfoRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: DeliveryInfoUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            driver_name: row.try_get("driver_name")?,
            driver_phone: row.try_get("driver_phone")?,
            vehicle_info: row.try_get("vehicle_info")?,
            estimated_arrival: try_get_optional_timestamp(row, "estimated_arrival")?,
            actual_arrival: try_get_optional_timestamp(row, "actual_arrival")?,
            delivery_notes: row.try_get("delivery_notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
