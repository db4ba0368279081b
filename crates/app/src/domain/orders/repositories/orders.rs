//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use nexus::{
    checkout::CustomerContact, order_number::OrderNumber, pricing::PriceBreakdown,
    status::Transition,
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{try_get_optional_timestamp, try_get_parsed},
    domain::{
        accounts::records::UserUuid,
        catalog::records::BusinessUuid,
        orders::{
            data::{NewOrder, OrderFilter},
            records::{OrderRecord, OrderUuid},
        },
    },
};

const INSERT_ORDER_SQL: &str = include_str!("../sql/insert_order.sql");
const ORDER_NUMBER_EXISTS_SQL: &str = include_str!("../sql/order_number_exists.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const GET_ORDER_BY_NUMBER_SQL: &str = include_str!("../sql/get_order_by_number.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const SET_ESTIMATED_DELIVERY_TIME_SQL: &str =
    include_str!("../sql/set_estimated_delivery_time.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Inserts the order under `number` unless that number is already taken, in which case
    /// `None` is returned and nothing is written.
    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
        number: &OrderNumber,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let (address, latitude, longitude, notes) = match &order.delivery {
            Some(delivery) => (
                Some(delivery.address.as_str()),
                Some(delivery.location.latitude()),
                Some(delivery.location.longitude()),
                delivery.notes.as_deref(),
            ),
            None => (None, None, None, None),
        };

        query_as::<Postgres, OrderRecord>(INSERT_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(number.as_str())
            .bind(order.customer_uuid.into_uuid())
            .bind(order.business_uuid.into_uuid())
            .bind(order.delivery_method.as_str())
            .bind(order.pricing.subtotal())
            .bind(order.pricing.delivery_fee())
            .bind(order.pricing.service_fee())
            .bind(order.pricing.tax_amount())
            .bind(order.pricing.discount_amount())
            .bind(order.pricing.total_amount())
            .bind(order.contact.name.as_str())
            .bind(order.contact.phone.as_str())
            .bind(order.contact.email.as_deref())
            .bind(address)
            .bind(latitude)
            .bind(longitude)
            .bind(notes)
            .bind(order.payment_method.as_deref())
            .bind(order.special_instructions.as_deref())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn order_number_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        number: &OrderNumber,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(ORDER_NUMBER_EXISTS_SQL)
            .bind(number.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_by_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        number: &OrderNumber,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_BY_NUMBER_SQL)
            .bind(number.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetches the order and holds its row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Orders placed by `user`, or received by businesses `user` owns when `as_owner`.
    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        as_owner: bool,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .bind(as_owner)
            .bind(filter.status.map(|status| status.as_str()))
            .bind(filter.delivery_method.map(|method| method.as_str()))
            .bind(filter.business_uuid.map(BusinessUuid::into_uuid))
            .bind(filter.active_only)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn apply_transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        transition: &Transition,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(transition.to().as_str())
            .bind(transition.stamps_confirmed_at())
            .bind(transition.stamps_delivered_at())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_estimated_delivery_time(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        estimated: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_ESTIMATED_DELIVERY_TIME_SQL)
            .bind(order.into_uuid())
            .bind(SqlxTimestamp::from(estimated))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            order_number: try_get_parsed(row, "order_number")?,
            customer_uuid: UserUuid::from_uuid(row.try_get("customer_uuid")?),
            business_uuid: BusinessUuid::from_uuid(row.try_get("business_uuid")?),
            status: try_get_parsed(row, "status")?,
            delivery_method: try_get_parsed(row, "delivery_method")?,
            pricing: PriceBreakdown::new(
                row.try_get("subtotal")?,
                row.try_get("delivery_fee")?,
                row.try_get("service_fee")?,
                row.try_get("tax_amount")?,
                row.try_get("discount_amount")?,
            ),
            contact: CustomerContact {
                name: row.try_get("customer_name")?,
                phone: row.try_get("customer_phone")?,
                email: row.try_get("customer_email")?,
            },
            delivery_address: row.try_get("delivery_address")?,
            delivery_latitude: row.try_get("delivery_latitude")?,
            delivery_longitude: row.try_get("delivery_longitude")?,
            delivery_notes: row.try_get("delivery_notes")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            payment_method: row.try_get("payment_method")?,
            payment_reference: row.try_get("payment_reference")?,
            special_instructions: row.try_get("special_instructions")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            confirmed_at: try_get_optional_timestamp(row, "confirmed_at")?,
            estimated_delivery_time: try_get_optional_timestamp(row, "estimated_delivery_time")?,
            delivered_at: try_get_optional_timestamp(row, "delivered_at")?,
        })
    }
}
