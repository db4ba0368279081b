//! Status History Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use nexus::status::OrderStatus;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::try_get_parsed,
    domain::{
        accounts::records::UserUuid,
        orders::records::{OrderUuid, StatusHistoryRecord, StatusHistoryUuid},
    },
};

const INSERT_STATUS_HISTORY_SQL: &str = include_str!("../sql/insert_status_history.sql");
const LIST_STATUS_HISTORY_SQL: &str = include_str!("../sql/list_status_history.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgStatusHistoryRepository;

impl PgStatusHistoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Appends a history entry. Entries are never updated or deleted.
    pub(crate) async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        notes: &str,
        created_by: Option<UserUuid>,
    ) -> Result<StatusHistoryRecord, sqlx::Error> {
        query_as::<Postgres, StatusHistoryRecord>(INSERT_STATUS_HISTORY_SQL)
            .bind(StatusHistoryUuid::new().into_uuid())
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(notes)
            .bind(created_by.map(UserUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    /// Newest first.
    pub(crate) async fn list(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<StatusHistoryRecord>, sqlx::Error> {
        query_as::<Postgres, StatusHistoryRecord>(LIST_STATUS_HISTORY_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for StatusHistoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: StatusHistoryUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            status: try_get_parsed(row, "status")?,
            notes: row.try_get("notes")?,
            created_by: row
                .try_get::<Option<Uuid>, _>("created_by")?
                .map(UserUuid::from_uuid),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
