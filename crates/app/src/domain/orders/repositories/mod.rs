//! Order Repositories

use std::error::Error as StdError;

use nexus::carts::Quantity;
use sqlx::{Row, postgres::PgRow};

mod analytics;
mod checkout;
mod delivery;
mod history;
mod items;
mod orders;
mod ratings;

pub(crate) use analytics::PgAnalyticsRepository;
pub(crate) use checkout::PgCheckoutRepository;
pub(crate) use delivery::PgDeliveryInfoRepository;
pub(crate) use history::PgStatusHistoryRepository;
pub(crate) use items::PgOrderItemsRepository;
pub(crate) use orders::PgOrdersRepository;
pub(crate) use ratings::PgRatingsRepository;

/// Decode error for a column whose stored value fails domain validation.
pub(super) fn column_error<E>(col: &str, error: E) -> sqlx::Error
where
    E: StdError + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(error),
    }
}

/// Read an `INTEGER` quantity column.
pub(super) fn try_get_quantity(row: &PgRow, col: &str) -> Result<Quantity, sqlx::Error> {
    let quantity: i32 = row.try_get(col)?;

    Quantity::try_from(quantity).map_err(|e| column_error(col, e))
}
