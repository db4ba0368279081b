//! Checkout Repository
//!
//! Cart lines as seen by checkout.

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::try_get_parsed,
    domain::{
        accounts::records::UserUuid,
        carts::records::CartItemUuid,
        catalog::records::{BusinessUuid, ProductUuid},
        orders::records::CheckoutLine,
    },
};

use super::try_get_quantity;

const LOCK_CHECKOUT_LINES_SQL: &str = include_str!("../sql/lock_checkout_lines.sql");
const DELETE_CHECKOUT_LINES_SQL: &str = include_str!("../sql/delete_checkout_lines.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCheckoutRepository;

impl PgCheckoutRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Locks the customer's cart lines for products of `business`.
    pub(crate) async fn lock_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: UserUuid,
        business: BusinessUuid,
    ) -> Result<Vec<CheckoutLine>, sqlx::Error> {
        query_as::<Postgres, CheckoutLine>(LOCK_CHECKOUT_LINES_SQL)
            .bind(customer.into_uuid())
            .bind(business.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn delete_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        lines: &[CheckoutLine],
    ) -> Result<u64, sqlx::Error> {
        let uuids: Vec<Uuid> = lines
            .iter()
            .map(|line| line.cart_item_uuid.into_uuid())
            .collect();

        let rows_affected = query(DELETE_CHECKOUT_LINES_SQL)
            .bind(uuids)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CheckoutLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            cart_item_uuid: CartItemUuid::from_uuid(row.try_get("cart_item_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            product_description: row.try_get("product_description")?,
            product_status: try_get_parsed(row, "product_status")?,
            track_inventory: row.try_get("track_inventory")?,
            stock_quantity: row.try_get("stock_quantity")?,
            quantity: try_get_quantity(row, "quantity")?,
            unit_price: row.try_get("unit_price")?,
            notes: row.try_get("notes")?,
        })
    }
}
