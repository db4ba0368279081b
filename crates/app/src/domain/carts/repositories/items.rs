//! Cart Items Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use nexus::carts::Quantity;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    carts::{
        data::{CartItemUpdate, NewCartItem},
        records::{CartItemRecord, CartItemUuid, CartUuid},
    },
    catalog::records::{BusinessUuid, ProductUuid},
};

const LIST_CART_ITEMS_SQL: &str = include_str!("../sql/list_cart_items.sql");
const GET_CART_ITEM_SQL: &str = include_str!("../sql/get_cart_item.sql");
const UPSERT_CART_ITEM_SQL: &str = include_str!("../sql/upsert_cart_item.sql");
const UPDATE_CART_ITEM_SQL: &str = include_str!("../sql/update_cart_item.sql");
const DELETE_CART_ITEM_SQL: &str = include_str!("../sql/delete_cart_item.sql");
const CLEAR_CART_SQL: &str = include_str!("../sql/clear_cart.sql");
const CLEAR_BUSINESS_ITEMS_SQL: &str = include_str!("../sql/clear_business_items.sql");
const MERGE_OVERLAPPING_ITEMS_SQL: &str = include_str!("../sql/merge_overlapping_items.sql");
const DELETE_MERGED_ITEMS_SQL: &str = include_str!("../sql/delete_merged_items.sql");
const MOVE_CART_ITEMS_SQL: &str = include_str!("../sql/move_cart_items.sql");
const REPRICE_CART_ITEMS_SQL: &str = include_str!("../sql/reprice_cart_items.sql");
const DELETE_UNPRICED_CART_ITEMS_SQL: &str = include_str!("../sql/delete_unpriced_cart_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<Vec<CartItemRecord>, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(LIST_CART_ITEMS_SQL)
            .bind(cart.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<CartItemRecord, sqlx::Error> {
        query_as::<Postgres, CartItemRecord>(GET_CART_ITEM_SQL)
            .bind(cart.into_uuid())
            .bind(item.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Inserts the line, or adds to the quantity of the existing line for the same product.
    pub(crate) async fn upsert_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: NewCartItem,
        unit_price: Decimal,
    ) -> Result<CartItemUuid, sqlx::Error> {
        let uuid: Uuid = query_scalar(UPSERT_CART_ITEM_SQL)
            .bind(CartItemUuid::new().into_uuid())
            .bind(cart.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(item.quantity.as_i32())
            .bind(unit_price)
            .bind(item.notes)
            .fetch_one(&mut **tx)
            .await?;

        Ok(CartItemUuid::from_uuid(uuid))
    }

    pub(crate) async fn update_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_CART_ITEM_SQL)
            .bind(cart.into_uuid())
            .bind(item.into_uuid())
            .bind(update.quantity.as_i32())
            .bind(update.notes)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        item: CartItemUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEM_SQL)
            .bind(cart.into_uuid())
            .bind(item.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_CART_SQL)
            .bind(cart.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn clear_business(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: CartUuid,
        business: BusinessUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_BUSINESS_ITEMS_SQL)
            .bind(cart.into_uuid())
            .bind(business.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Moves every line of `source` into `target`, summing quantities of shared products.
    ///
    /// Returns `(merged, moved)`: lines folded into an existing target line and lines
    /// re-homed unchanged.
    pub(crate) async fn merge_into(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        source: CartUuid,
        target: CartUuid,
    ) -> Result<(u64, u64), sqlx::Error> {
        let merged = query(MERGE_OVERLAPPING_ITEMS_SQL)
            .bind(source.into_uuid())
            .bind(target.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        query(DELETE_MERGED_ITEMS_SQL)
            .bind(source.into_uuid())
            .bind(target.into_uuid())
            .execute(&mut **tx)
            .await?;

        let moved = query(MOVE_CART_ITEMS_SQL)
            .bind(source.into_uuid())
            .bind(target.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok((merged, moved))
    }

    /// Gives zero-priced lines the live product price, then drops lines whose product is
    /// still unpriced. Returns `(repriced, removed)`.
    pub(crate) async fn repair_unit_prices(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<(u64, u64), sqlx::Error> {
        let repriced = query(REPRICE_CART_ITEMS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        let removed = query(DELETE_UNPRICED_CART_ITEMS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok((repriced, removed))
    }
}

impl<'r> FromRow<'r, PgRow> for CartItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            uuid: CartItemUuid::from_uuid(row.try_get("uuid")?),
            cart_uuid: CartUuid::from_uuid(row.try_get("cart_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            business_uuid: BusinessUuid::from_uuid(row.try_get("business_uuid")?),
            business_name: row.try_get("business_name")?,
            quantity: Quantity::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
                index: "quantity".to_string(),
                source: Box::new(e),
            })?,
            unit_price: row.try_get("unit_price")?,
            notes: row.try_get("notes")?,
            is_available: row.try_get("is_available")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
