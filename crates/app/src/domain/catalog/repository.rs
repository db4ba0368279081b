//! Catalog Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::try_get_parsed,
    domain::{
        accounts::records::UserUuid,
        catalog::{
            data::{NewBusiness, NewProduct, ProductUpdate},
            records::{BusinessRecord, BusinessUuid, ProductRecord, ProductUuid},
        },
    },
};

const CREATE_BUSINESS_SQL: &str = include_str!("sql/create_business.sql");
const GET_BUSINESS_SQL: &str = include_str!("sql/get_business.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_ACTIVE_PRODUCT_SQL: &str = include_str!("sql/get_active_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_business(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business: NewBusiness,
    ) -> Result<BusinessRecord, sqlx::Error> {
        query_as::<Postgres, BusinessRecord>(CREATE_BUSINESS_SQL)
            .bind(business.uuid.into_uuid())
            .bind(business.owner_uuid.into_uuid())
            .bind(business.name)
            .bind(business.email)
            .bind(business.latitude)
            .bind(business.longitude)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_business(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business: BusinessUuid,
    ) -> Result<BusinessRecord, sqlx::Error> {
        query_as::<Postgres, BusinessRecord>(GET_BUSINESS_SQL)
            .bind(business.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.business_uuid.into_uuid())
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.track_inventory)
            .bind(product.stock_quantity)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetches a product only while it is listed as active.
    pub(crate) async fn get_active_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_ACTIVE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.price)
            .bind(update.status.map(|status| status.as_str()))
            .bind(update.stock_quantity)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for BusinessRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: BusinessUuid::from_uuid(row.try_get("uuid")?),
            owner_uuid: UserUuid::from_uuid(row.try_get("owner_uuid")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            business_uuid: BusinessUuid::from_uuid(row.try_get("business_uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            status: try_get_parsed(row, "status")?,
            track_inventory: row.try_get("track_inventory")?,
            stock_quantity: row.try_get("stock_quantity")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
