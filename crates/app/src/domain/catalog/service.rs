//! Catalog service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::catalog::{
        data::{NewBusiness, NewProduct, ProductUpdate},
        errors::CatalogServiceError,
        records::{BusinessRecord, BusinessUuid, ProductRecord, ProductUuid},
        repository::PgCatalogRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCatalogService {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogService for PgCatalogService {
    #[tracing::instrument(
        name = "catalog.service.create_business",
        skip(self, business),
        fields(business_uuid = %business.uuid, owner_uuid = %business.owner_uuid),
        err
    )]
    async fn create_business(
        &self,
        business: NewBusiness,
    ) -> Result<BusinessRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_business(&mut tx, business).await?;

        tx.commit().await?;

        info!(business_uuid = %created.uuid, "created business");

        Ok(created)
    }

    async fn get_business(&self, uuid: BusinessUuid) -> Result<BusinessRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let business = self.repository.get_business(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(business)
    }

    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(product_uuid = %product.uuid, business_uuid = %product.business_uuid),
        err
    )]
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        Ok(created)
    }

    async fn get_product(&self, uuid: ProductUuid) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn get_active_product(
        &self,
        uuid: ProductUuid,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_active_product(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(product)
    }

    #[tracing::instrument(
        name = "catalog.service.update_product",
        skip(self, update),
        fields(product_uuid = %uuid),
        err
    )]
    async fn update_product(
        &self,
        uuid: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, CatalogServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self.repository.update_product(&mut tx, uuid, update).await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
/// Catalog lookups used by carts and checkout.
pub trait CatalogService: Send + Sync {
    /// Creates a business.
    async fn create_business(
        &self,
        business: NewBusiness,
    ) -> Result<BusinessRecord, CatalogServiceError>;

    /// Retrieves a single business.
    async fn get_business(&self, uuid: BusinessUuid) -> Result<BusinessRecord, CatalogServiceError>;

    /// Creates a product.
    async fn create_product(&self, product: NewProduct) -> Result<ProductRecord, CatalogServiceError>;

    /// Retrieves a single product regardless of its status.
    async fn get_product(&self, uuid: ProductUuid) -> Result<ProductRecord, CatalogServiceError>;

    /// Retrieves a product only while it is active; inactive products are `NotFound`.
    async fn get_active_product(
        &self,
        uuid: ProductUuid,
    ) -> Result<ProductRecord, CatalogServiceError>;

    /// Changes price, status or stock of a product.
    async fn update_product(
        &self,
        uuid: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, CatalogServiceError>;
}
