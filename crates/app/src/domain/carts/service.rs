//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        accounts::records::UserUuid,
        carts::{
            data::{CartItemChange, CartItemUpdate, NewCartItem, PriceRepair},
            errors::CartsServiceError,
            models::Cart,
            records::{CartItemRecord, CartItemUuid, CartRecord},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        catalog::{PgCatalogRepository, records::BusinessUuid},
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    catalog_repository: PgCatalogRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            catalog_repository: PgCatalogRepository::new(),
        }
    }
}

fn change_for(
    cart: CartRecord,
    items: Vec<CartItemRecord>,
    item: CartItemUuid,
) -> Result<CartItemChange, CartsServiceError> {
    let line = items
        .iter()
        .find(|line| line.uuid == item)
        .cloned()
        .ok_or(CartsServiceError::NotFound)?;

    Ok(CartItemChange {
        item: line,
        cart: Cart::assemble(cart, items),
    })
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user)
            .await?;

        let items = self.items_repository.list_items(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        Ok(Cart::assemble(cart, items))
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(user_uuid = %user, product_uuid = %item.product_uuid, quantity = %item.quantity),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemChange, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self
            .catalog_repository
            .get_active_product(&mut tx, item.product_uuid)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CartsServiceError::ProductNotFound,
                other => other.into(),
            })?;

        if !product.in_stock() {
            return Err(CartsServiceError::OutOfStock {
                product: product.name,
            });
        }

        let unit_price = item.unit_price.unwrap_or(product.price);

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user)
            .await?;

        let item_uuid = self
            .items_repository
            .upsert_item(&mut tx, cart.uuid, item, unit_price)
            .await?;

        let items = self.items_repository.list_items(&mut tx, cart.uuid).await?;
        let change = change_for(cart, items, item_uuid)?;

        tx.commit().await?;

        debug!(
            cart_uuid = %change.cart.uuid,
            cart_item_uuid = %item_uuid,
            quantity = %change.item.quantity,
            "added cart item"
        );

        Ok(change)
    }

    #[tracing::instrument(
        name = "carts.service.update_item",
        skip(self, update),
        fields(user_uuid = %user, cart_item_uuid = %item, quantity = %update.quantity),
        err
    )]
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartItemChange, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user)
            .await?;

        let rows_affected = self
            .items_repository
            .update_item(&mut tx, cart.uuid, item, update)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let items = self.items_repository.list_items(&mut tx, cart.uuid).await?;
        let change = change_for(cart, items, item)?;

        tx.commit().await?;

        debug!(cart_item_uuid = %item, "updated cart item");

        Ok(change)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, cart_item_uuid = %item),
        err
    )]
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user)
            .await?;

        let rows_affected = self
            .items_repository
            .delete_item(&mut tx, cart.uuid, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        debug!(cart_item_uuid = %item, "removed cart item");

        Ok(())
    }

    async fn get_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartItemRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user)
            .await?;

        let line = self.items_repository.get_item(&mut tx, cart.uuid, item).await?;

        tx.commit().await?;

        Ok(line)
    }

    #[tracing::instrument(name = "carts.service.clear", skip(self), fields(user_uuid = %user), err)]
    async fn clear(&self, user: UserUuid) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user)
            .await?;

        let removed = self.items_repository.clear(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        debug!(cart_uuid = %cart.uuid, removed, "cleared cart");

        Ok(removed)
    }

    #[tracing::instrument(
        name = "carts.service.clear_business",
        skip(self),
        fields(user_uuid = %user, business_uuid = %business),
        err
    )]
    async fn clear_business(
        &self,
        user: UserUuid,
        business: BusinessUuid,
    ) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, user)
            .await?;

        let removed = self
            .items_repository
            .clear_business(&mut tx, cart.uuid, business)
            .await?;

        tx.commit().await?;

        debug!(cart_uuid = %cart.uuid, removed, "cleared business items from cart");

        Ok(removed)
    }

    #[tracing::instrument(
        name = "carts.service.merge_carts",
        skip(self),
        fields(source_user_uuid = %source, target_user_uuid = %target),
        err
    )]
    async fn merge_carts(&self, source: UserUuid, target: UserUuid) -> Result<Cart, CartsServiceError> {
        if source == target {
            return self.get_cart(target).await;
        }

        let mut tx = self.db.begin().await?;

        let source_cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, source)
            .await?;

        let target_cart = self
            .carts_repository
            .get_or_create_cart(&mut tx, target)
            .await?;

        let (merged, moved) = self
            .items_repository
            .merge_into(&mut tx, source_cart.uuid, target_cart.uuid)
            .await?;

        let items = self
            .items_repository
            .list_items(&mut tx, target_cart.uuid)
            .await?;

        tx.commit().await?;

        info!(
            source_cart_uuid = %source_cart.uuid,
            target_cart_uuid = %target_cart.uuid,
            merged,
            moved,
            "merged carts"
        );

        Ok(Cart::assemble(target_cart, items))
    }

    #[tracing::instrument(name = "carts.service.repair_unit_prices", skip(self), err)]
    async fn repair_unit_prices(&self) -> Result<PriceRepair, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let (repriced, removed) = self.items_repository.repair_unit_prices(&mut tx).await?;

        tx.commit().await?;

        info!(repriced, removed, "repaired cart item prices");

        Ok(PriceRepair { repriced, removed })
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the user's cart, creating an empty one on first access.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add a product to the user's cart.
    ///
    /// Adding a product already in the cart increases the quantity of the existing line.
    async fn add_item(
        &self,
        user: UserUuid,
        item: NewCartItem,
    ) -> Result<CartItemChange, CartsServiceError>;

    /// Replace the quantity and notes of a line in the user's cart.
    async fn update_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartItemChange, CartsServiceError>;

    /// Remove a line from the user's cart.
    async fn remove_item(&self, user: UserUuid, item: CartItemUuid) -> Result<(), CartsServiceError>;

    /// Retrieve a single line of the user's cart.
    async fn get_item(
        &self,
        user: UserUuid,
        item: CartItemUuid,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Remove every line, returning how many were removed.
    async fn clear(&self, user: UserUuid) -> Result<u64, CartsServiceError>;

    /// Remove the lines for one business, returning how many were removed.
    async fn clear_business(
        &self,
        user: UserUuid,
        business: BusinessUuid,
    ) -> Result<u64, CartsServiceError>;

    /// Move every line of `source`'s cart into `target`'s cart.
    async fn merge_carts(&self, source: UserUuid, target: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Fix lines stored without a price.
    async fn repair_unit_prices(&self) -> Result<PriceRepair, CartsServiceError>;
}
