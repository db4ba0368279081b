//! Orders service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::{Timestamp, tz::TimeZone};
use mockall::automock;
use nexus::{
    carts::line_total,
    checkout::{DeliveryMethod, check_lines, subtotal, validate_delivery},
    order_number::OrderNumber,
    pricing::{PricingConfig, check_amount},
    ratings::check_rating_gate,
    status::{OrderStatus, Transition},
};
use rust_decimal::Decimal;
use sqlx::{
    Postgres, Transaction,
    error::{DatabaseError, ErrorKind},
};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        accounts::{PgAccountsRepository, records::UserUuid},
        catalog::{
            PgCatalogRepository,
            records::{BusinessRecord, BusinessUuid},
        },
        orders::{
            data::{Checkout, DeliveryInfoUpdate, NewOrder, NewRating, OrderFilter},
            errors::OrdersServiceError,
            models::{BusinessAnalytics, OrderDetails},
            notifier::{LogNotifier, OrderEvent, OrderNotifier},
            numbers::{OrderNumberSource, RandomOrderNumbers},
            records::{
                DeliveryInfoRecord, OrderRecord, OrderUuid, RatingRecord, StatusHistoryRecord,
            },
            repositories::{
                PgAnalyticsRepository, PgCheckoutRepository, PgDeliveryInfoRepository,
                PgOrderItemsRepository, PgOrdersRepository, PgRatingsRepository,
                PgStatusHistoryRepository,
            },
        },
    },
};

/// Candidate order numbers tried before checkout gives up.
pub const MAX_ORDER_NUMBER_ATTEMPTS: usize = 10;

const ORDER_CREATED_NOTE: &str = "Order created";

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    pricing: PricingConfig,
    numbers: Arc<dyn OrderNumberSource>,
    notifier: Arc<dyn OrderNotifier>,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    history_repository: PgStatusHistoryRepository,
    delivery_repository: PgDeliveryInfoRepository,
    ratings_repository: PgRatingsRepository,
    analytics_repository: PgAnalyticsRepository,
    checkout_repository: PgCheckoutRepository,
    catalog_repository: PgCatalogRepository,
    accounts_repository: PgAccountsRepository,
}

impl fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("pricing", &self.pricing)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, pricing: PricingConfig) -> Self {
        Self {
            db,
            pricing,
            numbers: Arc::new(RandomOrderNumbers),
            notifier: Arc::new(LogNotifier),
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            history_repository: PgStatusHistoryRepository::new(),
            delivery_repository: PgDeliveryInfoRepository::new(),
            ratings_repository: PgRatingsRepository::new(),
            analytics_repository: PgAnalyticsRepository::new(),
            checkout_repository: PgCheckoutRepository::new(),
            catalog_repository: PgCatalogRepository::new(),
            accounts_repository: PgAccountsRepository::new(),
        }
    }

    /// Replace the order number generator.
    #[must_use]
    pub fn with_number_source(mut self, numbers: Arc<dyn OrderNumberSource>) -> Self {
        self.numbers = numbers;
        self
    }

    /// Replace the notification collaborator.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn OrderNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    async fn notify(&self, event: OrderEvent) {
        let kind = event.kind();
        let order_uuid = event.order_uuid();

        if let Err(error) = self.notifier.notify(event).await {
            warn!(%order_uuid, event = kind, %error, "order notification failed");
        }
    }

    async fn business(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        business: BusinessUuid,
    ) -> Result<BusinessRecord, OrdersServiceError> {
        self.catalog_repository
            .get_business(tx, business)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => OrdersServiceError::BusinessNotFound,
                other => other.into(),
            })
    }

    /// Inserts the order under the first free candidate number.
    async fn insert_with_unique_number(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let today = Timestamp::now().to_zoned(TimeZone::UTC).date();

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let number = self.numbers.next_number(today);

            if self
                .orders_repository
                .order_number_exists(tx, &number)
                .await?
            {
                warn!(order_number = %number, attempt, "order number taken, retrying");
                continue;
            }

            match self
                .orders_repository
                .insert_order(tx, order, &number)
                .await?
            {
                Some(created) => return Ok(created),
                None => {
                    warn!(order_number = %number, attempt, "order number claimed concurrently, retrying");
                }
            }
        }

        Err(OrdersServiceError::Conflict)
    }

    async fn details(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderRecord,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let items = self.items_repository.list_items(tx, order.uuid).await?;
        let history = self.history_repository.list(tx, order.uuid).await?;
        let delivery_info = self.delivery_repository.find(tx, order.uuid).await?;
        let rating = self.ratings_repository.find_for_order(tx, order.uuid).await?;

        Ok(OrderDetails {
            order,
            items,
            history,
            delivery_info,
            rating,
        })
    }

    /// Loads an order the actor may see: their own, or one placed with their business.
    async fn visible_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let order = self.orders_repository.get_order(tx, order).await?;

        if order.is_placed_by(actor) {
            return Ok(order);
        }

        let business = self.business(tx, order.business_uuid).await?;

        if business.is_owned_by(actor) {
            Ok(order)
        } else {
            Err(OrdersServiceError::NotFound)
        }
    }

    /// Applies a status change to a locked order and records it in the history.
    async fn apply_transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderRecord,
        next: OrderStatus,
        actor: Option<UserUuid>,
        note: Option<&str>,
    ) -> Result<(OrderRecord, Transition), OrdersServiceError> {
        let transition = order.status.transition_to(next, note)?;

        let updated = self
            .orders_repository
            .apply_transition(tx, order.uuid, &transition)
            .await?;

        self.history_repository
            .append(tx, order.uuid, transition.to(), transition.note(), actor)
            .await?;

        Ok((updated, transition))
    }

    async fn transitioned(
        &self,
        order: &OrderRecord,
        transition: &Transition,
        actor: Option<UserUuid>,
    ) {
        info!(
            order_uuid = %order.uuid,
            order_number = %order.order_number,
            from = %transition.from(),
            to = %transition.to(),
            "changed order status"
        );

        self.notify(OrderEvent::StatusChanged {
            order_uuid: order.uuid,
            order_number: order.order_number.clone(),
            from: transition.from(),
            to: transition.to(),
            changed_by: actor,
        })
        .await;
    }

    async fn views_as_owner(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: UserUuid,
    ) -> Result<bool, OrdersServiceError> {
        let user = self.accounts_repository.get_user(tx, actor).await?;

        Ok(user.is_business_owner())
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, checkout),
        fields(
            customer_uuid = %customer,
            business_uuid = %checkout.business_uuid,
            delivery_method = %checkout.delivery_method
        ),
        err
    )]
    async fn create_order(
        &self,
        customer: UserUuid,
        checkout: Checkout,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let delivery = validate_delivery(checkout.delivery_method, checkout.delivery.as_ref())?;
        let contact = checkout.contact.validated()?;

        let mut tx = self.db.begin().await?;

        let business = self.business(&mut tx, checkout.business_uuid).await?;

        let lines = self
            .checkout_repository
            .lock_lines(&mut tx, customer, business.uuid)
            .await?;

        if lines.is_empty() {
            return Err(OrdersServiceError::NoItems);
        }

        check_lines(lines.iter().map(|line| (line.stock(), line.quantity)))?;

        for line in &lines {
            check_amount("line total", line_total(line.quantity, line.unit_price))?;
        }

        let pricing = self.pricing.quote(
            subtotal(lines.iter().map(|line| (line.quantity, line.unit_price))),
            Decimal::ZERO,
            checkout.delivery_method,
            business.location().as_ref(),
            delivery.as_ref().map(|delivery| &delivery.location),
        );

        pricing.check_storable()?;

        let new_order = NewOrder {
            uuid: OrderUuid::new(),
            customer_uuid: customer,
            business_uuid: business.uuid,
            delivery_method: checkout.delivery_method,
            pricing,
            contact,
            delivery,
            special_instructions: checkout.special_instructions,
            payment_method: checkout.payment_method,
        };

        let order = self.insert_with_unique_number(&mut tx, &new_order).await?;

        let mut items = Vec::with_capacity(lines.len());

        for line in &lines {
            items.push(self.items_repository.insert_item(&mut tx, order.uuid, line).await?);
        }

        let created = self
            .history_repository
            .append(
                &mut tx,
                order.uuid,
                OrderStatus::Pending,
                ORDER_CREATED_NOTE,
                Some(customer),
            )
            .await?;

        self.checkout_repository.delete_lines(&mut tx, &lines).await?;

        tx.commit().await?;

        info!(
            order_uuid = %order.uuid,
            order_number = %order.order_number,
            items = items.len(),
            total_amount = %order.pricing.total_amount(),
            "created order"
        );

        self.notify(OrderEvent::Created {
            order_uuid: order.uuid,
            order_number: order.order_number.clone(),
            customer_uuid: order.customer_uuid,
            business_uuid: order.business_uuid,
        })
        .await;

        Ok(OrderDetails {
            order,
            items,
            history: vec![created],
            delivery_info: None,
            rating: None,
        })
    }

    async fn get_order(
        &self,
        actor: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.visible_order(&mut tx, actor, order).await?;
        let details = self.details(&mut tx, order).await?;

        tx.commit().await?;

        Ok(details)
    }

    async fn find_by_number(&self, number: OrderNumber) -> Result<OrderDetails, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self
            .orders_repository
            .get_order_by_number(&mut tx, &number)
            .await?;

        let details = self.details(&mut tx, order).await?;

        tx.commit().await?;

        Ok(details)
    }

    async fn list_orders(
        &self,
        actor: UserUuid,
        filter: OrderFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let as_owner = self.views_as_owner(&mut tx, actor).await?;

        let orders = self
            .orders_repository
            .list_orders(&mut tx, actor, as_owner, &filter)
            .await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn status_history(
        &self,
        actor: UserUuid,
        order: OrderUuid,
    ) -> Result<Vec<StatusHistoryRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.visible_order(&mut tx, actor, order).await?;
        let history = self.history_repository.list(&mut tx, order.uuid).await?;

        tx.commit().await?;

        Ok(history)
    }

    #[tracing::instrument(
        name = "orders.service.transition",
        skip(self, note),
        fields(order_uuid = %order, to = %next),
        err
    )]
    async fn transition(
        &self,
        order: OrderUuid,
        next: OrderStatus,
        actor: Option<UserUuid>,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders_repository.lock_order(&mut tx, order).await?;

        let (updated, transition) = self
            .apply_transition(&mut tx, &current, next, actor, note.as_deref())
            .await?;

        tx.commit().await?;

        self.transitioned(&updated, &transition, actor).await;

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self, note),
        fields(actor_uuid = %actor, order_uuid = %order, to = %next),
        err
    )]
    async fn update_status(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        next: OrderStatus,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders_repository.lock_order(&mut tx, order).await?;
        let business = self.business(&mut tx, current.business_uuid).await?;

        if !business.is_owned_by(actor) {
            return Err(OrdersServiceError::Forbidden);
        }

        let (updated, transition) = self
            .apply_transition(&mut tx, &current, next, Some(actor), note.as_deref())
            .await?;

        tx.commit().await?;

        self.transitioned(&updated, &transition, Some(actor)).await;

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip(self, note),
        fields(actor_uuid = %actor, order_uuid = %order),
        err
    )]
    async fn cancel_order(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders_repository.lock_order(&mut tx, order).await?;
        let business = self.business(&mut tx, current.business_uuid).await?;

        let is_owner = business.is_owned_by(actor);

        if !is_owner && !current.is_placed_by(actor) {
            return Err(OrdersServiceError::Forbidden);
        }

        if !is_owner && !current.status.is_customer_cancellable() {
            return Err(OrdersServiceError::InvalidState(format!(
                "order can no longer be cancelled, it is {}",
                current.status.label()
            )));
        }

        let note = match note.as_deref().map(str::trim) {
            Some(note) if !note.is_empty() => note.to_string(),
            _ => {
                let user = self.accounts_repository.get_user(&mut tx, actor).await?;

                format!("Order cancelled by {}", user.username)
            }
        };

        let (updated, transition) = self
            .apply_transition(
                &mut tx,
                &current,
                OrderStatus::Cancelled,
                Some(actor),
                Some(&note),
            )
            .await?;

        tx.commit().await?;

        self.transitioned(&updated, &transition, Some(actor)).await;

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.upsert_delivery_info",
        skip(self, update),
        fields(actor_uuid = %actor, order_uuid = %order),
        err
    )]
    async fn upsert_delivery_info(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        update: DeliveryInfoUpdate,
    ) -> Result<DeliveryInfoRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders_repository.lock_order(&mut tx, order).await?;
        let business = self.business(&mut tx, current.business_uuid).await?;

        if !business.is_owned_by(actor) {
            return Err(OrdersServiceError::Forbidden);
        }

        if current.delivery_method != DeliveryMethod::Delivery {
            return Err(OrdersServiceError::InvalidState(
                "delivery info only applies to delivery orders".to_string(),
            ));
        }

        if !matches!(
            current.status,
            OrderStatus::Ready | OrderStatus::OutForDelivery | OrderStatus::Delivered
        ) {
            return Err(OrdersServiceError::InvalidState(format!(
                "delivery info cannot be set while the order is {}",
                current.status.label()
            )));
        }

        let estimated_arrival = update.estimated_arrival;

        let info = self
            .delivery_repository
            .upsert(&mut tx, current.uuid, update)
            .await?;

        if let Some(estimated_arrival) = estimated_arrival {
            self.orders_repository
                .set_estimated_delivery_time(&mut tx, current.uuid, estimated_arrival)
                .await?;
        }

        tx.commit().await?;

        info!(order_uuid = %current.uuid, "updated delivery info");

        Ok(info)
    }

    #[tracing::instrument(
        name = "orders.service.rate_order",
        skip(self, rating),
        fields(actor_uuid = %actor, order_uuid = %order, overall = %rating.scores.overall),
        err
    )]
    async fn rate_order(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        rating: NewRating,
    ) -> Result<RatingRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders_repository.lock_order(&mut tx, order).await?;

        let existing = self
            .ratings_repository
            .find_for_order(&mut tx, current.uuid)
            .await?;

        check_rating_gate(current.is_placed_by(actor), current.status, existing.is_some())?;

        let created = self
            .ratings_repository
            .insert_rating(&mut tx, &current, rating)
            .await
            .map_err(|error| {
                match error.as_database_error().map(DatabaseError::kind) {
                    Some(ErrorKind::UniqueViolation) => OrdersServiceError::AlreadyRated,
                    _ => error.into(),
                }
            })?;

        tx.commit().await?;

        info!(
            order_uuid = %current.uuid,
            business_uuid = %created.business_uuid,
            overall = %created.scores.overall,
            "rated order"
        );

        Ok(created)
    }

    async fn list_ratings(&self, actor: UserUuid) -> Result<Vec<RatingRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let as_owner = self.views_as_owner(&mut tx, actor).await?;

        let ratings = self
            .ratings_repository
            .list_ratings(&mut tx, actor, as_owner)
            .await?;

        tx.commit().await?;

        Ok(ratings)
    }

    async fn business_analytics(
        &self,
        actor: UserUuid,
        business: BusinessUuid,
    ) -> Result<BusinessAnalytics, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let business = self.business(&mut tx, business).await?;

        if !business.is_owned_by(actor) {
            return Err(OrdersServiceError::Forbidden);
        }

        let totals = self
            .analytics_repository
            .order_totals(&mut tx, business.uuid)
            .await?;

        let status_breakdown = self
            .analytics_repository
            .status_breakdown(&mut tx, business.uuid)
            .await?;

        let top_products = self
            .analytics_repository
            .top_products(&mut tx, business.uuid)
            .await?;

        let ratings = self
            .analytics_repository
            .rating_summary(&mut tx, business.uuid)
            .await?;

        tx.commit().await?;

        Ok(BusinessAnalytics {
            business_uuid: business.uuid,
            totals,
            status_breakdown,
            top_products,
            ratings,
        })
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turns the customer's cart lines for one business into a pending order.
    ///
    /// The order, its items, the first history entry and the removal of the consumed cart
    /// lines commit together or not at all.
    async fn create_order(
        &self,
        customer: UserUuid,
        checkout: Checkout,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Retrieve an order visible to `actor`: one they placed or one placed with a business
    /// they own.
    async fn get_order(
        &self,
        actor: UserUuid,
        order: OrderUuid,
    ) -> Result<OrderDetails, OrdersServiceError>;

    /// Retrieve an order by its order number, without an access check.
    async fn find_by_number(&self, number: OrderNumber) -> Result<OrderDetails, OrdersServiceError>;

    /// Orders placed by `actor`, or received by their businesses when `actor` is a business
    /// owner. Newest first.
    async fn list_orders(
        &self,
        actor: UserUuid,
        filter: OrderFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Status history of an order visible to `actor`, newest first.
    async fn status_history(
        &self,
        actor: UserUuid,
        order: OrderUuid,
    ) -> Result<Vec<StatusHistoryRecord>, OrdersServiceError>;

    /// Moves an order to `next` if the status machine allows it. No access check.
    async fn transition(
        &self,
        order: OrderUuid,
        next: OrderStatus,
        actor: Option<UserUuid>,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Status change requested by the business owner.
    async fn update_status(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        next: OrderStatus,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancellation by the customer (early statuses only) or the business owner.
    async fn cancel_order(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        note: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Set driver and timing details of a delivery order.
    async fn upsert_delivery_info(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        update: DeliveryInfoUpdate,
    ) -> Result<DeliveryInfoRecord, OrdersServiceError>;

    /// Rate a completed order. Each order takes one rating, from its customer.
    async fn rate_order(
        &self,
        actor: UserUuid,
        order: OrderUuid,
        rating: NewRating,
    ) -> Result<RatingRecord, OrdersServiceError>;

    /// Ratings left by `actor`, or received by their businesses.
    async fn list_ratings(&self, actor: UserUuid) -> Result<Vec<RatingRecord>, OrdersServiceError>;

    /// Sales and rating figures for a business, for its owner.
    async fn business_analytics(
        &self,
        actor: UserUuid,
        business: BusinessUuid,
    ) -> Result<BusinessAnalytics, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::civil::Date;
    use nexus::{
        checkout::{AvailabilityIssue, DeliveryDetailsError},
        ratings::{RatingScores, Stars},
        status::TransitionError,
    };
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use crate::{
        domain::{
            carts::CartsService,
            catalog::{
                CatalogService,
                data::ProductUpdate,
                records::{ProductStatus, ProductUuid},
            },
            orders::{
                notifier::{MockOrderNotifier, NotifyError},
                numbers::MockOrderNumberSource,
            },
        },
        test::{
            TestContext,
            helpers::{TO_COMPLETED, add_to_cart, advance, delivery_to, pickup},
        },
    };

    use super::*;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn number(value: &str) -> TestResult<OrderNumber> {
        Ok(OrderNumber::parse(value)?)
    }

    fn rating(overall: i64) -> TestResult<NewRating> {
        Ok(NewRating::new(RatingScores::overall(Stars::new(overall)?)))
    }

    /// Customer, owner and a business with a R10 and a R5 product.
    struct Shop {
        customer: UserUuid,
        owner: UserUuid,
        business: BusinessUuid,
        pap: ProductUuid,
        chakalaka: ProductUuid,
    }

    async fn shop(ctx: &TestContext) -> TestResult<Shop> {
        let customer = ctx.create_customer("thandi").await?;
        let owner = ctx.create_owner("owner").await?;
        let business = ctx.create_business(owner.uuid, Some((-26.2, 28.0))).await?;

        let pap = ctx
            .create_product(business.uuid, "Pap", money(10_00), 20)
            .await?;
        let chakalaka = ctx
            .create_product(business.uuid, "Chakalaka", money(5_00), 20)
            .await?;

        Ok(Shop {
            customer: customer.uuid,
            owner: owner.uuid,
            business: business.uuid,
            pap: pap.uuid,
            chakalaka: chakalaka.uuid,
        })
    }

    async fn placed_order(ctx: &TestContext, shop: &Shop) -> TestResult<OrderRecord> {
        add_to_cart(ctx, shop.customer, shop.pap, 2).await?;
        add_to_cart(ctx, shop.customer, shop.chakalaka, 1).await?;

        let details = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await?;

        Ok(details.order)
    }

    #[tokio::test]
    async fn pickup_checkout_prices_and_consumes_the_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 2).await?;
        add_to_cart(&ctx, shop.customer, shop.chakalaka, 1).await?;

        let details = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await?;

        let pricing = details.order.pricing;

        assert_eq!(pricing.subtotal(), money(25_00));
        assert_eq!(pricing.delivery_fee(), money(5_00));
        assert_eq!(pricing.service_fee(), money(1_25));
        assert_eq!(pricing.tax_amount(), money(3_75));
        assert_eq!(pricing.total_amount(), money(35_00));

        assert_eq!(details.order.status, OrderStatus::Pending);
        assert_eq!(details.order.contact.name, "Thandi Nkosi");
        assert_eq!(details.items.len(), 2);
        assert_eq!(
            details.items.iter().map(|item| item.total_price).sum::<Decimal>(),
            money(25_00)
        );

        assert_eq!(details.history.len(), 1);
        assert_eq!(details.history[0].status, OrderStatus::Pending);
        assert_eq!(details.history[0].notes, ORDER_CREATED_NOTE);
        assert_eq!(details.history[0].created_by, Some(shop.customer));

        let cart = ctx.carts.get_cart(shop.customer).await?;

        assert!(cart.is_empty());

        let stored = ctx.orders.get_order(shop.customer, details.order.uuid).await?;

        assert_eq!(stored.order.order_number, details.order.order_number);
        assert_eq!(stored.items.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_only_consumes_lines_of_the_chosen_business() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let other = ctx.create_business(shop.owner, None).await?;
        let vetkoek = ctx
            .create_product(other.uuid, "Vetkoek", money(8_00), 5)
            .await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;
        add_to_cart(&ctx, shop.customer, vetkoek.uuid, 3).await?;

        let details = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await?;

        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].product_name, "Pap");

        let cart = ctx.carts.get_cart(shop.customer).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_uuid, vetkoek.uuid);
        assert_eq!(cart.items[0].quantity, nexus::carts::Quantity::new(3)?);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_without_lines_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let result = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NoItems)),
            "expected NoItems, got {result:?}"
        );

        let orders = ctx
            .orders
            .list_orders(shop.customer, OrderFilter::default())
            .await?;

        assert!(orders.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn checkout_for_unknown_business_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        let result = ctx
            .orders
            .create_order(shop.customer, pickup(BusinessUuid::new()))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::BusinessNotFound)),
            "expected BusinessNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delivery_checkout_names_missing_fields_and_keeps_the_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        let checkout = Checkout {
            delivery: None,
            ..delivery_to(shop.business, 0.0, 0.0)
        };

        let result = ctx.orders.create_order(shop.customer, checkout).await;

        let Err(OrdersServiceError::InvalidDelivery(DeliveryDetailsError::MissingFields(fields))) =
            &result
        else {
            panic!("expected missing delivery fields, got {result:?}");
        };

        assert_eq!(
            fields.as_slice(),
            ["delivery_address", "delivery_latitude", "delivery_longitude"]
        );

        let cart = ctx.carts.get_cart(shop.customer).await?;

        assert_eq!(cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn blank_contact_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        let mut checkout = pickup(shop.business);
        checkout.contact.phone = "   ".to_string();

        let result = ctx.orders.create_order(shop.customer, checkout).await;

        assert!(
            matches!(&result, Err(error @ OrdersServiceError::InvalidContact(_)) if error.is_validation()),
            "expected InvalidContact, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delivery_fee_follows_distance_tiers() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 2).await?;
        add_to_cart(&ctx, shop.customer, shop.chakalaka, 1).await?;

        // About 8.9km north of the business
        let details = ctx
            .orders
            .create_order(shop.customer, delivery_to(shop.business, -26.12, 28.0))
            .await?;

        assert_eq!(details.order.pricing.delivery_fee(), money(7_00));
        assert_eq!(details.order.pricing.total_amount(), money(37_00));
        assert_eq!(details.order.delivery_address.as_deref(), Some("12 Vilakazi Street"));
        assert!(details.order.delivery_location().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn inactive_product_blocks_checkout() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        ctx.catalog
            .update_product(
                shop.pap,
                ProductUpdate {
                    status: Some(ProductStatus::Inactive),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        let result = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await;

        let Err(error @ OrdersServiceError::Unavailable(issues)) = &result else {
            panic!("expected Unavailable, got {result:?}");
        };

        assert_eq!(
            issues.issues(),
            [AvailabilityIssue::Inactive {
                name: "Pap".to_string()
            }]
        );
        assert_eq!(error.to_string(), "Pap is no longer available");

        let cart = ctx.carts.get_cart(shop.customer).await?;

        assert_eq!(cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_blocks_checkout() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let scarce = ctx
            .create_product(shop.business, "Mogodu", money(30_00), 2)
            .await?;

        add_to_cart(&ctx, shop.customer, scarce.uuid, 3).await?;

        let result = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await;

        let Err(OrdersServiceError::OutOfStock(issues)) = &result else {
            panic!("expected OutOfStock, got {result:?}");
        };

        assert!(matches!(
            issues.issues(),
            [AvailabilityIssue::InsufficientStock { available: 2, .. }]
        ));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_reports_every_unavailable_line() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let scarce = ctx
            .create_product(shop.business, "Mogodu", money(30_00), 2)
            .await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;
        add_to_cart(&ctx, shop.customer, shop.chakalaka, 1).await?;
        add_to_cart(&ctx, shop.customer, scarce.uuid, 2).await?;

        ctx.catalog
            .update_product(
                shop.pap,
                ProductUpdate {
                    status: Some(ProductStatus::Inactive),
                    ..ProductUpdate::default()
                },
            )
            .await?;
        ctx.catalog
            .update_product(
                scarce.uuid,
                ProductUpdate {
                    stock_quantity: Some(1),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        let result = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await;

        let Err(OrdersServiceError::Unavailable(issues)) = &result else {
            panic!("expected Unavailable, got {result:?}");
        };

        let mut names: Vec<_> = issues
            .issues()
            .iter()
            .map(|issue| match issue {
                AvailabilityIssue::Inactive { name }
                | AvailabilityIssue::OutOfStock { name }
                | AvailabilityIssue::InsufficientStock { name, .. } => name.as_str(),
            })
            .collect();
        names.sort_unstable();

        assert_eq!(names, ["Mogodu", "Pap"]);

        let cart = ctx.carts.get_cart(shop.customer).await?;

        assert_eq!(cart.items.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn oversized_order_is_rejected_before_storage() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let maize = ctx
            .create_product(shop.business, "Maize meal", money(100_00), 2_000_000)
            .await?;

        add_to_cart(&ctx, shop.customer, maize.uuid, 2_000_000).await?;

        let result = ctx
            .orders
            .create_order(shop.customer, pickup(shop.business))
            .await;

        let Err(error @ OrdersServiceError::AmountTooLarge(too_large)) = &result else {
            panic!("expected AmountTooLarge, got {result:?}");
        };

        assert!(error.is_validation());
        assert_eq!(too_large.what, "line total");
        assert_eq!(too_large.amount, money(200_000_000_00));

        let cart = ctx.carts.get_cart(shop.customer).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(i64::from(cart.items[0].quantity), 2_000_000);

        let orders = ctx
            .orders
            .list_orders(shop.customer, OrderFilter::default())
            .await?;

        assert!(orders.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn illegal_transition_leaves_no_history() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        let result = ctx
            .orders
            .transition(order.uuid, OrderStatus::Delivered, None, None)
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InvalidTransition(TransitionError::NotAllowed {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Delivered,
                }))
            ),
            "expected InvalidTransition, got {result:?}"
        );

        let history = ctx.orders.status_history(shop.customer, order.uuid).await?;

        assert_eq!(history.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn confirming_stamps_confirmed_at_and_records_history() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        assert!(order.confirmed_at.is_none());

        let confirmed = ctx
            .orders
            .update_status(shop.owner, order.uuid, OrderStatus::Confirmed, None)
            .await?;

        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert!(confirmed.confirmed_at.is_some());

        let history = ctx.orders.status_history(shop.owner, order.uuid).await?;

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, OrderStatus::Confirmed);
        assert_eq!(history[0].notes, "Status changed from pending to confirmed");
        assert_eq!(history[0].created_by, Some(shop.owner));

        Ok(())
    }

    #[tokio::test]
    async fn only_the_owner_can_update_status() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        let result = ctx
            .orders
            .update_status(shop.customer, order.uuid, OrderStatus::Confirmed, None)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn customer_cancellation_gets_a_default_note() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        let cancelled = ctx
            .orders
            .cancel_order(shop.customer, order.uuid, None)
            .await?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let history = ctx.orders.status_history(shop.customer, order.uuid).await?;

        assert_eq!(history[0].notes, "Order cancelled by thandi");

        Ok(())
    }

    #[tokio::test]
    async fn customer_cannot_cancel_a_ready_order_but_owner_can() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        advance(&ctx, order.uuid, &TO_COMPLETED[..3]).await?;

        let result = ctx.orders.cancel_order(shop.customer, order.uuid, None).await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidState(_))),
            "expected InvalidState, got {result:?}"
        );

        let cancelled = ctx
            .orders
            .cancel_order(shop.owner, order.uuid, Some("Kitchen closed".to_string()))
            .await?;

        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let history = ctx.orders.status_history(shop.owner, order.uuid).await?;

        assert_eq!(history[0].notes, "Kitchen closed");

        Ok(())
    }

    #[tokio::test]
    async fn strangers_cannot_cancel_or_see_orders() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;
        let stranger = ctx.create_customer("stranger").await?;

        let cancel = ctx.orders.cancel_order(stranger.uuid, order.uuid, None).await;

        assert!(
            matches!(cancel, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {cancel:?}"
        );

        let get = ctx.orders.get_order(stranger.uuid, order.uuid).await;

        assert!(
            matches!(get, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {get:?}"
        );

        ctx.orders.get_order(shop.owner, order.uuid).await?;

        Ok(())
    }

    #[tokio::test]
    async fn find_by_number_returns_the_order() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        let found = ctx.orders.find_by_number(order.order_number.clone()).await?;

        assert_eq!(found.order.uuid, order.uuid);

        let missing = ctx
            .orders
            .find_by_number(number("ORD-19990101-ZZZZ")?)
            .await;

        assert!(
            matches!(missing, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {missing:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_orders_is_scoped_by_role_and_filter() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let first = placed_order(&ctx, &shop).await?;
        let second = placed_order(&ctx, &shop).await?;

        let other = ctx.create_customer("other").await?;

        ctx.orders.cancel_order(shop.customer, first.uuid, None).await?;

        let mine = ctx
            .orders
            .list_orders(shop.customer, OrderFilter::default())
            .await?;

        assert_eq!(
            mine.iter().map(|order| order.uuid).collect::<Vec<_>>(),
            [second.uuid, first.uuid]
        );

        let received = ctx
            .orders
            .list_orders(
                shop.owner,
                OrderFilter {
                    active_only: true,
                    ..OrderFilter::default()
                },
            )
            .await?;

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].uuid, second.uuid);

        let cancelled = ctx
            .orders
            .list_orders(
                shop.owner,
                OrderFilter {
                    status: Some(OrderStatus::Cancelled),
                    ..OrderFilter::default()
                },
            )
            .await?;

        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].uuid, first.uuid);

        let none = ctx.orders.list_orders(other.uuid, OrderFilter::default()).await?;

        assert!(none.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn delivery_info_requires_a_ready_delivery_order() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        let order = ctx
            .orders
            .create_order(shop.customer, delivery_to(shop.business, -26.19, 28.0))
            .await?
            .order;

        let update = DeliveryInfoUpdate {
            driver_name: Some("Sizwe".to_string()),
            estimated_arrival: Some(Timestamp::from_second(1_900_000_000)?),
            ..DeliveryInfoUpdate::default()
        };

        let early = ctx
            .orders
            .upsert_delivery_info(shop.owner, order.uuid, update.clone())
            .await;

        assert!(
            matches!(early, Err(OrdersServiceError::InvalidState(_))),
            "expected InvalidState, got {early:?}"
        );

        advance(&ctx, order.uuid, &TO_COMPLETED[..3]).await?;

        let forbidden = ctx
            .orders
            .upsert_delivery_info(shop.customer, order.uuid, update.clone())
            .await;

        assert!(
            matches!(forbidden, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {forbidden:?}"
        );

        let info = ctx
            .orders
            .upsert_delivery_info(shop.owner, order.uuid, update)
            .await?;

        assert_eq!(info.driver_name, "Sizwe");

        let phone = ctx
            .orders
            .upsert_delivery_info(
                shop.owner,
                order.uuid,
                DeliveryInfoUpdate {
                    driver_phone: Some("0830000000".to_string()),
                    ..DeliveryInfoUpdate::default()
                },
            )
            .await?;

        assert_eq!(phone.uuid, info.uuid);
        assert_eq!(phone.driver_name, "Sizwe");
        assert_eq!(phone.driver_phone, "0830000000");

        let details = ctx.orders.get_order(shop.customer, order.uuid).await?;

        assert_eq!(
            details.order.estimated_delivery_time,
            Some(Timestamp::from_second(1_900_000_000)?)
        );
        assert!(details.delivery_info.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn delivery_info_is_rejected_for_pickup_orders() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        advance(&ctx, order.uuid, &TO_COMPLETED[..3]).await?;

        let result = ctx
            .orders
            .upsert_delivery_info(shop.owner, order.uuid, DeliveryInfoUpdate::default())
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidState(_))),
            "expected InvalidState, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn completed_order_can_be_rated_once_by_its_customer() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        let early = ctx.orders.rate_order(shop.customer, order.uuid, rating(4)?).await;

        assert!(
            matches!(early, Err(OrdersServiceError::InvalidState(_))),
            "expected InvalidState, got {early:?}"
        );

        advance(&ctx, order.uuid, &TO_COMPLETED).await?;

        let owner = ctx.orders.rate_order(shop.owner, order.uuid, rating(5)?).await;

        assert!(
            matches!(owner, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {owner:?}"
        );

        let rated = ctx
            .orders
            .rate_order(shop.customer, order.uuid, rating(4)?)
            .await?;

        assert_eq!(rated.business_uuid, shop.business);
        assert_eq!(rated.scores.overall, Stars::new(4)?);
        assert!(rated.is_verified);

        let again = ctx.orders.rate_order(shop.customer, order.uuid, rating(2)?).await;

        assert!(
            matches!(again, Err(OrdersServiceError::AlreadyRated)),
            "expected AlreadyRated, got {again:?}"
        );

        assert_eq!(ctx.orders.list_ratings(shop.customer).await?.len(), 1);
        assert_eq!(ctx.orders.list_ratings(shop.owner).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn analytics_summarise_orders_and_ratings() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let first = placed_order(&ctx, &shop).await?;
        let second = placed_order(&ctx, &shop).await?;

        advance(&ctx, first.uuid, &TO_COMPLETED).await?;
        ctx.orders
            .rate_order(shop.customer, first.uuid, rating(4)?)
            .await?;
        ctx.orders.cancel_order(shop.customer, second.uuid, None).await?;

        let analytics = ctx
            .orders
            .business_analytics(shop.owner, shop.business)
            .await?;

        assert_eq!(analytics.totals.all_time.orders, 2);
        assert_eq!(analytics.totals.all_time.revenue, money(70_00));
        assert_eq!(analytics.totals.today.orders, 2);
        assert_eq!(analytics.totals.last_30_days, analytics.totals.all_time);

        assert_eq!(analytics.status_breakdown.len(), 2);
        assert!(analytics.status_breakdown.iter().all(|count| count.orders == 1));

        assert_eq!(analytics.top_products[0].product_name, "Pap");
        assert_eq!(analytics.top_products[0].quantity_sold, 4);
        assert_eq!(analytics.top_products[0].revenue, money(40_00));

        assert_eq!(analytics.ratings.total_ratings, 1);
        assert_eq!(analytics.ratings.average_rating, Some(money(4_00)));

        let result = ctx
            .orders
            .business_analytics(shop.customer, shop.business)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Forbidden)),
            "expected Forbidden, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn taken_order_numbers_are_retried() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let taken = number("ORD-20260301-AAAA")?;
        let free = number("ORD-20260301-BBBB")?;

        let mut first = MockOrderNumberSource::new();
        let first_number = taken.clone();
        first
            .expect_next_number()
            .times(1)
            .returning(move |_| first_number.clone());

        let mut candidates = vec![taken.clone(), free.clone()].into_iter();
        let mut second = MockOrderNumberSource::new();
        second
            .expect_next_number()
            .times(2)
            .returning(move |_| candidates.next().expect("ran out of candidates"));

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        let existing = PgOrdersService::new(ctx.handle(), PricingConfig::default())
            .with_number_source(Arc::new(first))
            .create_order(shop.customer, pickup(shop.business))
            .await?;

        assert_eq!(existing.order.order_number, taken);

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        let retried = PgOrdersService::new(ctx.handle(), PricingConfig::default())
            .with_number_source(Arc::new(second))
            .create_order(shop.customer, pickup(shop.business))
            .await?;

        assert_eq!(retried.order.order_number, free);

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_order_numbers_leave_the_cart_alone() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        let taken = order.order_number.clone();
        let mut numbers = MockOrderNumberSource::new();
        numbers
            .expect_next_number()
            .times(MAX_ORDER_NUMBER_ATTEMPTS)
            .returning(move |_: Date| taken.clone());

        add_to_cart(&ctx, shop.customer, shop.chakalaka, 2).await?;

        let result = PgOrdersService::new(ctx.handle(), PricingConfig::default())
            .with_number_source(Arc::new(numbers))
            .create_order(shop.customer, pickup(shop.business))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Conflict)),
            "expected Conflict, got {result:?}"
        );

        let cart = ctx.carts.get_cart(shop.customer).await?;

        assert_eq!(cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn failing_notifier_does_not_fail_checkout() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let mut notifier = MockOrderNotifier::new();
        notifier
            .expect_notify()
            .withf(|event| matches!(event, OrderEvent::Created { .. }))
            .times(1)
            .returning(|_| Err(NotifyError("gateway down".to_string())));

        add_to_cart(&ctx, shop.customer, shop.pap, 1).await?;

        let details = PgOrdersService::new(ctx.handle(), PricingConfig::default())
            .with_notifier(Arc::new(notifier))
            .create_order(shop.customer, pickup(shop.business))
            .await?;

        assert_eq!(details.order.status, OrderStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn status_changes_are_announced() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;
        let order = placed_order(&ctx, &shop).await?;

        let owner = shop.owner;
        let mut notifier = MockOrderNotifier::new();
        notifier
            .expect_notify()
            .withf(move |event| {
                matches!(
                    event,
                    OrderEvent::StatusChanged {
                        from: OrderStatus::Pending,
                        to: OrderStatus::Confirmed,
                        changed_by: Some(actor),
                        ..
                    } if *actor == owner
                )
            })
            .times(1)
            .returning(|_| Ok(()));

        PgOrdersService::new(ctx.handle(), PricingConfig::default())
            .with_notifier(Arc::new(notifier))
            .update_status(shop.owner, order.uuid, OrderStatus::Confirmed, None)
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_checkouts_get_distinct_numbers() -> TestResult {
        let ctx = TestContext::new().await;
        let shop = shop(&ctx).await?;

        let mut customers = Vec::new();

        for i in 0..5 {
            let customer = ctx.create_customer(&format!("customer{i}")).await?;

            add_to_cart(&ctx, customer.uuid, shop.pap, 1).await?;

            customers.push(customer.uuid);
        }

        let mut tasks = JoinSet::new();

        for customer in customers {
            let orders = ctx.orders.clone();
            let checkout = pickup(shop.business);

            tasks.spawn(async move { orders.create_order(customer, checkout).await });
        }

        let mut numbers = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            numbers.push(joined??.order.order_number);
        }

        numbers.sort();
        numbers.dedup();

        assert_eq!(numbers.len(), 5);

        Ok(())
    }
}
