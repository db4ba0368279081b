//! Test Helpers

use nexus::{
    carts::Quantity,
    checkout::{CustomerContact, DeliveryDetails, DeliveryMethod},
    status::OrderStatus,
};
use testresult::TestResult;

use crate::{
    domain::{
        accounts::records::UserUuid,
        carts::{CartsService, data::NewCartItem},
        catalog::records::{BusinessUuid, ProductUuid},
        orders::{OrdersService, data::Checkout, records::OrderUuid},
    },
    test::TestContext,
};

pub(crate) async fn add_to_cart(
    ctx: &TestContext,
    customer: UserUuid,
    product: ProductUuid,
    quantity: i64,
) -> TestResult {
    ctx.carts
        .add_item(
            customer,
            NewCartItem {
                product_uuid: product,
                quantity: Quantity::new(quantity)?,
                notes: None,
                unit_price: None,
            },
        )
        .await?;

    Ok(())
}

fn contact() -> CustomerContact {
    CustomerContact {
        name: "Thandi Nkosi".to_string(),
        phone: "0821234567".to_string(),
        email: None,
    }
}

pub(crate) fn pickup(business: BusinessUuid) -> Checkout {
    Checkout {
        business_uuid: business,
        delivery_method: DeliveryMethod::Pickup,
        contact: contact(),
        delivery: None,
        special_instructions: None,
        payment_method: None,
    }
}

pub(crate) fn delivery_to(business: BusinessUuid, latitude: f64, longitude: f64) -> Checkout {
    Checkout {
        delivery_method: DeliveryMethod::Delivery,
        delivery: Some(DeliveryDetails {
            address: Some("12 Vilakazi Street".to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            notes: None,
        }),
        ..pickup(business)
    }
}

/// Walks an order through `path` with unchecked transitions.
pub(crate) async fn advance(ctx: &TestContext, order: OrderUuid, path: &[OrderStatus]) -> TestResult {
    for next in path {
        ctx.orders.transition(order, *next, None, None).await?;
    }

    Ok(())
}

/// The shortest path from pending to completed.
pub(crate) const TO_COMPLETED: [OrderStatus; 4] = [
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Completed,
];
