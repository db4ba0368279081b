//! Cart Data

use nexus::carts::Quantity;
use rust_decimal::Decimal;

use crate::domain::{
    carts::{models::Cart, records::CartItemRecord},
    catalog::records::ProductUuid,
};

/// Product to put in a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product_uuid: ProductUuid,
    pub quantity: Quantity,

    /// Replaces any existing notes when set.
    pub notes: Option<String>,

    /// Defaults to the current product price.
    pub unit_price: Option<Decimal>,
}

/// In-place change to a cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemUpdate {
    pub quantity: Quantity,
    pub notes: Option<String>,
}

/// A changed line together with the cart it now belongs to.
#[derive(Debug, Clone)]
pub struct CartItemChange {
    pub item: CartItemRecord,
    pub cart: Cart,
}

/// Outcome of [`CartsService::repair_unit_prices`](crate::domain::carts::CartsService::repair_unit_prices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceRepair {
    /// Lines given the live product price.
    pub repriced: u64,

    /// Lines dropped because their product has no price.
    pub removed: u64,
}
