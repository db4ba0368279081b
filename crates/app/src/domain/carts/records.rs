//! Cart Records

use jiff::Timestamp;
use nexus::carts::{Quantity, line_total};
use rust_decimal::Decimal;

use crate::{
    domain::{
        accounts::records::UserUuid,
        catalog::records::{BusinessUuid, ProductUuid},
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart item joined with the live product and business it refers to.
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub business_uuid: BusinessUuid,
    pub business_name: String,
    pub quantity: Quantity,
    pub unit_price: Decimal,
    pub notes: String,

    /// Product is active and has stock right now.
    pub is_available: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    /// `quantity × unit_price`.
    pub fn line_total(&self) -> Decimal {
        line_total(self.quantity, self.unit_price)
    }
}
