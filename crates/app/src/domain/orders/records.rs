//! Order Records

use jiff::Timestamp;
use nexus::{
    carts::Quantity,
    checkout::{CustomerContact, DeliveryMethod, ProductStock},
    geo::GeoPoint,
    order_number::OrderNumber,
    pricing::PriceBreakdown,
    ratings::RatingScores,
    status::{OrderStatus, PaymentStatus},
};
use rust_decimal::Decimal;

use crate::{
    domain::{
        accounts::records::UserUuid,
        carts::records::CartItemUuid,
        catalog::records::{BusinessUuid, ProductStatus, ProductUuid},
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub order_number: OrderNumber,
    pub customer_uuid: UserUuid,
    pub business_uuid: BusinessUuid,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    pub pricing: PriceBreakdown,

    /// Contact details as given at checkout.
    pub contact: CustomerContact,

    pub delivery_address: Option<String>,
    pub delivery_latitude: Option<f64>,
    pub delivery_longitude: Option<f64>,
    pub delivery_notes: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub special_instructions: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub confirmed_at: Option<Timestamp>,
    pub estimated_delivery_time: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
}

impl OrderRecord {
    /// Drop-off point of a delivery order.
    pub fn delivery_location(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.delivery_latitude?, self.delivery_longitude?).ok()
    }

    /// Whether `user` placed the order.
    pub fn is_placed_by(&self, user: UserUuid) -> bool {
        self.customer_uuid == user
    }
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Priced line of an order, frozen at checkout.
#[derive(Debug, Clone)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,

    /// `None` once the product has been deleted from the catalog.
    pub product_uuid: Option<ProductUuid>,

    pub product_name: String,
    pub product_description: String,
    pub quantity: Quantity,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub notes: String,
    pub created_at: Timestamp,
}

/// Status History UUID
pub type StatusHistoryUuid = TypedUuid<StatusHistoryRecord>;

/// Status History Record
#[derive(Debug, Clone)]
pub struct StatusHistoryRecord {
    pub uuid: StatusHistoryUuid,
    pub order_uuid: OrderUuid,
    pub status: OrderStatus,
    pub notes: String,

    /// `None` for system changes.
    pub created_by: Option<UserUuid>,

    pub created_at: Timestamp,
}

/// Delivery Info UUID
pub type DeliveryInfoUuid = TypedUuid<DeliveryInfoRecord>;

/// Delivery Info Record
#[derive(Debug, Clone)]
pub struct DeliveryInfoRecord {
    pub uuid: DeliveryInfoUuid,
    pub order_uuid: OrderUuid,
    pub driver_name: String,
    pub driver_phone: String,
    pub vehicle_info: String,
    pub estimated_arrival: Option<Timestamp>,
    pub actual_arrival: Option<Timestamp>,
    pub delivery_notes: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Rating UUID
pub type RatingUuid = TypedUuid<RatingRecord>;

/// Rating Record
#[derive(Debug, Clone)]
pub struct RatingRecord {
    pub uuid: RatingUuid,
    pub order_uuid: OrderUuid,
    pub customer_uuid: UserUuid,
    pub business_uuid: BusinessUuid,
    pub scores: RatingScores,
    pub review_text: String,
    pub is_public: bool,
    pub is_verified: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart line locked for checkout, with the live product it refers to.
#[derive(Debug, Clone)]
pub(crate) struct CheckoutLine {
    pub cart_item_uuid: CartItemUuid,
    pub product_uuid: ProductUuid,
    pub product_name: String,
    pub product_description: String,
    pub product_status: ProductStatus,
    pub track_inventory: bool,
    pub stock_quantity: i32,
    pub quantity: Quantity,
    pub unit_price: Decimal,
    pub notes: String,
}

impl CheckoutLine {
    pub(crate) fn stock(&self) -> ProductStock<'_> {
        ProductStock {
            name: &self.product_name,
            active: self.product_status == ProductStatus::Active,
            track_inventory: self.track_inventory,
            stock_quantity: i64::from(self.stock_quantity),
        }
    }
}
