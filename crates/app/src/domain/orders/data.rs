//! Order Data

use jiff::Timestamp;
use nexus::{
    checkout::{CustomerContact, DeliveryDetails, DeliveryMethod, ValidatedDelivery},
    pricing::PriceBreakdown,
    ratings::RatingScores,
    status::OrderStatus,
};

use crate::domain::{
    accounts::records::UserUuid,
    catalog::records::BusinessUuid,
    orders::records::OrderUuid,
};

/// Checkout request for the cart lines of one business.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub business_uuid: BusinessUuid,
    pub delivery_method: DeliveryMethod,
    pub contact: CustomerContact,

    /// Required when `delivery_method` is delivery, ignored otherwise.
    pub delivery: Option<DeliveryDetails>,

    pub special_instructions: Option<String>,
    pub payment_method: Option<String>,
}

/// Narrows [`list_orders`](crate::domain::orders::OrdersService::list_orders).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub delivery_method: Option<DeliveryMethod>,
    pub business_uuid: Option<BusinessUuid>,

    /// Leave out cancelled and refunded orders.
    pub active_only: bool,
}

/// Delivery fields to set. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryInfoUpdate {
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub vehicle_info: Option<String>,
    pub estimated_arrival: Option<Timestamp>,
    pub actual_arrival: Option<Timestamp>,
    pub delivery_notes: Option<String>,
}

/// A customer's rating of a completed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRating {
    pub scores: RatingScores,
    pub review_text: String,
    pub is_public: bool,
}

impl NewRating {
    /// Public rating with no review text.
    pub fn new(scores: RatingScores) -> Self {
        Self {
            scores,
            review_text: String::new(),
            is_public: true,
        }
    }
}

/// Fully priced order waiting for an order number.
#[derive(Debug, Clone)]
pub(crate) struct NewOrder {
    pub uuid: OrderUuid,
    pub customer_uuid: UserUuid,
    pub business_uuid: BusinessUuid,
    pub delivery_method: DeliveryMethod,
    pub pricing: PriceBreakdown,
    pub contact: CustomerContact,
    pub delivery: Option<ValidatedDelivery>,
    pub special_instructions: Option<String>,
    pub payment_method: Option<String>,
}
