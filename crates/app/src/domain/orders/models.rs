//! Order Models

use nexus::status::OrderStatus;
use rust_decimal::Decimal;

use crate::domain::{
    catalog::records::BusinessUuid,
    orders::records::{
        DeliveryInfoRecord, OrderItemRecord, OrderRecord, RatingRecord, StatusHistoryRecord,
    },
};

/// An order with everything hanging off it.
#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,

    /// Newest first.
    pub history: Vec<StatusHistoryRecord>,

    pub delivery_info: Option<DeliveryInfoRecord>,
    pub rating: Option<RatingRecord>,
}

/// Order count and revenue over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodSummary {
    pub orders: i64,
    pub revenue: Decimal,
}

/// Order counts over fixed windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    pub all_time: PeriodSummary,

    /// Since midnight UTC.
    pub today: PeriodSummary,

    pub last_7_days: PeriodSummary,
    pub last_30_days: PeriodSummary,
}

/// Number of orders currently in one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub orders: i64,
}

/// Best-selling product by units sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProduct {
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

/// Rating aggregate over every rating of a business, public or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingSummary {
    /// Rounded to two places, `None` without ratings.
    pub average_rating: Option<Decimal>,
    pub total_ratings: i64,
}

/// Dashboard figures for a business owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessAnalytics {
    pub business_uuid: BusinessUuid,
    pub totals: OrderTotals,
    pub status_breakdown: Vec<StatusCount>,

    /// At most ten.
    pub top_products: Vec<TopProduct>,

    pub ratings: RatingSummary,
}
