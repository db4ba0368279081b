//! Nexus prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{CartTotals, Quantity, QuantityError, line_total},
    checkout::{
        AvailabilityIssue, AvailabilityIssues, ContactError, CustomerContact, DeliveryDetails,
        DeliveryDetailsError, DeliveryMethod, ProductStock, ValidatedDelivery, check_lines,
        subtotal, validate_delivery,
    },
    geo::{GeoPoint, GeoPointError},
    order_number::{OrderNumber, OrderNumberError},
    pricing::{AmountTooLarge, MAX_AMOUNT, PriceBreakdown, PricingConfig, round_money},
    ratings::{RatingDenied, RatingScoreError, RatingScores, Stars, check_rating_gate},
    status::{OrderStatus, ParseStatusError, PaymentStatus, Transition, TransitionError},
};
