//! Pricing
//!
//! Fee and total calculations for orders. All amounts are exact decimals; fees are computed
//! from the unrounded subtotal and only rounded to cents when a [`PriceBreakdown`] is built,
//! which is the representation that gets persisted.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{checkout::DeliveryMethod, geo::GeoPoint};

/// Default flat delivery fee (5.00).
pub const DEFAULT_BASE_DELIVERY_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Default service fee rate (5%).
pub const DEFAULT_SERVICE_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Default tax rate (15%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Distance tiers as (upper bound in km, surcharge over the base fee).
const DISTANCE_TIERS: [(f64, Decimal); 3] = [
    (5.0, Decimal::ZERO),
    (10.0, Decimal::from_parts(200, 0, 0, false, 2)),
    (20.0, Decimal::from_parts(500, 0, 0, false, 2)),
];

/// Surcharge for anything beyond the last tier.
const LONG_DISTANCE_SURCHARGE: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// Number of decimal places money is stored with.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a money column holds (`NUMERIC(10, 2)`), 99 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// An amount that cannot be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{what} of {amount} exceeds the maximum of {max}", max = MAX_AMOUNT)]
pub struct AmountTooLarge {
    /// Which amount overflowed, e.g. `"subtotal"`.
    pub what: &'static str,

    /// The offending amount.
    pub amount: Decimal,
}

/// Checks that `amount`, once rounded to cents, fits a money column.
///
/// # Errors
///
/// Returns [`AmountTooLarge`] naming `what` when it does not.
pub fn check_amount(what: &'static str, amount: Decimal) -> Result<(), AmountTooLarge> {
    let amount = round_money(amount);

    if amount > MAX_AMOUNT {
        return Err(AmountTooLarge { what, amount });
    }

    Ok(())
}

/// Delivery fee for an order.
///
/// Pickup orders, and orders where either end of the route is unknown, pay the flat `base`.
/// Otherwise the fee is tiered by distance: up to 5km pays `base`, up to 10km `base + 2`,
/// up to 20km `base + 5` and anything further `base + 10`.
pub fn delivery_fee(
    method: DeliveryMethod,
    business: Option<&GeoPoint>,
    destination: Option<&GeoPoint>,
    base: Decimal,
) -> Decimal {
    let (DeliveryMethod::Delivery, Some(business), Some(destination)) =
        (method, business, destination)
    else {
        return base;
    };

    let distance_km = business.distance_km(destination);

    let surcharge = DISTANCE_TIERS
        .iter()
        .find(|(limit, _)| distance_km <= *limit)
        .map_or(LONG_DISTANCE_SURCHARGE, |(_, surcharge)| *surcharge);

    base + surcharge
}

/// Service fee: `subtotal × rate`.
pub fn service_fee(subtotal: Decimal, rate: Decimal) -> Decimal {
    Percentage::from(rate) * subtotal
}

/// Tax: `subtotal × rate`.
pub fn tax(subtotal: Decimal, rate: Decimal) -> Decimal {
    Percentage::from(rate) * subtotal
}

/// Order total: subtotal plus fees minus discount, never below zero.
pub fn total(
    subtotal: Decimal,
    delivery_fee: Decimal,
    service_fee: Decimal,
    tax_amount: Decimal,
    discount_amount: Decimal,
) -> Decimal {
    (subtotal + delivery_fee + service_fee + tax_amount - discount_amount).max(Decimal::ZERO)
}

/// Rounds an amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Pricing parameters applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Flat delivery fee and the base of the distance tiers.
    pub base_delivery_fee: Decimal,

    /// Service fee as a fraction of the subtotal.
    pub service_fee_rate: Decimal,

    /// Tax as a fraction of the subtotal.
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_delivery_fee: DEFAULT_BASE_DELIVERY_FEE,
            service_fee_rate: DEFAULT_SERVICE_FEE_RATE,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl PricingConfig {
    /// Prices an order.
    pub fn quote(
        &self,
        subtotal: Decimal,
        discount_amount: Decimal,
        method: DeliveryMethod,
        business: Option<&GeoPoint>,
        destination: Option<&GeoPoint>,
    ) -> PriceBreakdown {
        PriceBreakdown::new(
            subtotal,
            delivery_fee(method, business, destination, self.base_delivery_fee),
            service_fee(subtotal, self.service_fee_rate),
            tax(subtotal, self.tax_rate),
            discount_amount,
        )
    }
}

/// The monetary breakdown of an order, rounded to cents.
///
/// `total_amount` is always derived from the other components, so the breakdown cannot
/// disagree with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    subtotal: Decimal,
    delivery_fee: Decimal,
    service_fee: Decimal,
    tax_amount: Decimal,
    discount_amount: Decimal,
    total_amount: Decimal,
}

impl PriceBreakdown {
    /// Builds a breakdown from its components. Negative components are clamped to zero.
    pub fn new(
        subtotal: Decimal,
        delivery_fee: Decimal,
        service_fee: Decimal,
        tax_amount: Decimal,
        discount_amount: Decimal,
    ) -> Self {
        let [subtotal, delivery_fee, service_fee, tax_amount, discount_amount] = [
            subtotal,
            delivery_fee,
            service_fee,
            tax_amount,
            discount_amount,
        ]
        .map(|amount| round_money(amount.max(Decimal::ZERO)));

        Self {
            subtotal,
            delivery_fee,
            service_fee,
            tax_amount,
            discount_amount,
            total_amount: total(
                subtotal,
                delivery_fee,
                service_fee,
                tax_amount,
                discount_amount,
            ),
        }
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Delivery fee.
    pub fn delivery_fee(&self) -> Decimal {
        self.delivery_fee
    }

    /// Service fee.
    pub fn service_fee(&self) -> Decimal {
        self.service_fee
    }

    /// Tax.
    pub fn tax_amount(&self) -> Decimal {
        self.tax_amount
    }

    /// Discount.
    pub fn discount_amount(&self) -> Decimal {
        self.discount_amount
    }

    /// Amount payable.
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Checks every component against [`MAX_AMOUNT`].
    ///
    /// # Errors
    ///
    /// Returns the first component that does not fit, subtotal first and total last.
    pub fn check_storable(&self) -> Result<(), AmountTooLarge> {
        check_amount("subtotal", self.subtotal)?;
        check_amount("delivery fee", self.delivery_fee)?;
        check_amount("service fee", self.service_fee)?;
        check_amount("tax", self.tax_amount)?;
        check_amount("discount", self.discount_amount)?;
        check_amount("total", self.total_amount)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_pickup_pays_base_fee_regardless_of_distance() -> TestResult {
        let shop = GeoPoint::new(-26.0, 28.0)?;
        let far = GeoPoint::new(-25.0, 29.0)?;

        let fee = delivery_fee(DeliveryMethod::Pickup, Some(&shop), Some(&far), money(5_00));

        assert_eq!(fee, money(5_00));

        Ok(())
    }

    #[test]
    fn test_missing_location_pays_base_fee() -> TestResult {
        let shop = GeoPoint::new(-26.0, 28.0)?;

        assert_eq!(
            delivery_fee(DeliveryMethod::Delivery, Some(&shop), None, money(5_00)),
            money(5_00)
        );
        assert_eq!(
            delivery_fee(DeliveryMethod::Delivery, None, Some(&shop), money(5_00)),
            money(5_00)
        );

        Ok(())
    }

    #[test]
    fn test_delivery_fee_tiers() -> TestResult {
        let shop = GeoPoint::new(0.0, 0.0)?;

        // 0.01 degrees per ~1.11km
        let cases = [
            (0.04, money(5_00)),
            (0.08, money(7_00)),
            (0.15, money(10_00)),
            (0.30, money(15_00)),
        ];

        for (offset, expected) in cases {
            let destination = GeoPoint::new(0.0, offset)?;
            let fee = delivery_fee(
                DeliveryMethod::Delivery,
                Some(&shop),
                Some(&destination),
                money(5_00),
            );

            assert_eq!(fee, expected, "offset {offset}");
        }

        Ok(())
    }

    #[test]
    fn test_fees_are_exact_percentages() {
        assert_eq!(service_fee(money(25_00), DEFAULT_SERVICE_FEE_RATE), money(1_25));
        assert_eq!(tax(money(25_00), DEFAULT_TAX_RATE), money(3_75));
    }

    #[test]
    fn test_total_is_floored_at_zero() {
        assert_eq!(
            total(money(10_00), money(5_00), money(50), money(1_50), money(100_00)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_quote_for_pickup_order() {
        let breakdown = PricingConfig::default().quote(
            money(25_00),
            Decimal::ZERO,
            DeliveryMethod::Pickup,
            None,
            None,
        );

        assert_eq!(breakdown.subtotal(), money(25_00));
        assert_eq!(breakdown.delivery_fee(), money(5_00));
        assert_eq!(breakdown.service_fee(), money(1_25));
        assert_eq!(breakdown.tax_amount(), money(3_75));
        assert_eq!(breakdown.total_amount(), money(35_00));
    }

    #[test]
    fn test_breakdown_total_matches_components() {
        let vectors = [
            (0, 0, 0, 0, 0),
            (0, 5_00, 0, 0, 0),
            (0, 5_00, 0, 0, 10_00),
            (1, 5_00, 0, 0, 0),
            (19_99, 7_00, 1_00, 3_00, 2_50),
            (1_000_00, 15_00, 50_00, 150_00, 2_000_00),
            (33_33, 5_00, 1_67, 5_00, 0),
        ];

        for (subtotal, delivery, service, tax_amount, discount) in vectors {
            let b = PriceBreakdown::new(
                money(subtotal),
                money(delivery),
                money(service),
                money(tax_amount),
                money(discount),
            );

            let expected = (b.subtotal() + b.delivery_fee() + b.service_fee() + b.tax_amount()
                - b.discount_amount())
            .max(Decimal::ZERO);

            assert_eq!(b.total_amount(), expected);
            assert!(b.total_amount() >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_fractional_fees_round_to_cents_once() {
        // 5% of 0.33 is 0.0165 and 15% is 0.0495
        let breakdown = PricingConfig::default().quote(
            money(33),
            Decimal::ZERO,
            DeliveryMethod::Pickup,
            None,
            None,
        );

        assert_eq!(breakdown.service_fee(), money(2));
        assert_eq!(breakdown.tax_amount(), money(5));
        assert_eq!(breakdown.total_amount(), money(5_40));
    }

    #[test]
    fn test_max_amount_is_the_column_limit() {
        assert_eq!(MAX_AMOUNT, money(99_999_999_99));
        assert_eq!(check_amount("subtotal", MAX_AMOUNT), Ok(()));
        assert_eq!(
            check_amount("subtotal", MAX_AMOUNT + money(1)),
            Err(AmountTooLarge {
                what: "subtotal",
                amount: money(100_000_000_00),
            })
        );
    }

    #[test]
    fn test_huge_order_is_not_storable() {
        // 2 000 000 units at 100.00
        let breakdown = PricingConfig::default().quote(
            money(200_000_000_00),
            Decimal::ZERO,
            DeliveryMethod::Pickup,
            None,
            None,
        );

        let error = breakdown.check_storable().err();

        assert_eq!(error.map(|error| error.what), Some("subtotal"));
        assert_eq!(
            error.map(|error| error.to_string()).as_deref(),
            Some("subtotal of 200000000.00 exceeds the maximum of 99999999.99")
        );
    }

    #[test]
    fn test_fees_can_push_total_over_the_limit() {
        // fits on its own, but fees take the total past the limit
        let breakdown = PricingConfig::default().quote(
            money(90_000_000_00),
            Decimal::ZERO,
            DeliveryMethod::Pickup,
            None,
            None,
        );

        assert_eq!(breakdown.check_storable().map_err(|error| error.what), Err("total"));
    }

    #[test]
    fn test_ordinary_order_is_storable() {
        let breakdown = PricingConfig::default().quote(
            money(25_00),
            Decimal::ZERO,
            DeliveryMethod::Pickup,
            None,
            None,
        );

        assert_eq!(breakdown.check_storable(), Ok(()));
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(125, 3)), money(13));
        assert_eq!(round_money(Decimal::new(124, 3)), money(12));
    }
}
