//! Carts

use std::{fmt, num::NonZeroU32};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Quantity rejected by [`Quantity::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Zero or negative quantity.
    #[error("quantity must be at least 1, got {0}")]
    TooSmall(i64),

    /// Quantity does not fit the storage column.
    #[error("quantity {0} is too large")]
    TooLarge(i64),
}

/// Line item quantity, always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Quantity = Quantity(NonZeroU32::MIN);

    /// Largest quantity that fits a Postgres `INTEGER`.
    pub const MAX: i64 = 2_147_483_647;

    /// Validates a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`QuantityError`] if `value` is below one or above [`Quantity::MAX`].
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value > Self::MAX {
            return Err(QuantityError::TooLarge(value));
        }

        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Quantity)
            .ok_or(QuantityError::TooSmall(value))
    }

    /// Quantity as a plain integer.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Quantity as a storage integer.
    pub fn as_i32(self) -> i32 {
        // `new` caps the value at `i32::MAX`
        i32::try_from(self.0.get()).unwrap_or(i32::MAX)
    }

    /// Sum of two quantities, saturating at [`Quantity::MAX`].
    #[must_use]
    pub fn saturating_add(self, other: Quantity) -> Quantity {
        let sum = (i64::from(self.get()) + i64::from(other.get())).min(Self::MAX);

        Quantity::new(sum).unwrap_or(self)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Quantity::new(i64::from(value))
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        i64::from(quantity.get())
    }
}

impl From<Quantity> for Decimal {
    fn from(quantity: Quantity) -> Self {
        Decimal::from(quantity.get())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// `quantity × unit_price`, exact.
pub fn line_total(quantity: Quantity, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// Derived cart figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of item quantities.
    pub total_items: u64,

    /// Sum of line totals.
    pub total_amount: Decimal,
}

impl CartTotals {
    /// Totals over `(quantity, unit_price)` lines.
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (Quantity, Decimal)>,
    {
        lines
            .into_iter()
            .fold(CartTotals::default(), |totals, (quantity, unit_price)| {
                CartTotals {
                    total_items: totals.total_items + u64::from(quantity.get()),
                    total_amount: totals.total_amount + line_total(quantity, unit_price),
                }
            })
    }
}
