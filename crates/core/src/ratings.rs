//! Ratings

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::OrderStatus;

/// Score outside the 1 to 5 star range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rating must be between 1 and 5 stars, got {0}")]
pub struct RatingScoreError(i64);

/// A 1 to 5 star score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Stars(u8);

impl Stars {
    /// Lowest score.
    pub const MIN: Stars = Stars(1);

    /// Highest score.
    pub const MAX: Stars = Stars(5);

    /// Validates a raw score.
    ///
    /// # Errors
    ///
    /// Returns a [`RatingScoreError`] for anything outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingScoreError> {
        u8::try_from(value)
            .ok()
            .filter(|stars| (Self::MIN.0..=Self::MAX.0).contains(stars))
            .map(Stars)
            .ok_or(RatingScoreError(value))
    }

    /// The score.
    pub fn get(self) -> u8 {
        self.0
    }

    /// The score as a storage integer.
    pub fn as_i16(self) -> i16 {
        i16::from(self.0)
    }
}

impl TryFrom<i64> for Stars {
    type Error = RatingScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Stars::new(value)
    }
}

impl TryFrom<i16> for Stars {
    type Error = RatingScoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Stars::new(i64::from(value))
    }
}

impl From<Stars> for i64 {
    fn from(stars: Stars) -> Self {
        i64::from(stars.0)
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Scores left by a customer for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScores {
    /// Overall experience.
    pub overall: Stars,

    /// Quality of what was ordered.
    pub food_quality: Option<Stars>,

    /// How quickly it arrived.
    pub delivery_speed: Option<Stars>,

    /// How the business treated the customer.
    pub customer_service: Option<Stars>,
}

impl RatingScores {
    /// Scores with only the overall rating set.
    pub fn overall(overall: Stars) -> Self {
        Self {
            overall,
            food_quality: None,
            delivery_speed: None,
            customer_service: None,
        }
    }
}

/// Why an order may not be rated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RatingDenied {
    /// Only the customer who placed the order may rate it.
    #[error("only the customer who placed this order can rate it")]
    NotCustomer,

    /// The order has not been completed.
    #[error("order must be completed before rating, it is {0}")]
    NotCompleted(OrderStatus),

    /// The order already carries a rating.
    #[error("order has already been rated")]
    AlreadyRated,
}

/// Decides whether an order can be rated.
///
/// The checks run in a fixed order: ownership, then status, then uniqueness.
///
/// # Errors
///
/// Returns the first [`RatingDenied`] reason that applies.
pub fn check_rating_gate(
    is_customer: bool,
    status: OrderStatus,
    already_rated: bool,
) -> Result<(), RatingDenied> {
    if !is_customer {
        return Err(RatingDenied::NotCustomer);
    }

    if status != OrderStatus::Completed {
        return Err(RatingDenied::NotCompleted(status));
    }

    if already_rated {
        return Err(RatingDenied::AlreadyRated);
    }

    Ok(())
}
