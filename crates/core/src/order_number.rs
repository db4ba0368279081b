//! Order numbers
//!
//! Human-facing order identifiers of the form `ORD-YYYYMMDD-XXXX`, where `XXXX` is four
//! random characters drawn from `A-Z0-9`. Uniqueness is the store's concern; this module only
//! generates candidates and validates the shape.

use std::{fmt, str::FromStr};

use jiff::civil::Date;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Leading segment of every order number.
pub const PREFIX: &str = "ORD";

const DATE_LEN: usize = 8;

const SUFFIX_LEN: usize = 4;

const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A string that is not a well-formed order number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{0}` is not a valid order number")]
pub struct OrderNumberError(String);

/// A validated order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generates a candidate for an order placed on `date`.
    pub fn generate<R>(date: Date, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let suffix: String = (0..SUFFIX_LEN)
            .filter_map(|_| SUFFIX_CHARSET.choose(rng))
            .map(|byte| char::from(*byte))
            .collect();

        OrderNumber(format!("{PREFIX}-{}-{suffix}", date.strftime("%Y%m%d")))
    }

    /// Validates an order number.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderNumberError`] unless `value` matches `ORD-\d{8}-[A-Z0-9]{4}`.
    pub fn parse(value: &str) -> Result<Self, OrderNumberError> {
        let mut parts = value.split('-');

        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(PREFIX), Some(date), Some(suffix), None)
                if is_date_segment(date) && is_suffix_segment(suffix) =>
            {
                Ok(OrderNumber(value.to_string()))
            }
            _ => Err(OrderNumberError(value.to_string())),
        }
    }

    /// The order number as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_date_segment(segment: &str) -> bool {
    segment.len() == DATE_LEN && segment.bytes().all(|byte| byte.is_ascii_digit())
}

fn is_suffix_segment(segment: &str) -> bool {
    segment.len() == SUFFIX_LEN && segment.bytes().all(|byte| SUFFIX_CHARSET.contains(&byte))
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderNumber::parse(s)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        OrderNumber::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
