//! Checkout
//!
//! Everything checkout decides before touching storage: how the order reaches the customer,
//! whether the delivery and contact details are complete, whether each cart line can still be
//! bought, and what the order costs.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    carts::{Quantity, line_total},
    geo::{GeoPoint, GeoPointError},
    status::ParseStatusError,
};

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Collected by the customer.
    #[default]
    Pickup,

    /// Taken to the customer's address.
    Delivery,
}

impl DeliveryMethod {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Delivery => "delivery",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMethod {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(DeliveryMethod::Pickup),
            "delivery" => Ok(DeliveryMethod::Delivery),
            _ => Err(ParseStatusError::new("delivery method", s)),
        }
    }
}

/// Names of missing fields, in input order.
pub type MissingFields = SmallVec<[&'static str; 3]>;

/// Incomplete or invalid delivery details.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeliveryDetailsError {
    /// One or more required fields were not supplied.
    #[error("{} required for delivery orders", .0.join(", "))]
    MissingFields(MissingFields),

    /// Coordinates were supplied but are not a valid location.
    #[error("invalid delivery location: {0}")]
    InvalidCoordinates(#[from] GeoPointError),
}

/// Delivery details as submitted at checkout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeliveryDetails {
    /// Street address.
    pub address: Option<String>,

    /// Latitude of the drop-off.
    pub latitude: Option<f64>,

    /// Longitude of the drop-off.
    pub longitude: Option<f64>,

    /// Instructions for the driver.
    pub notes: Option<String>,
}

/// Delivery details that passed [`validate_delivery`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDelivery {
    /// Street address, trimmed and non-empty.
    pub address: String,

    /// Drop-off location.
    pub location: GeoPoint,

    /// Instructions for the driver.
    pub notes: Option<String>,
}

/// Checks delivery details against the delivery method.
///
/// Pickup orders need nothing and any supplied details are ignored. Delivery orders need a
/// non-blank address and both coordinates.
///
/// # Errors
///
/// Returns [`DeliveryDetailsError::MissingFields`] naming every absent field, or
/// [`DeliveryDetailsError::InvalidCoordinates`] for out-of-range coordinates.
pub fn validate_delivery(
    method: DeliveryMethod,
    details: Option<&DeliveryDetails>,
) -> Result<Option<ValidatedDelivery>, DeliveryDetailsError> {
    if method == DeliveryMethod::Pickup {
        return Ok(None);
    }

    let empty = DeliveryDetails::default();
    let details = details.unwrap_or(&empty);

    let address = details
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty());

    let mut missing = MissingFields::new();

    if address.is_none() {
        missing.push("delivery_address");
    }

    if details.latitude.is_none() {
        missing.push("delivery_latitude");
    }

    if details.longitude.is_none() {
        missing.push("delivery_longitude");
    }

    let (Some(address), Some(latitude), Some(longitude)) =
        (address, details.latitude, details.longitude)
    else {
        return Err(DeliveryDetailsError::MissingFields(missing));
    };

    Ok(Some(ValidatedDelivery {
        address: address.to_string(),
        location: GeoPoint::new(latitude, longitude)?,
        notes: non_blank(details.notes.as_deref()),
    }))
}

/// Missing customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} required", .0.join(", "))]
pub struct ContactError(pub MissingFields);

/// Customer contact snapshot stored on the order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomerContact {
    /// Name to call out at pickup or delivery.
    pub name: String,

    /// Phone number.
    pub phone: String,

    /// Email address, if any.
    pub email: Option<String>,
}

impl CustomerContact {
    /// Trims the contact and checks the required fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ContactError`] naming each blank required field.
    pub fn validated(&self) -> Result<CustomerContact, ContactError> {
        let name = self.name.trim();
        let phone = self.phone.trim();

        let mut missing = MissingFields::new();

        if name.is_empty() {
            missing.push("customer_name");
        }

        if phone.is_empty() {
            missing.push("customer_phone");
        }

        if !missing.is_empty() {
            return Err(ContactError(missing));
        }

        Ok(CustomerContact {
            name: name.to_string(),
            phone: phone.to_string(),
            email: non_blank(self.email.as_deref()),
        })
    }
}

/// Live product state a cart line is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStock<'a> {
    /// Product name, for messages.
    pub name: &'a str,

    /// Whether the product is listed as active.
    pub active: bool,

    /// Whether stock is tracked at all.
    pub track_inventory: bool,

    /// Units on hand when tracked.
    pub stock_quantity: i64,
}

impl ProductStock<'_> {
    /// Whether any unit can be bought right now.
    pub fn in_stock(&self) -> bool {
        !self.track_inventory || self.stock_quantity > 0
    }

    /// Whether the product can be added to a cart.
    pub fn is_available(&self) -> bool {
        self.active && self.in_stock()
    }

    /// Checks that `quantity` units can be ordered.
    ///
    /// # Errors
    ///
    /// Returns the first [`AvailabilityIssue`] found.
    pub fn check(&self, quantity: Quantity) -> Result<(), AvailabilityIssue> {
        if !self.active {
            return Err(AvailabilityIssue::Inactive {
                name: self.name.to_string(),
            });
        }

        if !self.track_inventory {
            return Ok(());
        }

        if self.stock_quantity <= 0 {
            return Err(AvailabilityIssue::OutOfStock {
                name: self.name.to_string(),
            });
        }

        if i64::from(quantity) > self.stock_quantity {
            return Err(AvailabilityIssue::InsufficientStock {
                name: self.name.to_string(),
                available: self.stock_quantity,
            });
        }

        Ok(())
    }
}

/// Why a cart line cannot be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityIssue {
    /// The product has been delisted.
    #[error("{name} is no longer available")]
    Inactive {
        /// Product name.
        name: String,
    },

    /// No tracked stock left.
    #[error("{name} is out of stock")]
    OutOfStock {
        /// Product name.
        name: String,
    },

    /// Fewer units on hand than requested.
    #[error("only {available} units of {name} available")]
    InsufficientStock {
        /// Product name.
        name: String,
        /// Units on hand.
        available: i64,
    },
}

/// Every reason a set of cart lines cannot be ordered, in line order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct AvailabilityIssues(pub Vec<AvailabilityIssue>);

impl AvailabilityIssues {
    /// The individual issues.
    pub fn issues(&self) -> &[AvailabilityIssue] {
        &self.0
    }

    /// Whether any line is for a delisted product, as opposed to only stock shortfalls.
    pub fn any_inactive(&self) -> bool {
        self.0
            .iter()
            .any(|issue| matches!(issue, AvailabilityIssue::Inactive { .. }))
    }
}

/// Checks every line, collecting all problems rather than stopping at the first.
///
/// # Errors
///
/// Returns [`AvailabilityIssues`] holding one issue per offending line.
pub fn check_lines<'a, I>(lines: I) -> Result<(), AvailabilityIssues>
where
    I: IntoIterator<Item = (ProductStock<'a>, Quantity)>,
{
    let issues: Vec<_> = lines
        .into_iter()
        .filter_map(|(stock, quantity)| stock.check(quantity).err())
        .collect();

    if issues.is_empty() {
        return Ok(());
    }

    Err(AvailabilityIssues(issues))
}

/// Exact sum of `quantity × unit_price` over the lines.
pub fn subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Quantity, Decimal)>,
{
    lines
        .into_iter()
        .map(|(quantity, unit_price)| line_total(quantity, unit_price))
        .sum()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}
