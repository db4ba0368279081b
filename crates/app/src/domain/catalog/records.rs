//! Catalog Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use nexus::{checkout::ProductStock, geo::GeoPoint};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{domain::accounts::records::UserUuid, uuids::TypedUuid};

/// Business UUID
pub type BusinessUuid = TypedUuid<BusinessRecord>;

/// Business Record
#[derive(Debug, Clone)]
pub struct BusinessRecord {
    pub uuid: BusinessUuid,
    pub owner_uuid: UserUuid,
    pub name: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BusinessRecord {
    /// Where the business is, when both coordinates are known.
    pub fn location(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.latitude?, self.longitude?).ok()
    }

    /// Whether `user` owns this business.
    pub fn is_owned_by(&self, user: UserUuid) -> bool {
        self.owner_uuid == user
    }
}

/// Unknown product `status` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product status `{0}`")]
pub struct ParseProductStatusError(String);

/// Listing status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductStatus {
    Active,
    Inactive,
    OutOfStock,
}

impl ProductStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ParseProductStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "out_of_stock" => Ok(ProductStatus::OutOfStock),
            other => Err(ParseProductStatusError(other.to_string())),
        }
    }
}

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub business_uuid: BusinessUuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub status: ProductStatus,
    pub track_inventory: bool,
    pub stock_quantity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductRecord {
    /// Live stock view used by availability checks.
    pub fn stock(&self) -> ProductStock<'_> {
        ProductStock {
            name: &self.name,
            active: self.status == ProductStatus::Active,
            track_inventory: self.track_inventory,
            stock_quantity: i64::from(self.stock_quantity),
        }
    }

    /// Whether at least one unit can be bought.
    pub fn in_stock(&self) -> bool {
        self.stock().in_stock()
    }
}
