//! Catalog Data

use rust_decimal::Decimal;

use crate::domain::{
    accounts::records::UserUuid,
    catalog::records::{BusinessUuid, ProductStatus, ProductUuid},
};

/// New Business Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewBusiness {
    pub uuid: BusinessUuid,
    pub owner_uuid: UserUuid,
    pub name: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub business_uuid: BusinessUuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub track_inventory: bool,
    pub stock_quantity: i32,
}

/// Product Update Data
///
/// `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductUpdate {
    pub price: Option<Decimal>,
    pub status: Option<ProductStatus>,
    pub stock_quantity: Option<i32>,
}
