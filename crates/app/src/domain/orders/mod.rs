//! Orders
//!
//! Checkout, the order lifecycle, delivery details, ratings and the owner dashboard.

pub mod data;
pub mod errors;
pub mod models;
pub mod notifier;
pub mod numbers;
pub mod records;
mod repositories;
pub mod service;

pub use errors::OrdersServiceError;
pub use service::*;
