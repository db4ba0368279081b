//! Carts
//!
//! One cart per user, holding at most one line per product.

pub mod data;
pub mod errors;
pub mod models;
pub mod records;
mod repositories;
pub mod service;

pub use errors::CartsServiceError;
pub use service::*;
