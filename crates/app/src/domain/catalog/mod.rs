//! Catalog
//!
//! Businesses and their products, as far as carts and checkout need them.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::CatalogServiceError;
pub(crate) use repository::PgCatalogRepository;
pub use service::*;
