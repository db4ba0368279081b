//! Accounts
//!
//! The identity side of the system: who is acting, and in which role.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::AccountsServiceError;
pub(crate) use repository::PgAccountsRepository;
pub use service::*;
