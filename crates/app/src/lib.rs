//! Ordering core for the local business directory: carts, checkout, order lifecycle and
//! ratings on top of `PostgreSQL`.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod logging;

#[cfg(test)]
mod test;

mod uuids;
