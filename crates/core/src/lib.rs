//! Nexus
//!
//! Nexus is the storage-free heart of the local business directory's ordering flow:
//! fee pricing, cart totals, checkout quoting, the order status machine, order numbers
//! and the rating gate. Everything here is pure; persistence lives in `nexus-app`.

pub mod carts;
pub mod checkout;
pub mod geo;
pub mod order_number;
pub mod prelude;
pub mod pricing;
pub mod ratings;
pub mod status;
