//! Order number allocation.

use jiff::civil::Date;
use mockall::automock;
use nexus::order_number::OrderNumber;
use rand::thread_rng;

/// Supplies candidate order numbers. Uniqueness is checked by the caller.
#[automock]
pub trait OrderNumberSource: Send + Sync {
    /// A candidate number for an order placed on `date`.
    fn next_number(&self, date: Date) -> OrderNumber;
}

/// Random four-character suffixes from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrderNumbers;

impl OrderNumberSource for RandomOrderNumbers {
    fn next_number(&self, date: Date) -> OrderNumber {
        OrderNumber::generate(date, &mut thread_rng())
    }
}
