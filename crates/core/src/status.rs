//! Order status machine.
//!
//! ```text
//! pending ─► confirmed ─► preparing ─► ready ─┬─► out_for_delivery ─► delivered ─► completed
//!                                             └─► completed
//!
//! pending | confirmed | preparing | ready | out_for_delivery ─► cancelled ─► refunded
//! ```
//!
//! `completed` and `refunded` are terminal.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value could not be parsed into one of the lifecycle enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed by the customer, awaiting the business.
    #[default]
    Pending,

    /// Accepted by the business.
    Confirmed,

    /// Being prepared.
    Preparing,

    /// Ready for pickup or hand-off to a driver.
    Ready,

    /// With a driver.
    OutForDelivery,

    /// Handed to the customer by a driver.
    Delivered,

    /// Finished (terminal).
    Completed,

    /// Cancelled before completion.
    Cancelled,

    /// Cancelled and refunded (terminal).
    Refunded,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    /// Statuses reachable in a single step from `self`.
    pub fn allowed_next(self) -> &'static [OrderStatus] {
        use OrderStatus::{
            Cancelled, Completed, Confirmed, Delivered, OutForDelivery, Preparing, Ready,
            Refunded,
        };

        match self {
            OrderStatus::Pending => &[Confirmed, Cancelled],
            OrderStatus::Confirmed => &[Preparing, Cancelled],
            OrderStatus::Preparing => &[Ready, Cancelled],
            OrderStatus::Ready => &[OutForDelivery, Completed, Cancelled],
            OrderStatus::OutForDelivery => &[Delivered, Cancelled],
            OrderStatus::Delivered => &[Completed],
            OrderStatus::Cancelled => &[Refunded],
            OrderStatus::Completed | OrderStatus::Refunded => &[],
        }
    }

    /// Returns true if `next` is a legal single step from `self`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Returns true unless the order was cancelled or refunded.
    pub fn is_active(self) -> bool {
        !matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    /// Returns true while a customer may still cancel their own order.
    pub fn is_customer_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Preparing
        )
    }

    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Ready for Pickup/Delivery",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }

    /// Plans a move from `self` to `next`.
    ///
    /// The returned [`Transition`] carries the history note (a generated description when
    /// `note` is blank) and which lifecycle timestamps the move stamps.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NotAllowed`] when `next` is not in [`Self::allowed_next`].
    pub fn transition_to(
        self,
        next: OrderStatus,
        note: Option<&str>,
    ) -> Result<Transition, TransitionError> {
        if !self.can_transition_to(next) {
            return Err(TransitionError::NotAllowed {
                from: self,
                to: next,
            });
        }

        let note = match note.map(str::trim) {
            Some(note) if !note.is_empty() => note.to_string(),
            _ => format!("Status changed from {self} to {next}"),
        };

        Ok(Transition {
            from: self,
            to: next,
            note,
        })
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError::new("order status", s))
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The target status is not reachable from the current one.
    #[error("cannot change status from {from} to {to}")]
    NotAllowed {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}

/// A validated status change, ready to be persisted alongside its history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    from: OrderStatus,
    to: OrderStatus,
    note: String,
}

impl Transition {
    /// Status before the change.
    pub fn from(&self) -> OrderStatus {
        self.from
    }

    /// Status after the change.
    pub fn to(&self) -> OrderStatus {
        self.to
    }

    /// History note for this change.
    pub fn note(&self) -> &str {
        &self.note
    }

    /// Whether the change should stamp `confirmed_at` (only if it is still unset).
    pub fn stamps_confirmed_at(&self) -> bool {
        self.to == OrderStatus::Confirmed
    }

    /// Whether the change should stamp `delivered_at` (only if it is still unset).
    pub fn stamps_delivered_at(&self) -> bool {
        self.to == OrderStatus::Delivered
    }
}

/// Payment progress of an order. No payments are processed here; the field is carried
/// for the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing collected yet.
    #[default]
    Pending,
    /// Being collected.
    Processing,
    /// Collected.
    Paid,
    /// Collection failed.
    Failed,
    /// Returned to the customer.
    Refunded,
}

impl PaymentStatus {
    const ALL: [PaymentStatus; 5] = [
        PaymentStatus::Pending,
        PaymentStatus::Processing,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError::new("payment status", s))
    }
}
