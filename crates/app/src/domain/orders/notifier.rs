//! Order notifications.
//!
//! Notifications are sent after the transaction that caused them commits. A failed
//! notification is logged and never undoes the change.

use async_trait::async_trait;
use mockall::automock;
use nexus::{order_number::OrderNumber, status::OrderStatus};
use thiserror::Error;
use tracing::info;

use crate::domain::{
    accounts::records::UserUuid, catalog::records::BusinessUuid, orders::records::OrderUuid,
};

/// Something worth telling the customer or business about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent {
    Created {
        order_uuid: OrderUuid,
        order_number: OrderNumber,
        customer_uuid: UserUuid,
        business_uuid: BusinessUuid,
    },
    StatusChanged {
        order_uuid: OrderUuid,
        order_number: OrderNumber,
        from: OrderStatus,
        to: OrderStatus,
        changed_by: Option<UserUuid>,
    },
}

impl OrderEvent {
    /// Short event name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderEvent::Created { .. } => "order_created",
            OrderEvent::StatusChanged { .. } => "status_changed",
        }
    }

    pub fn order_uuid(&self) -> OrderUuid {
        match self {
            OrderEvent::Created { order_uuid, .. } | OrderEvent::StatusChanged { order_uuid, .. } => {
                *order_uuid
            }
        }
    }
}

#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[automock]
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Deliver `event`.
    async fn notify(&self, event: OrderEvent) -> Result<(), NotifyError>;
}

/// Writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn notify(&self, event: OrderEvent) -> Result<(), NotifyError> {
        match &event {
            OrderEvent::Created {
                order_uuid,
                order_number,
                business_uuid,
                ..
            } => info!(
                %order_uuid,
                %order_number,
                %business_uuid,
                event = event.kind(),
                "order notification"
            ),
            OrderEvent::StatusChanged {
                order_uuid,
                order_number,
                from,
                to,
                ..
            } => info!(
                %order_uuid,
                %order_number,
                %from,
                %to,
                event = event.kind(),
                "order notification"
            ),
        }

        Ok(())
    }
}
