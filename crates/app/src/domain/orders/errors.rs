//! Orders service errors.

use nexus::{
    checkout::{AvailabilityIssues, ContactError, DeliveryDetailsError},
    pricing::AmountTooLarge,
    ratings::RatingDenied,
    status::TransitionError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    InvalidDelivery(#[from] DeliveryDetailsError),

    #[error(transparent)]
    InvalidContact(#[from] ContactError),

    #[error("no items in cart for this business")]
    NoItems,

    #[error("{0}")]
    Unavailable(AvailabilityIssues),

    #[error("{0}")]
    OutOfStock(AvailabilityIssues),

    #[error(transparent)]
    AmountTooLarge(#[from] AmountTooLarge),

    #[error("order not found")]
    NotFound,

    #[error("business not found")]
    BusinessNotFound,

    #[error("not allowed to change this order")]
    Forbidden,

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("{0}")]
    InvalidState(String),

    #[error("order has already been rated")]
    AlreadyRated,

    #[error("could not allocate a unique order number")]
    Conflict,

    #[error("order already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl OrdersServiceError {
    /// Whether the caller sent something that can never succeed as given.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDelivery(_)
                | Self::InvalidContact(_)
                | Self::NoItems
                | Self::Unavailable(_)
                | Self::AmountTooLarge(_)
        )
    }
}

impl From<AvailabilityIssues> for OrdersServiceError {
    fn from(issues: AvailabilityIssues) -> Self {
        if issues.any_inactive() {
            Self::Unavailable(issues)
        } else {
            Self::OutOfStock(issues)
        }
    }
}

impl From<RatingDenied> for OrdersServiceError {
    fn from(denied: RatingDenied) -> Self {
        match denied {
            RatingDenied::NotCustomer => Self::Forbidden,
            RatingDenied::NotCompleted(_) => Self::InvalidState(denied.to_string()),
            RatingDenied::AlreadyRated => Self::AlreadyRated,
        }
    }
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => {
                error!(error = ?error, "orders storage failure");

                Self::Sql(error)
            }
        }
    }
}
