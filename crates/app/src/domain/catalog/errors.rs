//! Catalog service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("business or product not found")]
    NotFound,

    /// The owning user or business does not exist.
    #[error("unknown owner")]
    UnknownOwner,

    #[error("a product with this id already exists")]
    Duplicate,

    /// Negative price or stock, or coordinates out of range.
    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CatalogServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::UnknownOwner,
            Some(ErrorKind::UniqueViolation) => Self::Duplicate,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => {
                error!(error = ?error, "catalog storage failure");
                Self::Sql(error)
            }
        }
    }
}
