//! Accounts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AccountsServiceError {
    #[error("username is already taken")]
    UsernameTaken,

    #[error("user not found")]
    NotFound,

    #[error("unknown user type or malformed account data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for AccountsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::UsernameTaken,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            _ => {
                error!(error = ?error, "accounts storage failure");
                Self::Sql(error)
            }
        }
    }
}
