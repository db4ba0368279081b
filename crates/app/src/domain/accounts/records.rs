//! Account Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// Unknown `user_type` value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown user type `{0}`")]
pub struct ParseUserTypeError(String);

/// Role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserType {
    /// Buys from businesses.
    Customer,

    /// Owns one or more businesses.
    BusinessOwner,

    /// Platform staff.
    Admin,
}

impl UserType {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::BusinessOwner => "business_owner",
            UserType::Admin => "admin",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = ParseUserTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(UserType::Customer),
            "business_owner" => Ok(UserType::BusinessOwner),
            "admin" => Ok(UserType::Admin),
            other => Err(ParseUserTypeError(other.to_string())),
        }
    }
}

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub uuid: UserUuid,

    /// Unique login name.
    pub username: String,

    /// Contact email.
    pub email: String,

    /// Role of the account.
    pub user_type: UserType,

    /// Contact phone number.
    pub phone: Option<String>,

    /// Creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,
}

impl UserRecord {
    /// Whether the account owns businesses.
    pub fn is_business_owner(&self) -> bool {
        self.user_type == UserType::BusinessOwner
    }
}
