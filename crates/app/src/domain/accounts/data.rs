//! Account Data

use crate::domain::accounts::records::{UserType, UserUuid};

/// New User Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// UUID to assign to the user row.
    pub uuid: UserUuid,

    /// Unique login name.
    pub username: String,

    /// Contact email.
    pub email: String,

    /// Role of the account.
    pub user_type: UserType,

    /// Contact phone number.
    pub phone: Option<String>,
}
