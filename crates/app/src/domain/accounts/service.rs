//! Accounts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::accounts::{
        data::NewUser,
        errors::AccountsServiceError,
        records::{UserRecord, UserUuid},
        repository::PgAccountsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgAccountsService {
    db: Db,
    repository: PgAccountsRepository,
}

impl PgAccountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAccountsRepository::new(),
        }
    }
}

#[async_trait]
impl AccountsService for PgAccountsService {
    #[tracing::instrument(
        name = "accounts.service.create_user",
        skip(self, user),
        fields(user_uuid = %user.uuid, user_type = %user.user_type),
        err
    )]
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_user(&mut tx, user).await?;

        tx.commit().await?;

        info!(user_uuid = %created.uuid, "created user");

        Ok(created)
    }

    async fn get_user(&self, uuid: UserUuid) -> Result<UserRecord, AccountsServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self.repository.get_user(&mut tx, uuid).await?;

        tx.commit().await?;

        Ok(user)
    }
}

#[automock]
#[async_trait]
/// Identity lookups and registration.
pub trait AccountsService: Send + Sync {
    /// Registers a user.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AccountsServiceError>;

    /// Retrieves a single user.
    async fn get_user(&self, uuid: UserUuid) -> Result<UserRecord, AccountsServiceError>;
}
