//! Account service implementation
//!
//! Applies the account opening policy on top of an [`AccountRepository`] and
//! exposes the use cases callers need. Repository errors are returned
//! unchanged; the service neither logs, retries nor suppresses them.

use std::sync::Arc;

use common::decimal::Amount;
use common::error::Result;
use common::model::account::Account;
use uuid::Uuid;

use crate::config::AccountServiceConfig;
use crate::repository::{AccountRepository, PostgresAccountRepository};

/// Balance every new account starts with
pub const INITIAL_BALANCE: Amount = Amount::ZERO;

/// Minimum balance assigned to every new account (500, scale 0)
pub const MIN_BALANCE: Amount = Amount::from_parts(500, 0, 0, false, 0);

/// Account service for opening and looking up accounts
#[derive(Clone)]
pub struct AccountService {
    /// Repository for account data
    repo: Arc<dyn AccountRepository>,
}

impl AccountService {
    /// Create a new account service on top of a repository
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    /// Create a new account service backed by PostgreSQL
    pub async fn with_config(config: &AccountServiceConfig) -> Result<Self> {
        let repo: Arc<dyn AccountRepository> =
            Arc::new(PostgresAccountRepository::with_config(config).await?);

        Ok(Self { repo })
    }

    /// Create the accounts table
    pub async fn create_account_table(&self) -> Result<()> {
        self.repo.create_table().await
    }

    /// Drop the accounts table
    pub async fn drop_accounts_table(&self) -> Result<()> {
        self.repo.drop_table().await
    }

    /// Open a new account for a user, returning its account number
    ///
    /// The account number is generated here; the balance starts at
    /// [`INITIAL_BALANCE`] and the minimum balance is [`MIN_BALANCE`].
    pub async fn create_account(&self, user_id: Uuid) -> Result<Uuid> {
        let account = Account::new(Uuid::new_v4(), user_id, INITIAL_BALANCE, MIN_BALANCE);
        self.repo.create_account(&account).await
    }

    /// Get an account by its account number
    pub async fn get_by_account_no(&self, account_no: Uuid) -> Result<Account> {
        self.repo.get_by_account_no(account_no).await
    }

    /// Get the single account owned by a user
    pub async fn get_account_by_user_id(&self, user_id: Uuid) -> Result<Account> {
        self.repo.get_account_by_user_id(user_id).await
    }

    /// Get every account owned by a user
    pub async fn get_accounts_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>> {
        self.repo.get_accounts_by_user_id(user_id).await
    }

    /// Get all accounts
    pub async fn get_all_accounts(&self) -> Result<Vec<Account>> {
        self.repo.get_all().await
    }

    /// Check that storage is reachable
    pub async fn ping(&self) -> Result<()> {
        self.repo.ping().await
    }
}
