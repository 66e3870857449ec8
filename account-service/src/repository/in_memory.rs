use std::future::ready;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use common::error::{Error, Result};
use common::model::account::Account;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use tracing::Dispatch;
use uuid::Uuid;

use super::{AccountRepository, OperationLogger};

/// In-memory repository for account data
///
/// Mirrors the PostgreSQL table closely enough to exercise the service without
/// a database: the table has to be created before use, account numbers are a
/// primary key, and accounts may only reference users registered with
/// [`InMemoryAccountRepository::register_user`].
pub struct InMemoryAccountRepository {
    /// Accounts by account number
    accounts: DashMap<Uuid, Account>,
    /// Known user IDs, standing in for the `users` table
    users: DashSet<Uuid>,
    /// Whether the `accounts` table exists. Row operations hold the read side
    /// for their whole duration; create and drop take the write side.
    table: RwLock<bool>,
    logger: OperationLogger,
}

impl InMemoryAccountRepository {
    /// Create a new in-memory account repository with no `accounts` table
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            users: DashSet::new(),
            table: RwLock::new(false),
            logger: OperationLogger::default(),
        }
    }

    /// Route this repository's diagnostics to the given logger
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger.set_dispatch(logger.into());
        self
    }

    /// Make a user ID available as a foreign-key target
    pub fn register_user(&self, user_id: Uuid) {
        self.users.insert(user_id);
    }

    // A panic while holding the lock leaves the flag itself intact
    fn table_read(&self) -> RwLockReadGuard<'_, bool> {
        self.table.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn table_write(&self) -> RwLockWriteGuard<'_, bool> {
        self.table.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn require_table(&self) -> Result<RwLockReadGuard<'_, bool>> {
        let table = self.table_read();
        if *table {
            Ok(table)
        } else {
            Err(Error::Storage("relation \"accounts\" does not exist".to_string()))
        }
    }

    fn create(&self) -> Result<()> {
        let mut table = self.table_write();
        if *table {
            return Err(Error::Storage("relation \"accounts\" already exists".to_string()));
        }
        *table = true;
        Ok(())
    }

    fn drop_accounts(&self) -> Result<()> {
        let mut table = self.table_write();
        if !*table {
            return Err(Error::Storage("table \"accounts\" does not exist".to_string()));
        }
        self.accounts.clear();
        *table = false;
        Ok(())
    }

    fn find(&self, account_no: Uuid) -> Result<Account> {
        let _table = self.require_table()?;
        self.accounts
            .get(&account_no)
            .map(|a| a.clone())
            .ok_or_else(|| Error::NotFound(format!("Account not found: {}", account_no)))
    }

    fn all(&self) -> Result<Vec<Account>> {
        let _table = self.require_table()?;
        Ok(self.accounts.iter().map(|entry| entry.value().clone()).collect())
    }

    fn insert(&self, account: &Account) -> Result<Uuid> {
        let _table = self.require_table()?;

        if !self.users.contains(&account.user_id) {
            return Err(Error::ConstraintViolation(format!(
                "user {} is not present in table \"users\" (accounts_userid_fkey)",
                account.user_id
            )));
        }

        match self.accounts.entry(account.account_no) {
            Entry::Occupied(_) => Err(Error::ConstraintViolation(format!(
                "duplicate account number {} (accounts_pkey)",
                account.account_no
            ))),
            Entry::Vacant(slot) => {
                slot.insert(account.clone());
                Ok(account.account_no)
            }
        }
    }

    fn owned_by(&self, user_id: Uuid) -> Result<Vec<Account>> {
        let _table = self.require_table()?;
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|account| account.account_no);
        Ok(accounts)
    }

    fn one_owned_by(&self, user_id: Uuid) -> Result<Account> {
        let mut accounts = self.owned_by(user_id)?;
        match accounts.len() {
            0 => Err(Error::NotFound(format!("No account for user: {}", user_id))),
            1 => Ok(accounts.remove(0)),
            _ => Err(Error::MultipleMatches(format!("User {} owns more than one account", user_id))),
        }
    }
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create_table(&self) -> Result<()> {
        self.logger.run("create_table", ready(self.create())).await
    }

    async fn drop_table(&self) -> Result<()> {
        self.logger.run("drop_table", ready(self.drop_accounts())).await
    }

    async fn get_by_account_no(&self, account_no: Uuid) -> Result<Account> {
        self.logger.run("get_by_account_no", ready(self.find(account_no))).await
    }

    async fn get_all(&self) -> Result<Vec<Account>> {
        self.logger.run("get_all", ready(self.all())).await
    }

    async fn create_account(&self, account: &Account) -> Result<Uuid> {
        self.logger.run("create_account", ready(self.insert(account))).await
    }

    async fn get_account_by_user_id(&self, user_id: Uuid) -> Result<Account> {
        self.logger.run("get_account_by_user_id", ready(self.one_owned_by(user_id))).await
    }

    async fn get_accounts_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>> {
        self.logger.run("get_accounts_by_user_id", ready(self.owned_by(user_id))).await
    }

    async fn ping(&self) -> Result<()> {
        self.logger.run("ping", ready(Ok(()))).await
    }
}
