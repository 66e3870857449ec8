use std::time::Duration;

use async_trait::async_trait;
use common::db::{connect_pool, DbPool};
use common::error::{Error, Result};
use common::model::account::Account;
use common::DbAccount;
use tracing::{debug, Dispatch};
use uuid::Uuid;

use super::{AccountRepository, OperationLogger};
use crate::config::AccountServiceConfig;

const CREATE_ACCOUNTS_TABLE: &str = "CREATE TABLE accounts (
    accountno UUID PRIMARY KEY,
    userid UUID,
    balance DOUBLE PRECISION,
    minbalance DOUBLE PRECISION,
    CONSTRAINT accounts_userid_fkey FOREIGN KEY (userid) REFERENCES users(userid)
)";

const DROP_ACCOUNTS_TABLE: &str = "DROP TABLE accounts";

const SELECT_ACCOUNTS: &str = "SELECT accountno, userid, balance, minbalance FROM accounts";

const SELECT_BY_ACCOUNT_NO: &str =
    "SELECT accountno, userid, balance, minbalance FROM accounts WHERE accountno = $1";

// Two rows are enough to tell "one" from "many".
const SELECT_ONE_BY_USER_ID: &str =
    "SELECT accountno, userid, balance, minbalance FROM accounts WHERE userid = $1 LIMIT 2";

const SELECT_ALL_BY_USER_ID: &str =
    "SELECT accountno, userid, balance, minbalance FROM accounts WHERE userid = $1 ORDER BY accountno";

const INSERT_ACCOUNT: &str =
    "INSERT INTO accounts (accountno, userid, balance, minbalance) VALUES ($1, $2, $3, $4)";

/// PostgreSQL repository for account data
///
/// Holds only the pool handle; connections are borrowed per statement.
pub struct PostgresAccountRepository {
    /// Database connection pool
    pool: DbPool,
    logger: OperationLogger,
}

impl PostgresAccountRepository {
    /// Create a repository on top of an existing pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            logger: OperationLogger::default(),
        }
    }

    /// Connect a new pool as described by the configuration
    pub async fn with_config(config: &AccountServiceConfig) -> Result<Self> {
        let pool = connect_pool(
            config.connect_options()?,
            config.db_pool_size,
            config.acquire_timeout,
        )
        .await?;

        Ok(Self::new(pool).with_statement_timeout(config.statement_timeout))
    }

    /// Route this repository's diagnostics to the given logger
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger.set_dispatch(logger.into());
        self
    }

    /// Bound every statement by a deadline
    pub fn with_statement_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.logger.set_statement_timeout(timeout);
        self
    }

    /// The underlying pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn execute(&self, statement: &str) -> Result<()> {
        sqlx::query(statement).execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch_by_account_no(&self, account_no: Uuid) -> Result<Account> {
        debug!("Getting account from database: {}", account_no);

        let row = sqlx::query_as::<_, DbAccount>(SELECT_BY_ACCOUNT_NO)
            .bind(account_no)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Account not found: {}", account_no)))?;

        Account::try_from(row)
    }

    async fn fetch_all(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, DbAccount>(SELECT_ACCOUNTS)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn insert(&self, account: &Account) -> Result<Uuid> {
        debug!("Creating account {} for user {}", account.account_no, account.user_id);

        let row = DbAccount::try_from(account)?;
        sqlx::query(INSERT_ACCOUNT)
            .bind(row.accountno)
            .bind(row.userid)
            .bind(row.balance)
            .bind(row.minbalance)
            .execute(&self.pool)
            .await?;

        Ok(account.account_no)
    }

    async fn fetch_one_by_user_id(&self, user_id: Uuid) -> Result<Account> {
        debug!("Getting account for user: {}", user_id);

        let mut rows = sqlx::query_as::<_, DbAccount>(SELECT_ONE_BY_USER_ID)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        match rows.len() {
            0 => Err(Error::NotFound(format!("No account for user: {}", user_id))),
            1 => Account::try_from(rows.remove(0)),
            _ => Err(Error::MultipleMatches(format!("User {} owns more than one account", user_id))),
        }
    }

    async fn fetch_all_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>> {
        let rows = sqlx::query_as::<_, DbAccount>(SELECT_ALL_BY_USER_ID)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Account::try_from).collect()
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create_table(&self) -> Result<()> {
        self.logger.run("create_table", self.execute(CREATE_ACCOUNTS_TABLE)).await
    }

    async fn drop_table(&self) -> Result<()> {
        self.logger.run("drop_table", self.execute(DROP_ACCOUNTS_TABLE)).await
    }

    async fn get_by_account_no(&self, account_no: Uuid) -> Result<Account> {
        self.logger.run("get_by_account_no", self.fetch_by_account_no(account_no)).await
    }

    async fn get_all(&self) -> Result<Vec<Account>> {
        self.logger.run("get_all", self.fetch_all()).await
    }

    async fn create_account(&self, account: &Account) -> Result<Uuid> {
        self.logger.run("create_account", self.insert(account)).await
    }

    async fn get_account_by_user_id(&self, user_id: Uuid) -> Result<Account> {
        self.logger.run("get_account_by_user_id", self.fetch_one_by_user_id(user_id)).await
    }

    async fn get_accounts_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>> {
        self.logger.run("get_accounts_by_user_id", self.fetch_all_by_user_id(user_id)).await
    }

    async fn ping(&self) -> Result<()> {
        self.logger.run("ping", self.execute("SELECT 1")).await
    }
}
