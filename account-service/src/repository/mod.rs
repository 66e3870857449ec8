//! Repository for account data

mod in_memory;
mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use common::error::{Error, Result};
use common::model::account::Account;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, Dispatch};
use uuid::Uuid;

pub use in_memory::InMemoryAccountRepository;
pub use postgres::PostgresAccountRepository;

/// Account repository trait defining the interface for account data storage
///
/// Every method issues at most one statement. Dropping the returned future
/// cancels the statement in flight.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create the `accounts` table
    async fn create_table(&self) -> Result<()>;

    /// Drop the `accounts` table
    async fn drop_table(&self) -> Result<()>;

    /// Get an account by its account number
    async fn get_by_account_no(&self, account_no: Uuid) -> Result<Account>;

    /// Get every stored account, in no particular order
    async fn get_all(&self) -> Result<Vec<Account>>;

    /// Insert a fully populated account, returning its account number
    async fn create_account(&self, account: &Account) -> Result<Uuid>;

    /// Get the single account owned by a user
    ///
    /// Fails with `Error::MultipleMatches` when the user owns more than one.
    async fn get_account_by_user_id(&self, user_id: Uuid) -> Result<Account>;

    /// Get every account owned by a user, ordered by account number
    async fn get_accounts_by_user_id(&self, user_id: Uuid) -> Result<Vec<Account>>;

    /// Check that the storage engine answers
    async fn ping(&self) -> Result<()>;
}

/// Runs repository operations under the injected logger and statement deadline
///
/// Failed operations are logged here, once, before the error is handed back.
#[derive(Clone, Default)]
pub(crate) struct OperationLogger {
    dispatch: Option<Dispatch>,
    statement_timeout: Option<Duration>,
}

impl OperationLogger {
    pub(crate) fn set_dispatch(&mut self, dispatch: Dispatch) {
        self.dispatch = Some(dispatch);
    }

    pub(crate) fn set_statement_timeout(&mut self, timeout: Option<Duration>) {
        self.statement_timeout = timeout;
    }

    pub(crate) async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let observed = observe(operation, self.statement_timeout, fut);
        match &self.dispatch {
            Some(dispatch) => observed.with_subscriber(dispatch.clone()).await,
            None => observed.await,
        }
    }
}

async fn observe<T, F>(operation: &'static str, statement_timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(operation, "Executing account repository operation");

    let result = match statement_timeout {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "{} did not complete within {:?}",
                operation, limit
            ))),
        },
        None => fut.await,
    };

    if let Err(err) = &result {
        error!(operation, error = %err, "Account repository operation failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_statement_timeout_elapses() {
        let mut logger = OperationLogger::default();
        logger.set_statement_timeout(Some(Duration::from_millis(10)));

        let result: Result<()> = logger
            .run("slow_query", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(Error::Timeout(msg)) if msg.contains("slow_query")));
    }

    #[tokio::test]
    async fn test_errors_pass_through_unchanged() {
        let logger = OperationLogger::default();

        let result: Result<()> = logger
            .run("get_by_account_no", async {
                Err(Error::NotFound("account".to_string()))
            })
            .await;

        assert_eq!(result, Err(Error::NotFound("account".to_string())));
    }
}
