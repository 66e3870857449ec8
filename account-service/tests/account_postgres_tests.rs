use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use account_service::{
    AccountRepository, AccountService, PostgresAccountRepository, INITIAL_BALANCE, MIN_BALANCE,
};
use common::error::Error;
use common::model::account::Account;
use dotenv::dotenv;
use futures::future::join_all;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

// PostgreSQL integration tests for account service
// These tests require a running PostgreSQL database and share its `accounts` table
// Run with: cargo test --test account_postgres_tests -- --ignored --test-threads=1

async fn create_test_pool() -> PgPool {
    dotenv().ok(); // Load .env if it exists

    let database_url = std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set to run PostgreSQL tests");

    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database")
}

// Fresh `accounts` table on top of a minimal `users` table
async fn create_test_service() -> (AccountService, PgPool) {
    let pool = create_test_pool().await;

    sqlx::query("CREATE TABLE IF NOT EXISTS users (userid UUID PRIMARY KEY)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("DROP TABLE IF EXISTS accounts")
        .execute(&pool)
        .await
        .unwrap();

    let repo = PostgresAccountRepository::new(pool.clone())
        .with_statement_timeout(Some(Duration::from_secs(5)));
    let service = AccountService::new(Arc::new(repo));
    service.create_account_table().await.unwrap();

    (service, pool)
}

async fn insert_user(pool: &PgPool) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (userid) VALUES ($1)")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    user_id
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_postgres_create_and_read_back() {
    let (service, pool) = create_test_service().await;
    let user_id = insert_user(&pool).await;

    let account_no = service.create_account(user_id).await.unwrap();

    let account = service.get_by_account_no(account_no).await.unwrap();
    assert_eq!(account.account_no, account_no);
    assert_eq!(account.user_id, user_id);
    assert_eq!(account.balance, INITIAL_BALANCE);
    assert_eq!(account.min_balance, MIN_BALANCE);

    let by_user = service.get_account_by_user_id(user_id).await.unwrap();
    assert_eq!(by_user, account);
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_postgres_unknown_user_is_constraint_violation() {
    let (service, _pool) = create_test_service().await;

    let result = service.create_account(Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::ConstraintViolation(_))));
    assert!(service.get_all_accounts().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_postgres_duplicate_account_no_is_constraint_violation() {
    let (service, pool) = create_test_service().await;
    let repo = PostgresAccountRepository::new(pool.clone());
    let user_id = insert_user(&pool).await;

    let account = Account::new(Uuid::new_v4(), user_id, INITIAL_BALANCE, MIN_BALANCE);
    repo.create_account(&account).await.unwrap();

    let result = repo.create_account(&account).await;
    assert!(matches!(result, Err(Error::ConstraintViolation(msg)) if msg.contains("accounts_pkey")));
    assert_eq!(service.get_all_accounts().await.unwrap(), vec![account]);
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_postgres_unknown_account_is_not_found() {
    let (service, _pool) = create_test_service().await;

    let result = service.get_by_account_no(Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_postgres_multiple_accounts_per_user() {
    let (service, pool) = create_test_service().await;
    let user_id = insert_user(&pool).await;

    service.create_account(user_id).await.unwrap();
    service.create_account(user_id).await.unwrap();

    let result = service.get_account_by_user_id(user_id).await;
    assert!(matches!(result, Err(Error::MultipleMatches(_))));

    let accounts = service.get_accounts_by_user_id(user_id).await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts[0].account_no < accounts[1].account_no);
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_postgres_concurrent_creation() {
    let (service, pool) = create_test_service().await;

    let mut users = Vec::new();
    for _ in 0..10 {
        users.push(insert_user(&pool).await);
    }

    let results = join_all(users.iter().map(|&user_id| service.create_account(user_id))).await;
    let created: HashSet<Uuid> = results.into_iter().map(|r| r.unwrap()).collect();

    let accounts = service.get_all_accounts().await.unwrap();
    assert_eq!(accounts.len(), users.len());
    let stored: HashSet<Uuid> = accounts.iter().map(|a| a.account_no).collect();
    assert_eq!(stored, created);
}

#[tokio::test]
#[ignore = "Requires test database"]
async fn test_postgres_table_lifecycle() {
    let (service, pool) = create_test_service().await;
    service.create_account(insert_user(&pool).await).await.unwrap();

    assert!(matches!(service.create_account_table().await, Err(Error::Storage(_))));

    service.drop_accounts_table().await.unwrap();
    assert!(matches!(service.drop_accounts_table().await, Err(Error::Storage(_))));

    service.create_account_table().await.unwrap();
    assert!(service.get_all_accounts().await.unwrap().is_empty());
    service.ping().await.unwrap();
}
