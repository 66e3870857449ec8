//! Account service for opening and looking up user accounts

pub mod service;
pub mod repository;
pub mod config;

pub use service::{AccountService, INITIAL_BALANCE, MIN_BALANCE};
pub use repository::{AccountRepository, InMemoryAccountRepository, PostgresAccountRepository};
pub use config::{AccountServiceConfig, ConnectionParams};
