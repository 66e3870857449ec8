//! Common types and utilities for the account layer
//!
//! This library holds the pieces shared by every account storage backend: the
//! error taxonomy, the `Account` domain model, decimal helpers, and the
//! PostgreSQL pool and row types.

pub mod error;
pub mod model;
pub mod decimal;
pub mod db;

/// Re-export important types
pub use error::{Error, Result};
pub use decimal::*;
pub use model::account::Account;

// Re-export database types
pub use db::{DbPool, models::DbAccount};
