//! Domain models for the account layer

pub mod account;
