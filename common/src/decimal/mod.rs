//! Decimal type utilities for precise financial amounts

pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Monetary amount (balances, minimum balances)
pub type Amount = Decimal;
