//! Account model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Amount;

/// A financial account owned by a user
///
/// Values are always fully populated: a read that cannot produce all four
/// fields fails instead of returning a partial account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account number, assigned when the account is opened
    pub account_no: Uuid,
    /// Owning user (foreign key into `users.userid`)
    pub user_id: Uuid,
    /// Current balance
    pub balance: Amount,
    /// Minimum balance the account must keep
    pub min_balance: Amount,
}

impl Account {
    /// Assemble an account from its parts
    pub fn new(account_no: Uuid, user_id: Uuid, balance: Amount, min_balance: Amount) -> Self {
        Self {
            account_no,
            user_id,
            balance,
            min_balance,
        }
    }
}
