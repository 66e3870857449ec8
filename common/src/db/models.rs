use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sqlx::FromRow;
use uuid::Uuid;

use crate::decimal::Amount;
use crate::error::{Error, Result};
use crate::model::account::Account;

/// Database model for the `accounts` table
///
/// Column names follow the table exactly; balances are `DOUBLE PRECISION`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbAccount {
    pub accountno: Uuid,
    pub userid: Uuid,
    pub balance: f64,
    pub minbalance: f64,
}

impl TryFrom<&Account> for DbAccount {
    type Error = Error;

    fn try_from(account: &Account) -> Result<Self> {
        Ok(Self {
            accountno: account.account_no,
            userid: account.user_id,
            balance: amount_to_column("balance", account.balance)?,
            minbalance: amount_to_column("minbalance", account.min_balance)?,
        })
    }
}

impl TryFrom<DbAccount> for Account {
    type Error = Error;

    fn try_from(row: DbAccount) -> Result<Self> {
        Ok(Account {
            account_no: row.accountno,
            user_id: row.userid,
            balance: column_to_amount("balance", row.balance)?,
            min_balance: column_to_amount("minbalance", row.minbalance)?,
        })
    }
}

fn amount_to_column(column: &str, amount: Amount) -> Result<f64> {
    amount
        .to_f64()
        .ok_or_else(|| Error::Storage(format!("Cannot encode {} value {}", column, amount)))
}

fn column_to_amount(column: &str, value: f64) -> Result<Amount> {
    Amount::from_f64(value)
        .ok_or_else(|| Error::Storage(format!("Invalid {} value in row: {}", column, value)))
}
