//! Linked account operations

use rusqlite::params;
use std::str::FromStr;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{Account, AccountKind};

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let kind_raw: String = row.get(3)?;
    Ok(Account {
        account_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        kind: AccountKind::from_str(&kind_raw).unwrap_or(AccountKind::Depository),
        subtype: row.get(4)?,
        available_balance: row.get(5)?,
        current_balance: row.get(6)?,
        credit_limit: row.get(7)?,
    })
}

impl Database {
    /// Insert or replace an account
    pub fn upsert_account(&self, account: &Account) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO accounts
             (account_id, user_id, name, kind, subtype, available_balance, current_balance, credit_limit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                account.account_id,
                account.user_id,
                account.name,
                account.kind.as_str(),
                account.subtype,
                account.available_balance,
                account.current_balance,
                account.credit_limit,
            ],
        )?;
        Ok(())
    }

    /// All accounts belonging to a user
    pub fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT account_id, user_id, name, kind, subtype, available_balance, current_balance, credit_limit
             FROM accounts WHERE user_id = ?1 ORDER BY account_id",
        )?;

        let accounts = stmt
            .query_map(params![user_id], row_to_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Fetch a single account
    pub fn get_account(&self, account_id: &str) -> Result<Account> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT account_id, user_id, name, kind, subtype, available_balance, current_balance, credit_limit
             FROM accounts WHERE account_id = ?1",
        )?;

        stmt.query_row(params![account_id], row_to_account)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::NotFound(format!("account {}", account_id))
                }
                other => Error::Database(other),
            })
    }
}
