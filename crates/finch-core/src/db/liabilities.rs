//! Credit liability detail

use chrono::NaiveDate;
use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::Liability;

impl Database {
    /// Insert or replace liability detail for a credit account
    pub fn upsert_liability(&self, liability: &Liability) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO liabilities
             (account_id, apr, minimum_payment_amount, is_overdue, last_statement_balance, next_payment_due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                liability.account_id,
                liability.apr,
                liability.minimum_payment_amount,
                liability.is_overdue as i64,
                liability.last_statement_balance,
                liability
                    .next_payment_due_date
                    .map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    /// All liabilities attached to a user's accounts
    pub fn list_user_liabilities(&self, user_id: &str) -> Result<Vec<Liability>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT l.account_id, l.apr, l.minimum_payment_amount, l.is_overdue,
                    l.last_statement_balance, l.next_payment_due_date
             FROM liabilities l
             JOIN accounts a ON a.account_id = l.account_id
             WHERE a.user_id = ?1
             ORDER BY l.account_id",
        )?;

        let liabilities = stmt
            .query_map(params![user_id], |row| {
                let due_raw: Option<String> = row.get(5)?;
                Ok(Liability {
                    account_id: row.get(0)?,
                    apr: row.get(1)?,
                    minimum_payment_amount: row.get(2)?,
                    is_overdue: row.get::<_, i64>(3)? != 0,
                    last_statement_balance: row.get(4)?,
                    next_payment_due_date: due_raw
                        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(liabilities)
    }
}
