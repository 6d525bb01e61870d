//! Transaction history

use chrono::NaiveDate;
use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::Transaction;

fn row_to_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let date_raw: String = row.get(2)?;
    Ok(Transaction {
        transaction_id: row.get(0)?,
        account_id: row.get(1)?,
        date: NaiveDate::parse_from_str(&date_raw, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        amount: row.get(3)?,
        merchant_name: row.get(4)?,
        category: row.get(5)?,
        pending: row.get::<_, i64>(6)? != 0,
    })
}

impl Database {
    /// Insert or replace a transaction
    pub fn upsert_transaction(&self, tx: &Transaction) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO transactions
             (transaction_id, account_id, date, amount, merchant_name, category, pending)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tx.transaction_id,
                tx.account_id,
                tx.date.format("%Y-%m-%d").to_string(),
                tx.amount,
                tx.merchant_name,
                tx.category,
                tx.pending as i64,
            ],
        )?;
        Ok(())
    }

    /// All settled transactions for a user within [start, end], newest first.
    ///
    /// Pending transactions are excluded; they have no settled amount and
    /// would skew the extractors.
    pub fn list_user_transactions(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT t.transaction_id, t.account_id, t.date, t.amount, t.merchant_name, t.category, t.pending
             FROM transactions t
             JOIN accounts a ON a.account_id = t.account_id
             WHERE a.user_id = ?1 AND t.pending = 0 AND t.date >= ?2 AND t.date <= ?3
             ORDER BY t.date DESC",
        )?;

        let txs = stmt
            .query_map(
                params![
                    user_id,
                    start.format("%Y-%m-%d").to_string(),
                    end.format("%Y-%m-%d").to_string()
                ],
                row_to_transaction,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(txs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountKind};

    #[test]
    fn test_window_query_excludes_pending_and_out_of_range() {
        let db = Database::in_memory().unwrap();
        db.upsert_user("u1", "Avery", true).unwrap();
        db.upsert_account(&Account {
            account_id: "chk-1001".to_string(),
            user_id: "u1".to_string(),
            name: "Checking".to_string(),
            kind: AccountKind::Depository,
            subtype: Some("checking".to_string()),
            available_balance: 100.0,
            current_balance: 100.0,
            credit_limit: None,
        })
        .unwrap();

        let mk = |id: &str, date: (i32, u32, u32), pending: bool| Transaction {
            transaction_id: id.to_string(),
            account_id: "chk-1001".to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            amount: -10.0,
            merchant_name: "COFFEE".to_string(),
            category: None,
            pending,
        };

        db.upsert_transaction(&mk("t1", (2026, 6, 1), false)).unwrap();
        db.upsert_transaction(&mk("t2", (2026, 6, 15), true)).unwrap();
        db.upsert_transaction(&mk("t3", (2026, 1, 1), false)).unwrap();

        let txs = db
            .list_user_transactions(
                "u1",
                NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            )
            .unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].transaction_id, "t1");
    }
}
