//! Persisted decision traces (operator review queue)
//!
//! Every persona assignment writes its decision trace here so operators can
//! audit how a recommendation was produced and approve or flag it.

use rusqlite::params;
use std::str::FromStr;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ReviewStatus, StoredTrace};

fn row_to_trace(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredTrace> {
    let status_raw: String = row.get(5)?;
    let payload_raw: String = row.get(4)?;
    Ok(StoredTrace {
        id: row.get(0)?,
        user_id: row.get(1)?,
        selected_persona: row.get(2)?,
        selection_reason: row.get(3)?,
        payload: serde_json::from_str(&payload_raw).unwrap_or(serde_json::Value::Null),
        review_status: ReviewStatus::from_str(&status_raw).unwrap_or(ReviewStatus::Pending),
        reviewer_note: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

impl Database {
    /// Persist a decision trace, returning its queue id
    pub fn insert_trace(
        &self,
        user_id: &str,
        selected_persona: &str,
        selection_reason: &str,
        payload: &serde_json::Value,
    ) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO decision_traces (user_id, selected_persona, selection_reason, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                selected_persona,
                selection_reason,
                serde_json::to_string(payload)?
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List traces, optionally filtered by review status, newest first
    pub fn list_traces(&self, status: Option<ReviewStatus>, limit: i64) -> Result<Vec<StoredTrace>> {
        let conn = self.conn()?;

        let traces = match status {
            Some(status) => {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, selected_persona, selection_reason, payload,
                            review_status, reviewer_note, created_at
                     FROM decision_traces WHERE review_status = ?1
                     ORDER BY id DESC LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(params![status.as_str(), limit], row_to_trace)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, selected_persona, selection_reason, payload,
                            review_status, reviewer_note, created_at
                     FROM decision_traces ORDER BY id DESC LIMIT ?1",
                )?;
                let rows = stmt
                    .query_map(params![limit], row_to_trace)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(traces)
    }

    /// Fetch one trace
    pub fn get_trace(&self, id: i64) -> Result<StoredTrace> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, selected_persona, selection_reason, payload,
                    review_status, reviewer_note, created_at
             FROM decision_traces WHERE id = ?1",
        )?;

        stmt.query_row(params![id], row_to_trace).map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound(format!("trace {}", id)),
            other => Error::Database(other),
        })
    }

    /// Resolve a trace in the review queue
    pub fn resolve_trace(
        &self,
        id: i64,
        status: ReviewStatus,
        reviewer_note: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE decision_traces SET review_status = ?2, reviewer_note = ?3 WHERE id = ?1",
            params![id, status.as_str(), reviewer_note],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("trace {}", id)));
        }
        Ok(())
    }

    /// Count of traces per review status, for the report
    pub fn count_traces_for_user(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM decision_traces WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
