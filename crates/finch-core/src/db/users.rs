//! User records and consent state

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

impl Database {
    /// Insert or replace a user
    pub fn upsert_user(&self, user_id: &str, name: &str, consent_granted: bool) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (user_id, name, consent_granted)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET name = ?2, consent_granted = ?3",
            params![user_id, name, consent_granted as i64],
        )?;
        Ok(())
    }

    /// Insert a user with an explicit creation timestamp (seeding and tests)
    pub fn insert_user_created_at(
        &self,
        user_id: &str,
        name: &str,
        consent_granted: bool,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO users (user_id, name, consent_granted, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                name,
                consent_granted as i64,
                created_at.format("%Y-%m-%d %H:%M:%S").to_string()
            ],
        )?;
        Ok(())
    }

    /// Fetch a user, erroring with NotFound when absent
    pub fn get_user(&self, user_id: &str) -> Result<User> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, name, consent_granted, created_at FROM users WHERE user_id = ?1",
        )?;

        let user = stmt
            .query_row(params![user_id], |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    name: row.get(1)?,
                    consent_granted: row.get::<_, i64>(2)? != 0,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            })
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::NotFound(format!("user {}", user_id))
                }
                other => Error::Database(other),
            })?;

        Ok(user)
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, name, consent_granted, created_at FROM users ORDER BY user_id",
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    name: row.get(1)?,
                    consent_granted: row.get::<_, i64>(2)? != 0,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Update consent for a user
    pub fn set_consent(&self, user_id: &str, granted: bool) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET consent_granted = ?2 WHERE user_id = ?1",
            params![user_id, granted as i64],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("user {}", user_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();
        db.upsert_user("u1", "Avery", true).unwrap();

        let user = db.get_user("u1").unwrap();
        assert_eq!(user.name, "Avery");
        assert!(user.consent_granted);

        db.set_consent("u1", false).unwrap();
        assert!(!db.get_user("u1").unwrap().consent_granted);
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let db = Database::in_memory().unwrap();
        match db.get_user("ghost") {
            Err(Error::NotFound(msg)) => assert!(msg.contains("ghost")),
            other => panic!("expected NotFound, got {:?}", other.map(|u| u.user_id)),
        }
    }
}
