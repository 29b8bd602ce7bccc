use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use rusqlite::Connection;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::warn;

use turni_core::types::UserId;

use crate::error::{Result, SessionError};
use crate::types::UserSession;

/// Thread-safe store for persisted user sessions.
///
/// Wraps a single SQLite connection in a `Mutex` (sufficient for a
/// single-node bot). Separately keeps a registry of per-user async locks:
/// the interactive path and the reminder delivery path both acquire the
/// user's lock before reading or mutating the session, so a removal and a
/// concurrent firing never interleave on half-written state. Locks are
/// per-user on purpose — operations for different users run in parallel.
pub struct SessionStore {
    db: Mutex<Connection>,
    locks: DashMap<UserId, Arc<AsyncMutex<()>>>,
}

impl SessionStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
            locks: DashMap::new(),
        }
    }

    /// Acquire this user's mutual-exclusion lock. Hold the guard for the
    /// whole read-mutate-save sequence.
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Retrieve a session, returning `None` if the user was never seen.
    pub fn get(&self, user_id: UserId) -> Result<Option<UserSession>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT user_id, logged_in, group_id, active_input, cursor_week_date,
                    callback_token, reminders, pending_draft
             FROM sessions WHERE user_id = ?1",
            rusqlite::params![user_id.as_i64()],
            row_to_session,
        ) {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(SessionError::Database(e)),
        }
    }

    /// Return an existing session or create a fresh one (upsert pattern).
    pub fn get_or_create(&self, user_id: UserId) -> Result<UserSession> {
        if let Some(session) = self.get(user_id)? {
            return Ok(session);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO sessions (user_id, logged_in, created_at, updated_at)
             VALUES (?1, 0, ?2, ?2)",
            rusqlite::params![user_id.as_i64(), now],
        )?;
        drop(db);

        // Read back — handles the race where two tasks insert simultaneously.
        Ok(self.get(user_id)?.unwrap_or_else(|| UserSession::new(user_id)))
    }

    /// Persist the full session row. Called after every mutating operation,
    /// before the per-user lock is released.
    pub fn save(&self, session: &UserSession) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let reminders = serde_json::to_string(&session.reminders)?;
        let pending_draft = session
            .pending_draft
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO sessions
               (user_id, logged_in, group_id, active_input, cursor_week_date,
                callback_token, reminders, pending_draft, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?9)
             ON CONFLICT(user_id) DO UPDATE SET
               logged_in = excluded.logged_in,
               group_id = excluded.group_id,
               active_input = excluded.active_input,
               cursor_week_date = excluded.cursor_week_date,
               callback_token = excluded.callback_token,
               reminders = excluded.reminders,
               pending_draft = excluded.pending_draft,
               updated_at = excluded.updated_at",
            rusqlite::params![
                session.user_id.as_i64(),
                session.logged_in,
                session.group.as_ref().map(|g| g.as_str()),
                session.active_input.map(|k| k.to_string()),
                session.cursor_week_date.map(|d| d.to_string()),
                session.callback_token,
                reminders,
                pending_draft,
                now,
            ],
        )?;
        Ok(())
    }

    /// All persisted sessions — used by the startup rehydration pass and
    /// the admin broadcast.
    pub fn load_all(&self) -> Result<Vec<UserSession>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT user_id, logged_in, group_id, active_input, cursor_week_date,
                    callback_token, reminders, pending_draft
             FROM sessions ORDER BY user_id",
        )?;
        let rows = stmt.query_map([], row_to_session)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }
}

/// Map a SQLite row to a `UserSession`.
///
/// JSON columns are decoded defensively: a NULL or unreadable `reminders`
/// column becomes the empty list rather than an error.
fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserSession> {
    let user_id = UserId(row.get::<_, i64>(0)?);
    let active_input = row
        .get::<_, Option<String>>(3)?
        .and_then(|s| s.parse().ok());
    let cursor_week_date = row
        .get::<_, Option<String>>(4)?
        .and_then(|s| s.parse().ok());

    let reminders = match row.get::<_, Option<String>>(6)? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(user = %user_id, "unreadable reminders column, treating as empty: {e}");
            Vec::new()
        }),
        None => Vec::new(),
    };
    let pending_draft = row
        .get::<_, Option<String>>(7)?
        .and_then(|raw| serde_json::from_str(&raw).ok());

    Ok(UserSession {
        user_id,
        logged_in: row.get(1)?,
        group: row.get::<_, Option<String>>(2)?.map(turni_core::GroupId),
        active_input,
        cursor_week_date,
        callback_token: row.get(5)?,
        reminders,
        pending_draft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use turni_core::types::{GroupId, InputKind, PresenceStatus, ReminderDraft};

    fn store() -> SessionStore {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        SessionStore::new(conn)
    }

    #[test]
    fn get_or_create_then_get() {
        let store = store();
        let user = UserId(7);
        assert!(store.get(user).unwrap().is_none());

        let session = store.get_or_create(user).unwrap();
        assert!(!session.logged_in);
        assert!(store.get(user).unwrap().is_some());
    }

    #[test]
    fn save_round_trips_every_field() {
        let store = store();
        let mut session = store.get_or_create(UserId(7)).unwrap();
        session.logged_in = true;
        session.group = Some(GroupId::from_code("42"));
        session.active_input = Some(InputKind::ReminderTime);
        session.cursor_week_date = Some("2026-08-06".parse().unwrap());
        session.callback_token = Some("tok".into());
        let draft = ReminderDraft::seed(PresenceStatus::InOffice);
        session
            .reminders
            .push(draft.clone().into_reminder(NaiveTime::from_hms_opt(18, 30, 0).unwrap()));
        session.pending_draft = Some(draft);
        store.save(&session).unwrap();

        let loaded = store.get(UserId(7)).unwrap().unwrap();
        assert!(loaded.logged_in);
        assert_eq!(loaded.group, Some(GroupId::from_code("42")));
        assert_eq!(loaded.active_input, Some(InputKind::ReminderTime));
        assert_eq!(loaded.cursor_week_date, Some("2026-08-06".parse().unwrap()));
        assert_eq!(loaded.callback_token.as_deref(), Some("tok"));
        assert_eq!(loaded.reminders.len(), 1);
        assert!(loaded.pending_draft.is_some());
    }

    #[test]
    fn null_reminders_column_reads_as_empty() {
        let store = store();
        store.get_or_create(UserId(3)).unwrap();
        let loaded = store.get(UserId(3)).unwrap().unwrap();
        assert!(loaded.reminders.is_empty());
        assert!(loaded.pending_draft.is_none());
    }

    #[test]
    fn corrupt_reminders_column_reads_as_empty() {
        let store = store();
        store.get_or_create(UserId(3)).unwrap();
        {
            let db = store.db.lock().unwrap();
            db.execute(
                "UPDATE sessions SET reminders = 'not json' WHERE user_id = 3",
                [],
            )
            .unwrap();
        }
        let loaded = store.get(UserId(3)).unwrap().unwrap();
        assert!(loaded.reminders.is_empty());
    }

    #[test]
    fn load_all_returns_every_row() {
        let store = store();
        store.get_or_create(UserId(1)).unwrap();
        store.get_or_create(UserId(2)).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn per_user_locks_are_independent() {
        let store = Arc::new(store());
        let guard_a = store.lock(UserId(1)).await;
        // A different user's lock must not block.
        let guard_b = store.lock(UserId(2)).await;
        drop(guard_a);
        drop(guard_b);
        // Re-acquiring after drop works.
        let _again = store.lock(UserId(1)).await;
    }
}
