use rusqlite::Connection;

use crate::error::Result;

/// Initialise the sessions schema in `conn`.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
/// `reminders` and `pending_draft` are JSON columns; NULL is read back as
/// empty / absent.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            user_id          INTEGER NOT NULL PRIMARY KEY,
            logged_in        INTEGER NOT NULL DEFAULT 0,
            group_id         TEXT,
            active_input     TEXT,
            cursor_week_date TEXT,               -- ISO date or NULL
            callback_token   TEXT,
            reminders        TEXT,               -- JSON-encoded reminder list
            pending_draft    TEXT,               -- JSON-encoded wizard draft
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        ) STRICT;",
    )?;
    Ok(())
}
