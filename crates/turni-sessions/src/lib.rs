//! `turni-sessions` — persisted per-user sessions and the stale-action guard.
//!
//! A session row holds everything the bot knows about one user: login state,
//! shift group, the single-slot input cursor, the reminder list and the
//! in-progress wizard draft. Rows are written back after every mutating
//! operation so a crash loses at most the in-flight change.

pub mod db;
pub mod error;
pub mod guard;
pub mod store;
pub mod types;

pub use error::{Result, SessionError};
pub use store::SessionStore;
pub use types::UserSession;
