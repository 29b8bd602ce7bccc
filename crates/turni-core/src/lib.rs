//! `turni-core` — shared types, configuration and the transport seam.
//!
//! Every other crate in the workspace depends on this one. It owns the
//! closed domain enums ([`types::PresenceStatus`], [`types::InputKind`]),
//! the reminder model, the [`transport::ChatTransport`] trait behind which
//! the actual chat backend lives, and the figment-based configuration.

pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use error::{Result, TurniError};
pub use types::{GroupId, InputKind, PresenceStatus, Reminder, ReminderDraft, ReminderKey, UserId};
