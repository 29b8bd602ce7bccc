//! `turni-router` — inbound event routing and the conversation state machine.
//!
//! Every inbound user event — command, inline-button press or free text —
//! enters through [`router::Router::dispatch`], which runs the cross-cutting
//! guards (allow-list, stale-token validation, command state-reset) at a
//! single choke point before any handler executes. Free text is consumed by
//! the handler selected by the session's single input slot.
//!
//! The crate also owns the reminder delivery task ([`notify`]), which turns
//! fired scheduler jobs into outbound notifications.

pub mod action;
pub mod commands;
pub mod error;
pub mod keyboard;
pub mod messages;
pub mod notify;
pub mod router;
pub mod wizard;

pub use error::{Result, RouterError};
pub use router::{Event, Router};
