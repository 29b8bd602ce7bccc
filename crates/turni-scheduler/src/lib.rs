//! `turni-scheduler` — recurring reminder jobs over an in-memory index.
//!
//! # Overview
//!
//! Jobs live in a map keyed by `(user, reminder key)`; a single engine loop
//! ticks every second and forwards due jobs over an mpsc channel to the
//! delivery task. Jobs are never persisted — the reminder list inside each
//! user session is the durable substrate, and [`engine::ReminderScheduler::rehydrate_all`]
//! rebuilds the index from it at startup.
//!
//! Reminder times are local Europe/Rome; they are converted to UTC once at
//! registration using the offset in effect at that moment and not
//! re-resolved afterwards, so a DST switch shifts firings by an hour until
//! the reminder is re-created.

pub mod engine;
pub mod error;
pub mod schedule;

pub use engine::ReminderScheduler;
pub use error::{Result, SchedulerError};
