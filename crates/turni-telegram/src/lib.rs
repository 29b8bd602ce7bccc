//! `turni-telegram` — the teloxide-backed chat transport.
//!
//! Wraps a teloxide `Bot` twice: outbound as a [`turni_core::transport::ChatTransport`]
//! implementation, inbound as a long-polling `Dispatcher` that maps Telegram
//! updates to router [`turni_router::Event`]s. Long polling — no public URL
//! required.

pub mod adapter;
pub mod outbound;

pub use adapter::TelegramAdapter;
pub use outbound::TelegramTransport;
