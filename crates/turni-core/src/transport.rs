//! The seam between the bot logic and the actual chat backend.
//!
//! Router and delivery code produce finalized message strings and
//! [`Keyboard`] layouts and hand them to a [`ChatTransport`]; nothing above
//! this trait touches the wire protocol.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::UserId;

/// Handle to a message the bot has sent, sufficient to edit or delete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: UserId,
    pub message_id: i32,
}

/// One inline button: a label and the raw callback data attached to it.
///
/// The router's keyboard builder is responsible for tagging the data with
/// the user's current session token; the transport sends it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Inline keyboard layout: rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// Single-row keyboard.
    pub fn row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }

    /// Single-button keyboard.
    pub fn single(button: Button) -> Self {
        Self {
            rows: vec![vec![button]],
        }
    }
}

/// Outbound side of the chat backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a message to a user, returning a handle to the sent message.
    async fn send(
        &self,
        user: UserId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef>;

    /// Replace the text and keyboard of a previously sent message.
    async fn edit(&self, msg: MessageRef, text: &str, keyboard: Option<Keyboard>) -> Result<()>;

    /// Delete a previously sent message (used to discard stale keyboards).
    async fn delete(&self, msg: MessageRef) -> Result<()>;
}
