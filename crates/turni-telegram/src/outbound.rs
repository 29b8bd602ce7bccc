//! Outbound message delivery over the Telegram API.
//!
//! Tries legacy Markdown first (the message catalog uses `*bold*`); falls
//! back to plain text if Telegram rejects the parse mode. Every request is
//! bounded by a timeout so a slow network call cannot stall an event
//! handler indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use tracing::warn;

use turni_core::error::{Result, TurniError};
use turni_core::transport::{ChatTransport, Keyboard, MessageRef};
use turni_core::types::UserId;

/// Upper bound for any single Telegram API call.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn to_markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|b| InlineKeyboardButton::callback(b.label, b.data))
            .collect::<Vec<_>>()
    }))
}

async fn bounded<T, F>(fut: F) -> Result<T>
where
    F: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
{
    match tokio::time::timeout(SEND_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(TurniError::Transport(e.to_string())),
        Err(_) => Err(TurniError::Timeout {
            ms: SEND_TIMEOUT.as_millis() as u64,
        }),
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(
        &self,
        user: UserId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef> {
        let chat = ChatId(user.as_i64());
        let markup = keyboard.map(to_markup);

        // Markdown first, plain text as the fallback.
        let attempt = {
            let mut req = self.bot.send_message(chat, text).parse_mode(ParseMode::Markdown);
            if let Some(ref markup) = markup {
                req = req.reply_markup(markup.clone());
            }
            bounded(req).await
        };

        let message = match attempt {
            Ok(message) => message,
            Err(e) => {
                warn!(user = %user, "markdown send rejected ({e}), retrying plain");
                let mut req = self.bot.send_message(chat, text);
                if let Some(markup) = markup {
                    req = req.reply_markup(markup);
                }
                bounded(req).await?
            }
        };

        Ok(MessageRef {
            chat: user,
            message_id: message.id.0,
        })
    }

    async fn edit(&self, msg: MessageRef, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        let chat = ChatId(msg.chat.as_i64());
        let id = MessageId(msg.message_id);
        let markup = keyboard.map(to_markup);

        let attempt = {
            let mut req = self
                .bot
                .edit_message_text(chat, id, text)
                .parse_mode(ParseMode::Markdown);
            if let Some(ref markup) = markup {
                req = req.reply_markup(markup.clone());
            }
            bounded(req).await
        };

        if let Err(e) = attempt {
            warn!(user = %msg.chat, "markdown edit rejected ({e}), retrying plain");
            let mut req = self.bot.edit_message_text(chat, id, text);
            if let Some(markup) = markup {
                req = req.reply_markup(markup);
            }
            bounded(req).await?;
        }
        Ok(())
    }

    async fn delete(&self, msg: MessageRef) -> Result<()> {
        bounded(
            self.bot
                .delete_message(ChatId(msg.chat.as_i64()), MessageId(msg.message_id)),
        )
        .await?;
        Ok(())
    }
}
