//! Inbound update handling: teloxide Dispatcher → router events.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::info;

use turni_core::transport::MessageRef;
use turni_core::types::UserId;
use turni_router::{Event, Router};

/// Telegram channel adapter.
///
/// Drives the long-polling Dispatcher until the process exits. All routing
/// decisions live in [`Router`]; this adapter only translates updates.
pub struct TelegramAdapter {
    bot: Bot,
    router: Arc<Router>,
}

impl TelegramAdapter {
    pub fn new(bot: Bot, router: Arc<Router>) -> Self {
        Self { bot, router }
    }

    /// Connect to Telegram and drive the long-polling loop.
    ///
    /// Never returns — runs for the lifetime of the process.
    pub async fn run(self) {
        info!("telegram: starting long-polling dispatcher");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(on_message))
            .branch(Update::filter_callback_query().endpoint(on_callback));

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.router])
            .default_handler(|_upd| async {})
            .build()
            .dispatch()
            .await;
    }
}

/// Split `/command arg arg` into name and argument tail; strips an
/// optional `@botname` suffix from the command.
fn parse_command(text: &str) -> Option<(String, String)> {
    let rest = text.strip_prefix('/')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let raw_name = parts.next()?;
    if raw_name.is_empty() {
        return None;
    }
    let name = raw_name.split('@').next().unwrap_or(raw_name);
    let args = parts.next().unwrap_or("").trim().to_string();
    Some((name.to_string(), args))
}

async fn on_message(msg: Message, router: Arc<Router>) -> ResponseResult<()> {
    // Ignore messages from other bots.
    if msg.from.as_ref().map(|u| u.is_bot).unwrap_or(false) {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    // Private-chat bot: the chat id is the user id.
    let user = UserId(msg.chat.id.0);
    let event = match parse_command(text) {
        Some((name, args)) => Event::Command { name, args },
        None => Event::Text {
            text: text.to_string(),
        },
    };

    router.dispatch(user, event).await;
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, router: Arc<Router>) -> ResponseResult<()> {
    // Ack immediately so the client stops the button spinner.
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(data) = q.data else {
        return Ok(());
    };
    let Some(message) = q.message else {
        return Ok(());
    };

    let user = UserId(message.chat().id.0);
    let message = MessageRef {
        chat: user,
        message_id: message.id().0,
    };

    router.dispatch(user, Event::Button { data, message }).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_splits_name_and_args() {
        assert_eq!(
            parse_command("/messaggio ciao a tutti"),
            Some(("messaggio".to_string(), "ciao a tutti".to_string()))
        );
        assert_eq!(
            parse_command("/turni"),
            Some(("turni".to_string(), String::new()))
        );
    }

    #[test]
    fn parse_command_strips_bot_mention() {
        assert_eq!(
            parse_command("/domani@turni_bot"),
            Some(("domani".to_string(), String::new()))
        );
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("ciao"), None);
        assert_eq!(parse_command("/"), None);
    }
}
