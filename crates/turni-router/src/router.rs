use std::sync::Arc;

use tracing::{debug, warn};

use turni_core::config::AccessConfig;
use turni_core::transport::{ChatTransport, MessageRef};
use turni_core::types::UserId;
use turni_scheduler::ReminderScheduler;
use turni_sessions::{guard, SessionStore};
use turni_shifts::ShiftTable;

use crate::action::Action;
use crate::error::Result;

/// One inbound user event, already stripped of transport details.
#[derive(Debug, Clone)]
pub enum Event {
    /// `/name args` slash command.
    Command { name: String, args: String },
    /// Inline-button press: raw callback data plus the message it sits on.
    Button { data: String, message: MessageRef },
    /// Free-form text message.
    Text { text: String },
}

/// Routes every inbound event to its handler.
///
/// All cross-cutting guards run here, before any handler:
/// 1. allow-list check — unauthorized users are dropped after a log entry,
///    with no user-visible response;
/// 2. the per-user session lock is taken for the whole handler, so firings
///    and interactive events for the same user never interleave;
/// 3. commands clear the free-text capture slot (commands always pre-empt
///    an in-progress dialog);
/// 4. button presses are token-validated; stale or malformed buttons are
///    deleted and no handler runs.
pub struct Router {
    pub(crate) sessions: Arc<SessionStore>,
    pub(crate) table: Arc<ShiftTable>,
    pub(crate) scheduler: Arc<ReminderScheduler>,
    pub(crate) transport: Arc<dyn ChatTransport>,
    pub(crate) access: AccessConfig,
    pub(crate) bot_name: String,
}

impl Router {
    pub fn new(
        sessions: Arc<SessionStore>,
        table: Arc<ShiftTable>,
        scheduler: Arc<ReminderScheduler>,
        transport: Arc<dyn ChatTransport>,
        access: AccessConfig,
        bot_name: String,
    ) -> Self {
        Self {
            sessions,
            table,
            scheduler,
            transport,
            access,
            bot_name,
        }
    }

    /// Entry point for the transport adapter. Never propagates: handler
    /// failures are logged and dropped, the event loop must not die.
    pub async fn dispatch(&self, user: UserId, event: Event) {
        if let Err(e) = self.dispatch_inner(user, event).await {
            warn!(user = %user, "event handling failed: {e}");
        }
    }

    async fn dispatch_inner(&self, user: UserId, event: Event) -> Result<()> {
        if !is_allowed(&self.access.allow_users, user) {
            warn!(user = %user, "unauthorized user tried a command — dropped");
            return Ok(());
        }

        let _guard = self.sessions.lock(user).await;
        let mut session = self.sessions.get_or_create(user)?;

        match event {
            Event::Command { name, args } => {
                // Commands pre-empt any in-progress free-text capture.
                session.active_input = None;
                self.sessions.save(&session)?;
                self.handle_command(&mut session, &name, &args).await
            }
            Event::Button { data, message } => {
                let Some((action, token)) = guard::parse_callback(&data) else {
                    debug!(user = %user, "malformed callback data — deleting button message");
                    self.transport.delete(message).await?;
                    return Ok(());
                };
                if !guard::validate(&session, token) {
                    debug!(user = %user, "stale callback token — deleting button message");
                    self.transport.delete(message).await?;
                    return Ok(());
                }
                let Some(action) = Action::parse(action) else {
                    debug!(user = %user, action, "unknown action — deleting button message");
                    self.transport.delete(message).await?;
                    return Ok(());
                };
                self.handle_action(&mut session, action, message).await
            }
            Event::Text { text } => self.handle_text(&mut session, &text).await,
        }
    }

    pub(crate) async fn handle_action(
        &self,
        session: &mut turni_sessions::UserSession,
        action: Action,
        message: MessageRef,
    ) -> Result<()> {
        use turni_core::types::PresenceStatus;

        match action {
            Action::Login => self.login_prompt(session).await,
            Action::Cancel | Action::NotifExit => {
                self.transport.delete(message).await?;
                Ok(())
            }
            Action::ShiftsPrev => self.shift_week_page(session, message, -1).await,
            Action::ShiftsNext => self.shift_week_page(session, message, 1).await,
            Action::NotifBack => self.notification_menu(session, Some(message)).await,
            Action::NotifRemove => self.removal_prompt(session, message).await,
            Action::NotifAdd => self.kind_prompt(session, message).await,
            Action::RemindSmart => {
                self.seed_draft(session, PresenceStatus::RemoteWork, message)
                    .await
            }
            Action::RemindOffice => {
                self.seed_draft(session, PresenceStatus::InOffice, message)
                    .await
            }
            Action::Day(day) => self.toggle_day(session, day, message).await,
            Action::ChooseTime => self.time_prompt(session, message).await,
        }
    }

    pub(crate) async fn handle_text(
        &self,
        session: &mut turni_sessions::UserSession,
        text: &str,
    ) -> Result<()> {
        use turni_core::types::InputKind;

        match session.active_input {
            Some(InputKind::GroupCode) => self.group_code_input(session, text).await,
            Some(InputKind::ReminderTime) => self.reminder_time_input(session, text).await,
            Some(InputKind::ReminderIndex) => self.reminder_index_input(session, text).await,
            None => {
                debug!(user = %session.user_id, "free text outside any capture — ignored");
                Ok(())
            }
        }
    }
}

/// Empty list allows everyone; otherwise match by numeric user id, with
/// `"*"` as an explicit allow-all entry.
pub(crate) fn is_allowed(allow_users: &[String], user: UserId) -> bool {
    allow_users.is_empty()
        || allow_users
            .iter()
            .any(|entry| entry == "*" || entry == &user.to_string())
}

/// Admin list is deny-by-default: empty means admin commands are disabled.
pub(crate) fn is_admin(admin_users: &[String], user: UserId) -> bool {
    admin_users
        .iter()
        .any(|entry| entry == "*" || entry == &user.to_string())
}
