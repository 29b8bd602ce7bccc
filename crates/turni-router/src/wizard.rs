//! The notification menu, the add-reminder wizard and the removal flow.
//!
//! The day-toggle screen is driven entirely by button presses; only the
//! final time step (and the removal index) go through the free-text slot.

use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;
use tracing::{info, warn};

use turni_core::transport::{Keyboard, MessageRef};
use turni_core::types::{InputKind, PresenceStatus, Reminder, ReminderDraft};
use turni_sessions::UserSession;
use turni_shifts::dates::short_day_name;

use crate::error::Result;
use crate::keyboard;
use crate::messages;
use crate::router::Router;

fn time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap())
}

/// One display line of the removal list (1-based, current list order).
pub(crate) fn describe_reminder(index: usize, reminder: &Reminder) -> String {
    let days: Vec<String> = reminder
        .weekdays
        .iter()
        .map(|d| short_day_name(*d))
        .collect();
    format!(
        "{}: {} alle ore {} nei giorni {}\n",
        index + 1,
        reminder.shift_type.label(),
        reminder.time_of_day.format("%H:%M"),
        days.join(",")
    )
}

impl Router {
    /// Notification main menu, reached from /notifiche or the back button.
    pub(crate) async fn notification_menu(
        &self,
        session: &mut UserSession,
        via: Option<MessageRef>,
    ) -> Result<()> {
        let mut row = vec![("Indietro", crate::action::Action::NotifExit)];
        if !session.reminders.is_empty() {
            row.push(("Rimuovi 🔕", crate::action::Action::NotifRemove));
        }
        row.push(("Aggiungi 🔔", crate::action::Action::NotifAdd));

        let kb = keyboard::make_keyboard(session, vec![row]);
        self.sessions.save(session)?;
        self.render(session, via, messages::NOTIFICATION_MENU, Some(kb))
            .await
    }

    /// "Aggiungi" pressed: choose the reminder kind. Any leftover draft
    /// from an abandoned run is dropped here.
    pub(crate) async fn kind_prompt(
        &self,
        session: &mut UserSession,
        message: MessageRef,
    ) -> Result<()> {
        session.pending_draft = None;
        let kb = keyboard::make_keyboard(
            session,
            vec![vec![
                ("Indietro", crate::action::Action::NotifBack),
                ("Smart ️🏠", crate::action::Action::RemindSmart),
                ("Ufficio 💼️", crate::action::Action::RemindOffice),
            ]],
        );
        self.sessions.save(session)?;
        self.transport
            .edit(message, messages::NOTIFICATION_KIND_PROMPT, Some(kb))
            .await?;
        Ok(())
    }

    /// Kind chosen: seed the draft (Mon–Fri, kind default time) and show
    /// the day-toggle screen.
    pub(crate) async fn seed_draft(
        &self,
        session: &mut UserSession,
        shift_type: PresenceStatus,
        message: MessageRef,
    ) -> Result<()> {
        session.pending_draft = Some(ReminderDraft::seed(shift_type));
        self.render_days(session, message).await
    }

    /// One weekday toggled on the day screen.
    pub(crate) async fn toggle_day(
        &self,
        session: &mut UserSession,
        day: u8,
        message: MessageRef,
    ) -> Result<()> {
        match session.pending_draft.as_mut() {
            Some(draft) => {
                draft.toggle_day(day);
                self.render_days(session, message).await
            }
            None => {
                // Token was valid but the draft is gone (e.g. a firing reset
                // the dialog) — fall back to the menu.
                warn!(user = %session.user_id, "day toggle without a draft");
                self.notification_menu(session, Some(message)).await
            }
        }
    }

    async fn render_days(&self, session: &mut UserSession, message: MessageRef) -> Result<()> {
        let summary = match session.pending_draft.as_ref() {
            Some(draft) => keyboard::enabled_days_summary(draft),
            None => return Ok(()),
        };
        let kb = keyboard::days_keyboard(session);
        self.sessions.save(session)?;
        self.transport.edit(message, &summary, Some(kb)).await?;
        Ok(())
    }

    /// "Fatto" pressed: arm the time slot. Text typed right after the
    /// button lands in the same `ReminderTime` state.
    pub(crate) async fn time_prompt(
        &self,
        session: &mut UserSession,
        message: MessageRef,
    ) -> Result<()> {
        session.active_input = Some(InputKind::ReminderTime);
        let kb = keyboard::back_keyboard(session);
        self.sessions.save(session)?;
        self.transport
            .edit(message, messages::TIME_PROMPT, Some(kb))
            .await?;
        Ok(())
    }

    /// Free-text handler while the time slot is armed. Finalizes the draft.
    pub(crate) async fn reminder_time_input(
        &self,
        session: &mut UserSession,
        text: &str,
    ) -> Result<()> {
        let trimmed = text.trim();
        let parsed = time_re()
            .is_match(trimmed)
            .then(|| NaiveTime::parse_from_str(trimmed, "%H:%M").ok())
            .flatten();
        let Some(time) = parsed else {
            let kb = keyboard::back_keyboard(session);
            self.sessions.save(session)?;
            self.transport
                .send(session.user_id, messages::TIME_FORMAT_INVALID, Some(kb))
                .await?;
            return Ok(());
        };

        let Some(draft) = session.pending_draft.take() else {
            warn!(user = %session.user_id, "time input without a draft — dialog reset");
            session.active_input = None;
            self.sessions.save(session)?;
            return Ok(());
        };

        session.active_input = None;

        if draft.weekdays.is_empty() {
            // Rejected: nothing persisted, nothing scheduled, slot cleared.
            let kb = keyboard::back_keyboard(session);
            self.sessions.save(session)?;
            self.transport
                .send(session.user_id, messages::NO_DAYS_SELECTED, Some(kb))
                .await?;
            return Ok(());
        }

        let reminder = draft.into_reminder(time);
        self.scheduler.schedule(session.user_id, reminder.clone())?;
        session.reminders.push(reminder.clone());
        let kb = keyboard::back_keyboard(session);
        self.sessions.save(session)?;

        info!(user = %session.user_id, key = %reminder.key(), "reminder added");

        self.transport
            .send(session.user_id, messages::NOTIFICATION_ADDED, Some(kb))
            .await?;
        Ok(())
    }

    /// "Rimuovi" pressed: show the numbered list and arm the index slot.
    pub(crate) async fn removal_prompt(
        &self,
        session: &mut UserSession,
        message: MessageRef,
    ) -> Result<()> {
        let mut text = String::from(messages::REMOVE_INDEX_PROMPT);
        for (i, reminder) in session.reminders.iter().enumerate() {
            text += &describe_reminder(i, reminder);
        }

        session.active_input = Some(InputKind::ReminderIndex);
        let kb = keyboard::back_keyboard(session);
        self.sessions.save(session)?;
        self.transport.edit(message, &text, Some(kb)).await?;
        Ok(())
    }

    /// Free-text handler while the index slot is armed. Removes by 1-based
    /// display index against the current list order; cancel + removal +
    /// persist all happen under the per-user lock already held by dispatch.
    pub(crate) async fn reminder_index_input(
        &self,
        session: &mut UserSession,
        text: &str,
    ) -> Result<()> {
        let index: usize = match text.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                self.transport
                    .send(session.user_id, messages::REMOVE_INDEX_INVALID, None)
                    .await?;
                return Ok(());
            }
        };
        if index < 1 || index > session.reminders.len() {
            self.transport
                .send(session.user_id, messages::REMOVE_INDEX_INVALID, None)
                .await?;
            return Ok(());
        }

        let reminder = session.reminders.remove(index - 1);
        self.scheduler.cancel(session.user_id, &reminder.key());
        session.active_input = None;
        let kb = keyboard::back_keyboard(session);
        self.sessions.save(session)?;

        info!(user = %session.user_id, key = %reminder.key(), "reminder removed");

        self.transport
            .send(session.user_id, messages::NOTIFICATION_REMOVED, Some(kb))
            .await?;
        Ok(())
    }

    async fn render(
        &self,
        session: &UserSession,
        via: Option<MessageRef>,
        text: &str,
        kb: Option<Keyboard>,
    ) -> Result<()> {
        match via {
            Some(message) => self.transport.edit(message, text, kb).await?,
            None => {
                self.transport.send(session.user_id, text, kb).await?;
            }
        }
        Ok(())
    }
}
