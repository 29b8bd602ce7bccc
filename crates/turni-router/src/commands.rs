//! Slash-command handlers and the shift views.

use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use regex::Regex;
use tracing::{debug, info, warn};

use turni_core::transport::MessageRef;
use turni_core::types::{GroupId, InputKind, PresenceStatus};
use turni_scheduler::schedule::rome_utc_offset;
use turni_sessions::UserSession;
use turni_shifts::dates;

use crate::error::Result;
use crate::keyboard;
use crate::messages;
use crate::router::{is_admin, Router};

fn group_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+").unwrap())
}

/// Today's calendar date in the bot's reference zone.
pub(crate) fn today_rome() -> NaiveDate {
    let now = Utc::now();
    now.with_timezone(&rome_utc_offset(now)).date_naive()
}

impl Router {
    pub(crate) async fn handle_command(
        &self,
        session: &mut UserSession,
        name: &str,
        args: &str,
    ) -> Result<()> {
        match name {
            "start" => self.start_command(session).await,
            "aiuto" => self.help_command(session).await,
            "login" => self.login_prompt(session).await,
            "turni" => self.week_command(session).await,
            "domani" => self.tomorrow_command(session).await,
            "notifiche" => self.notification_command(session).await,
            "messaggio" => self.broadcast_command(session, args).await,
            other => {
                debug!(command = other, "unknown command ignored");
                Ok(())
            }
        }
    }

    async fn start_command(&self, session: &mut UserSession) -> Result<()> {
        let kb = keyboard::login_keyboard(session);
        self.sessions.save(session)?;
        self.transport
            .send(session.user_id, &messages::welcome(&self.bot_name), Some(kb))
            .await?;
        Ok(())
    }

    async fn help_command(&self, session: &mut UserSession) -> Result<()> {
        let group_code = session.group.as_ref().map(|g| g.code().to_string());
        let kb = if group_code.is_none() {
            Some(keyboard::login_keyboard(session))
        } else {
            None
        };
        self.sessions.save(session)?;
        self.transport
            .send(
                session.user_id,
                &messages::help(&self.bot_name, group_code.as_deref()),
                kb,
            )
            .await?;
        Ok(())
    }

    /// Entered both via /login and via the Login button: arms the
    /// group-code capture slot and lists the valid codes.
    pub(crate) async fn login_prompt(&self, session: &mut UserSession) -> Result<()> {
        session.active_input = Some(InputKind::GroupCode);
        self.sessions.save(session)?;
        let text = format!(
            "{}\n\n{}",
            messages::LOGIN_PROMPT,
            messages::available_groups(&self.table.group_codes())
        );
        self.transport.send(session.user_id, &text, None).await?;
        Ok(())
    }

    /// Free-text handler while the group-code slot is armed.
    pub(crate) async fn group_code_input(
        &self,
        session: &mut UserSession,
        text: &str,
    ) -> Result<()> {
        let trimmed = text.trim();
        if !group_code_re().is_match(trimmed) {
            self.transport
                .send(session.user_id, messages::GROUP_FORMAT_INVALID, None)
                .await?;
            return Ok(());
        }

        let group = GroupId::from_code(trimmed);
        if !self.table.is_valid_group(&group) {
            self.transport
                .send(session.user_id, messages::GROUP_UNKNOWN, None)
                .await?;
            return Ok(());
        }

        session.logged_in = true;
        session.group = Some(group.clone());
        session.active_input = None;
        self.sessions.save(session)?;

        info!(user = %session.user_id, group = %group, "user logged in");

        self.transport
            .send(session.user_id, &messages::group_saved(), None)
            .await?;
        Ok(())
    }

    /// /turni — week view anchored on today (Sunday jumps into next week,
    /// as the original did).
    async fn week_command(&self, session: &mut UserSession) -> Result<()> {
        if !self.require_login(session).await? {
            return Ok(());
        }
        let Some(group) = self.require_group(session, None).await? else {
            return Ok(());
        };

        let today = today_rome();
        let anchor = if today.weekday() == Weekday::Sun {
            today + Duration::days(2)
        } else {
            today
        };
        session.cursor_week_date = Some(anchor);

        let text = self.week_overview(&group, anchor);
        let kb = keyboard::week_keyboard(session);
        self.sessions.save(session)?;
        self.transport
            .send(session.user_id, &text, Some(kb))
            .await?;
        Ok(())
    }

    /// ±1-week pagination on the week view; re-renders in place.
    pub(crate) async fn shift_week_page(
        &self,
        session: &mut UserSession,
        message: MessageRef,
        weeks: i64,
    ) -> Result<()> {
        let Some(group) = self.require_group(session, Some(message)).await? else {
            return Ok(());
        };

        let anchor =
            session.cursor_week_date.unwrap_or_else(today_rome) + Duration::weeks(weeks);
        session.cursor_week_date = Some(anchor);

        let text = self.week_overview(&group, anchor);
        let kb = keyboard::week_keyboard(session);
        self.sessions.save(session)?;
        self.transport.edit(message, &text, Some(kb)).await?;
        Ok(())
    }

    fn week_overview(&self, group: &GroupId, anchor: NaiveDate) -> String {
        let mut text = String::from("Ecco i turni della settimana: \n\n");
        for date in dates::work_week(anchor) {
            text += &format!("{} - ", dates::format_date(date));
            match self.table.status_on(group, date) {
                Some(status) => text += &format!("{} \n", status.label()),
                None => text += "Nessun turno 😢\n",
            }
        }
        text
    }

    /// /domani — tomorrow's shift, with the weekend rolled forward to
    /// Monday like the original.
    async fn tomorrow_command(&self, session: &mut UserSession) -> Result<()> {
        if !self.require_login(session).await? {
            return Ok(());
        }
        let Some(group) = self.require_group(session, None).await? else {
            return Ok(());
        };

        let mut compare = today_rome() + Duration::days(1);
        let when = match compare.weekday() {
            Weekday::Sat => {
                compare += Duration::days(2);
                dates::DAYS_OF_WEEK[0].to_string()
            }
            Weekday::Sun => {
                compare += Duration::days(1);
                dates::DAYS_OF_WEEK[0].to_string()
            }
            _ => "Domani".to_string(),
        };

        let text = if self.table.is_remote_work_day(&group, compare) {
            format!("{when} sarai in {}", PresenceStatus::RemoteWork.label())
        } else if self.table.is_in_office_day(&group, compare) {
            format!("{when} sarai in {}", PresenceStatus::InOffice.label())
        } else {
            format!("Non ci sono turni per {} 😢", when.to_lowercase())
        };

        self.transport.send(session.user_id, &text, None).await?;
        Ok(())
    }

    async fn notification_command(&self, session: &mut UserSession) -> Result<()> {
        if !self.require_login(session).await? {
            return Ok(());
        }
        self.notification_menu(session, None).await
    }

    /// /messaggio <text> — admin broadcast to every known user. Unauthorized
    /// invocations are dropped silently (a log entry only).
    async fn broadcast_command(&self, session: &mut UserSession, args: &str) -> Result<()> {
        if !is_admin(&self.access.admin_users, session.user_id) {
            warn!(user = %session.user_id, "non-admin tried /messaggio — dropped");
            return Ok(());
        }
        let text = args.trim();
        if text.is_empty() {
            return Ok(());
        }

        for target in self.sessions.load_all()? {
            if let Err(e) = self.transport.send(target.user_id, text, None).await {
                warn!(user = %target.user_id, "broadcast send failed: {e}");
            }
        }
        Ok(())
    }

    /// Logged-in guard for shift-dependent commands: re-prompts with the
    /// login keyboard when the user never logged in.
    pub(crate) async fn require_login(&self, session: &mut UserSession) -> Result<bool> {
        if session.logged_in {
            return Ok(true);
        }
        let kb = keyboard::login_keyboard(session);
        self.sessions.save(session)?;
        self.transport
            .send(session.user_id, messages::LOGIN_REQUIRED, Some(kb))
            .await?;
        Ok(false)
    }

    /// Group guard: a logged-in session without a group is inconsistent and
    /// treated as an implicit logout — the command aborts and the user is
    /// asked to log in again.
    pub(crate) async fn require_group(
        &self,
        session: &mut UserSession,
        via: Option<MessageRef>,
    ) -> Result<Option<GroupId>> {
        if let Some(group) = session.group.clone() {
            return Ok(Some(group));
        }

        warn!(user = %session.user_id, "group missing on a shift command — implicit logout");
        session.log_out();
        let kb = keyboard::login_keyboard(session);
        self.sessions.save(session)?;

        match via {
            Some(message) => {
                self.transport
                    .edit(message, messages::GROUP_FORGOTTEN, Some(kb))
                    .await?
            }
            None => {
                self.transport
                    .send(session.user_id, messages::GROUP_FORGOTTEN, Some(kb))
                    .await?;
            }
        }
        Ok(None)
    }
}
