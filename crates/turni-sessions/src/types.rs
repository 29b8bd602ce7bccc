use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use turni_core::types::{GroupId, InputKind, Reminder, ReminderDraft, UserId};

/// Everything persisted about one user. Created on first interaction,
/// never expired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: UserId,
    pub logged_in: bool,
    pub group: Option<GroupId>,
    /// The single-slot state-machine cursor; `None` means idle.
    pub active_input: Option<InputKind>,
    /// Anchor date for week-view pagination.
    pub cursor_week_date: Option<NaiveDate>,
    /// Latest issued callback token; all older buttons are invalid.
    pub callback_token: Option<String>,
    pub reminders: Vec<Reminder>,
    /// In-progress "add reminder" wizard state.
    pub pending_draft: Option<ReminderDraft>,
}

impl UserSession {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            logged_in: false,
            group: None,
            active_input: None,
            cursor_week_date: None,
            callback_token: None,
            reminders: Vec::new(),
            pending_draft: None,
        }
    }

    /// Forget the group and the logged-in flag (implicit logout when a
    /// shift-dependent command finds no group).
    pub fn log_out(&mut self) {
        self.logged_in = false;
        self.group = None;
    }
}
