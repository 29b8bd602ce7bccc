use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Namespace prepended to the digits a user types as group code.
/// Shift-file group names carry the same prefix.
pub const GROUP_PREFIX: &str = "gruppo-";

/// Reminder times are interpreted in this zone and converted to UTC once,
/// when the job is registered.
pub const REMINDER_TIMEZONE: &str = "Europe/Rome";

/// Telegram chat/user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl UserId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a shift group, stored with [`GROUP_PREFIX`] applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    /// Build a group id from the bare digits the user typed.
    pub fn from_code(code: &str) -> Self {
        Self(format!("{GROUP_PREFIX}{code}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The user-facing code, without the namespace prefix.
    pub fn code(&self) -> &str {
        self.0.strip_prefix(GROUP_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a calendar date is an in-office or a remote-work day for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    InOffice,
    RemoteWork,
}

impl PresenceStatus {
    /// Map the `presence` boolean used by the shift file.
    pub fn from_presence(presence: bool) -> Self {
        if presence {
            PresenceStatus::InOffice
        } else {
            PresenceStatus::RemoteWork
        }
    }

    /// User-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            PresenceStatus::InOffice => "Ufficio 💼",
            PresenceStatus::RemoteWork => "Smart working 🏠",
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(tag(*self))
    }
}

/// The single free-text capture slot of the conversation state machine.
/// `None` (idle) is represented as the absent `Option` in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Next message is matched as a group code (login flow).
    GroupCode,
    /// Next message is matched as an HH:MM reminder time.
    ReminderTime,
    /// Next message is matched as a 1-based reminder index to remove.
    ReminderIndex,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputKind::GroupCode => "group_code",
            InputKind::ReminderTime => "reminder_time",
            InputKind::ReminderIndex => "reminder_index",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "group_code" => Ok(InputKind::GroupCode),
            "reminder_time" => Ok(InputKind::ReminderTime),
            "reminder_index" => Ok(InputKind::ReminderIndex),
            other => Err(format!("unknown input kind: {other}")),
        }
    }
}

/// A recurring notification rule configured by the user.
///
/// Identity for scheduling and removal is [`Reminder::key`]; two reminders
/// with the same key are indistinguishable to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub shift_type: PresenceStatus,
    /// Enabled weekdays, 0 = Monday … 6 = Sunday.
    pub weekdays: BTreeSet<u8>,
    pub time_of_day: NaiveTime,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    REMINDER_TIMEZONE.to_string()
}

impl Reminder {
    pub fn key(&self) -> ReminderKey {
        let days: Vec<String> = self.weekdays.iter().map(|d| d.to_string()).collect();
        ReminderKey(format!(
            "{}|{}|{}",
            tag(self.shift_type),
            days.join(","),
            self.time_of_day.format("%H:%M"),
        ))
    }
}

/// Scheduler/removal identity of a reminder: `(shift_type, weekdays, time)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderKey(pub String);

impl fmt::Display for ReminderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-progress "add reminder" wizard state, kept in the session until the
/// time step finalizes it into a [`Reminder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDraft {
    pub shift_type: PresenceStatus,
    pub weekdays: BTreeSet<u8>,
    pub time_of_day: NaiveTime,
}

impl ReminderDraft {
    /// Seed a draft for the chosen kind: Monday–Friday enabled, with the
    /// kind-specific default time.
    pub fn seed(shift_type: PresenceStatus) -> Self {
        let time_of_day = match shift_type {
            PresenceStatus::RemoteWork => NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            PresenceStatus::InOffice => NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        };
        Self {
            shift_type,
            weekdays: (0..5).collect(),
            time_of_day,
        }
    }

    /// Toggle one weekday (0 = Monday … 6 = Sunday) in the enabled set.
    pub fn toggle_day(&mut self, day: u8) {
        if !self.weekdays.remove(&day) {
            self.weekdays.insert(day);
        }
    }

    /// Finalize into a reminder with the given confirmed time.
    pub fn into_reminder(self, time_of_day: NaiveTime) -> Reminder {
        Reminder {
            shift_type: self.shift_type,
            weekdays: self.weekdays,
            time_of_day,
            timezone: default_timezone(),
        }
    }
}

/// A reminder whose fire instant has arrived, forwarded from the scheduler
/// engine to the delivery task.
#[derive(Debug, Clone)]
pub struct FiredReminder {
    pub user_id: UserId,
    pub reminder: Reminder,
}

fn tag(status: PresenceStatus) -> &'static str {
    match status {
        PresenceStatus::InOffice => "in_office",
        PresenceStatus::RemoteWork => "remote_work",
    }
}
