//! Inline-button actions.
//!
//! One closed enum instead of the loose string constants a quick bot would
//! use: every branch on an action is an exhaustive match, so a new action
//! cannot silently fall through a handler.

/// Everything an inline button can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start the login flow.
    Login,
    /// Delete the message the button sits on.
    Cancel,
    /// Week view: move the cursor one week back.
    ShiftsPrev,
    /// Week view: move the cursor one week forward.
    ShiftsNext,
    /// Notification menu: close it.
    NotifExit,
    /// Notification menu: back to the main menu.
    NotifBack,
    /// Notification menu: start the removal flow.
    NotifRemove,
    /// Notification menu: start the add wizard.
    NotifAdd,
    /// Add wizard: remote-work reminder kind.
    RemindSmart,
    /// Add wizard: in-office reminder kind.
    RemindOffice,
    /// Add wizard: toggle one weekday (0 = Monday … 6 = Sunday).
    Day(u8),
    /// Add wizard: days confirmed, ask for the time.
    ChooseTime,
}

impl Action {
    /// Wire name, used in callback data before the `#token` tag.
    pub fn name(&self) -> String {
        match self {
            Action::Login => "login".to_string(),
            Action::Cancel => "cancel".to_string(),
            Action::ShiftsPrev => "shifts_prev".to_string(),
            Action::ShiftsNext => "shifts_next".to_string(),
            Action::NotifExit => "not_exit".to_string(),
            Action::NotifBack => "not_back".to_string(),
            Action::NotifRemove => "not_remove".to_string(),
            Action::NotifAdd => "not_add".to_string(),
            Action::RemindSmart => "remind_smart".to_string(),
            Action::RemindOffice => "remind_office".to_string(),
            Action::Day(d) => format!("day_{d}"),
            Action::ChooseTime => "choose_time".to_string(),
        }
    }

    pub fn parse(name: &str) -> Option<Action> {
        if let Some(day) = name.strip_prefix("day_") {
            let day: u8 = day.parse().ok()?;
            return (day <= 6).then_some(Action::Day(day));
        }
        match name {
            "login" => Some(Action::Login),
            "cancel" => Some(Action::Cancel),
            "shifts_prev" => Some(Action::ShiftsPrev),
            "shifts_next" => Some(Action::ShiftsNext),
            "not_exit" => Some(Action::NotifExit),
            "not_back" => Some(Action::NotifBack),
            "not_remove" => Some(Action::NotifRemove),
            "not_add" => Some(Action::NotifAdd),
            "remind_smart" => Some(Action::RemindSmart),
            "remind_office" => Some(Action::RemindOffice),
            "choose_time" => Some(Action::ChooseTime),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_parse_round_trip() {
        let actions = [
            Action::Login,
            Action::Cancel,
            Action::ShiftsPrev,
            Action::ShiftsNext,
            Action::NotifExit,
            Action::NotifBack,
            Action::NotifRemove,
            Action::NotifAdd,
            Action::RemindSmart,
            Action::RemindOffice,
            Action::Day(0),
            Action::Day(6),
            Action::ChooseTime,
        ];
        for action in actions {
            assert_eq!(Action::parse(&action.name()), Some(action));
        }
    }

    #[test]
    fn parse_rejects_unknown_and_out_of_range() {
        assert_eq!(Action::parse("unknown"), None);
        assert_eq!(Action::parse("day_7"), None);
        assert_eq!(Action::parse("day_x"), None);
    }
}
