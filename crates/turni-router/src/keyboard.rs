//! Keyboard construction.
//!
//! Building a keyboard is the only place a callback token is issued: one
//! fresh token per render, stamped into every button, so any previously
//! rendered keyboard for the user goes stale at once. Callers persist the
//! session after building.

use turni_core::transport::{Button, Keyboard};
use turni_core::types::ReminderDraft;
use turni_sessions::{guard, UserSession};
use turni_shifts::dates::DAYS_OF_WEEK;

use crate::action::Action;

/// Build a keyboard from `(label, action)` rows, issuing a fresh token.
pub fn make_keyboard(session: &mut UserSession, rows: Vec<Vec<(&str, Action)>>) -> Keyboard {
    let token = guard::issue_token(session);
    Keyboard::new(
        rows.into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(label, action)| {
                        Button::new(label, guard::tag_action(&action.name(), &token))
                    })
                    .collect()
            })
            .collect(),
    )
}

/// The single-button "Login" keyboard used by every login re-prompt.
pub fn login_keyboard(session: &mut UserSession) -> Keyboard {
    make_keyboard(session, vec![vec![("Login", Action::Login)]])
}

/// The single-button "Indietro" keyboard used inside the notification flows.
pub fn back_keyboard(session: &mut UserSession) -> Keyboard {
    make_keyboard(session, vec![vec![("Indietro", Action::NotifBack)]])
}

/// Week-view pagination row.
pub fn week_keyboard(session: &mut UserSession) -> Keyboard {
    make_keyboard(
        session,
        vec![vec![
            ("️⬅️ Precedente", Action::ShiftsPrev),
            ("Successivo ➡", Action::ShiftsNext),
        ]],
    )
}

/// Day-toggle screen of the add wizard: seven day buttons plus back/done.
pub fn days_keyboard(session: &mut UserSession) -> Keyboard {
    let day = |d: u8| (DAYS_OF_WEEK[d as usize], Action::Day(d));
    make_keyboard(
        session,
        vec![
            vec![day(0), day(1), day(2)],
            vec![day(3), day(4), day(5)],
            vec![day(6), ("Indietro", Action::NotifBack), ("Fatto", Action::ChooseTime)],
        ],
    )
}

/// Enabled-days summary line under the day-toggle screen.
pub fn enabled_days_summary(draft: &ReminderDraft) -> String {
    let names: Vec<&str> = draft
        .weekdays
        .iter()
        .map(|d| DAYS_OF_WEEK[usize::from(*d).min(6)])
        .collect();
    format!(
        "Scegli i giorni della settimana in cui vuoi essere notificato 🗓️\n\nGiorni abilitati: {}",
        names.join(", ")
    )
}
