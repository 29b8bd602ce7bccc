//! Reminder delivery — turns fired scheduler jobs into outbound messages.
//!
//! Spawned once at startup, runs for the lifetime of the process. Each
//! firing takes the user's session lock, so it can never observe a
//! half-removed reminder list.

use std::sync::Arc;

use chrono::{Datelike, Duration, Utc, Weekday};
use tokio::sync::mpsc;
use tracing::{info, warn};

use turni_core::transport::ChatTransport;
use turni_core::types::{FiredReminder, PresenceStatus};
use turni_scheduler::schedule::rome_utc_offset;
use turni_sessions::SessionStore;
use turni_shifts::{dates, ShiftTable};

use crate::error::Result;
use crate::keyboard;
use crate::messages;

/// Background task consuming the scheduler's fired-job channel.
pub async fn run_reminder_delivery(
    mut rx: mpsc::Receiver<FiredReminder>,
    sessions: Arc<SessionStore>,
    table: Arc<ShiftTable>,
    transport: Arc<dyn ChatTransport>,
) {
    info!("reminder delivery task started");
    while let Some(fired) = rx.recv().await {
        if let Err(e) = deliver(&fired, &sessions, &table, transport.as_ref()).await {
            // Delivery failures are logged and dropped; the next firing
            // proceeds normally.
            warn!(user = %fired.user_id, "reminder delivery failed: {e}");
        }
    }
    info!("reminder delivery task exiting (channel closed)");
}

pub(crate) async fn deliver(
    fired: &FiredReminder,
    sessions: &SessionStore,
    table: &ShiftTable,
    transport: &dyn ChatTransport,
) -> Result<()> {
    let _guard = sessions.lock(fired.user_id).await;
    let Some(mut session) = sessions.get(fired.user_id)? else {
        warn!(user = %fired.user_id, "fired reminder for an unknown session");
        return Ok(());
    };

    // A firing interrupts any in-progress free-text capture.
    session.active_input = None;

    let now = Utc::now();
    let today = now.with_timezone(&rome_utc_offset(now)).date_naive();
    let tomorrow = today + Duration::days(1);

    let Some(group) = session.group.clone() else {
        // The user logged out since scheduling. Send the fallback and keep
        // the job alive: it will repeat every matching day until the user
        // logs in again or removes the reminder.
        let kb = keyboard::login_keyboard(&mut session);
        sessions.save(&session)?;
        transport
            .send(fired.user_id, messages::REMINDER_GROUP_LOST, Some(kb))
            .await?;
        return Ok(());
    };
    sessions.save(&session)?;

    let is_match = match fired.reminder.shift_type {
        PresenceStatus::RemoteWork => table.is_remote_work_day(&group, tomorrow),
        PresenceStatus::InOffice => table.is_in_office_day(&group, tomorrow),
    };
    if !is_match {
        return Ok(());
    }

    // On weekends "domani" would be misleading — name the day instead.
    let text = match today.weekday() {
        Weekday::Sat | Weekday::Sun => format!(
            "Hey. Ricordati che {} sarai in {}",
            dates::format_date(tomorrow),
            fired.reminder.shift_type.label()
        ),
        _ => format!(
            "Hey. Ricordati che domani sarai in {}",
            fired.reminder.shift_type.label()
        ),
    };

    transport.send(fired.user_id, &text, None).await?;
    Ok(())
}
