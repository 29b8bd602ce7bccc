use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use turni_core::types::{FiredReminder, Reminder, ReminderKey, UserId};
use turni_sessions::UserSession;

use crate::error::{Result, SchedulerError};
use crate::schedule::{next_fire, to_utc_fire_time};

/// Runtime-only handle binding a reminder to its next firing. Never
/// persisted; destroyed on cancellation or shutdown.
#[derive(Debug, Clone)]
struct ScheduledJob {
    reminder: Reminder,
    /// UTC time-of-day, resolved from Europe/Rome at registration.
    fire_time_utc: NaiveTime,
    next_run: DateTime<Utc>,
}

/// Owns every live reminder job.
///
/// A single tick loop scans the index once per second and forwards due
/// firings over the mpsc channel; there is no per-job timer. Cancelling a
/// job therefore cannot abort an in-flight firing — a `FiredReminder`
/// already handed to the delivery task completes — it only prevents future
/// ones.
pub struct ReminderScheduler {
    jobs: Mutex<HashMap<(UserId, ReminderKey), ScheduledJob>>,
    /// Fired jobs are sent here for delivery.
    fired_tx: mpsc::Sender<FiredReminder>,
}

impl ReminderScheduler {
    pub fn new(fired_tx: mpsc::Sender<FiredReminder>) -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
            fired_tx,
        }
    }

    /// Register the recurring job for `reminder`.
    ///
    /// An existing job under the same key is replaced (cancel-then-replace):
    /// jobs exist only in this index, so dropping the old entry fully
    /// cancels the old schedule and no orphan can survive.
    pub fn schedule(&self, user_id: UserId, reminder: Reminder) -> Result<()> {
        if reminder.weekdays.is_empty() {
            return Err(SchedulerError::Unschedulable(
                "empty weekday set".to_string(),
            ));
        }

        let now = Utc::now();
        let fire_time_utc = to_utc_fire_time(reminder.time_of_day, now);
        // Non-empty weekday set always yields a next fire.
        let next_run = next_fire(&reminder.weekdays, fire_time_utc, now)
            .ok_or_else(|| SchedulerError::Unschedulable("no next firing".to_string()))?;

        let key = reminder.key();
        info!(user = %user_id, %key, next = %next_run, "reminder job scheduled");

        let mut jobs = self.jobs.lock().unwrap();
        jobs.insert(
            (user_id, key),
            ScheduledJob {
                reminder,
                fire_time_utc,
                next_run,
            },
        );
        Ok(())
    }

    /// Stop future firings of the job under `key`. Returns whether a job
    /// was actually removed. Safe to call while a firing is in flight.
    pub fn cancel(&self, user_id: UserId, key: &ReminderKey) -> bool {
        let removed = self
            .jobs
            .lock()
            .unwrap()
            .remove(&(user_id, key.clone()))
            .is_some();
        if removed {
            info!(user = %user_id, %key, "reminder job cancelled");
        } else {
            warn!(user = %user_id, %key, "cancel requested for unknown job");
        }
        removed
    }

    /// Re-establish jobs for every persisted reminder. Called once at
    /// process start. Reminders with an empty weekday set — invalid
    /// persisted records — are skipped with a log entry, not an error.
    ///
    /// Replace-on-collision makes this idempotent: a second pass over the
    /// same sessions converges to the same job set.
    pub fn rehydrate_all<'a>(&self, sessions: impl IntoIterator<Item = &'a UserSession>) -> usize {
        let mut count = 0;
        for session in sessions {
            for reminder in &session.reminders {
                if reminder.weekdays.is_empty() {
                    warn!(
                        user = %session.user_id,
                        "skipping persisted reminder with empty weekday set"
                    );
                    continue;
                }
                match self.schedule(session.user_id, reminder.clone()) {
                    Ok(()) => count += 1,
                    Err(e) => warn!(user = %session.user_id, "rehydration skip: {e}"),
                }
            }
        }
        info!(jobs = count, "reminder rehydration complete");
        count
    }

    /// Number of live jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Main event loop. Scans every second until `shutdown` broadcasts `true`.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!("reminder scheduler started");
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(Utc::now()),
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("reminder scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Fire every job whose `next_run` has arrived and advance it.
    fn tick(&self, now: DateTime<Utc>) {
        let mut due = Vec::new();
        {
            let mut jobs = self.jobs.lock().unwrap();
            for ((user_id, key), job) in jobs.iter_mut() {
                if job.next_run > now {
                    continue;
                }
                due.push(FiredReminder {
                    user_id: *user_id,
                    reminder: job.reminder.clone(),
                });
                match next_fire(&job.reminder.weekdays, job.fire_time_utc, now) {
                    Some(next) => job.next_run = next,
                    // Unreachable for a non-empty weekday set; drop defensively
                    // by pushing the run a week out.
                    None => {
                        warn!(user = %user_id, %key, "job produced no next firing");
                        job.next_run = now + chrono::Duration::days(7);
                    }
                }
            }
        }

        for fired in due {
            // try_send never stalls the tick loop; a full channel drops the
            // firing with a log entry.
            if self.fired_tx.try_send(fired.clone()).is_err() {
                warn!(
                    user = %fired.user_id,
                    "delivery channel full or closed — firing dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeSet;
    use turni_core::types::{PresenceStatus, ReminderDraft};

    fn reminder(days: &[u8], hh: u32, mm: u32) -> Reminder {
        let mut draft = ReminderDraft::seed(PresenceStatus::InOffice);
        draft.weekdays = days.iter().copied().collect::<BTreeSet<u8>>();
        draft.into_reminder(NaiveTime::from_hms_opt(hh, mm, 0).unwrap())
    }

    fn scheduler() -> (Arc<ReminderScheduler>, mpsc::Receiver<FiredReminder>) {
        let (tx, rx) = mpsc::channel(16);
        (Arc::new(ReminderScheduler::new(tx)), rx)
    }

    #[test]
    fn schedule_and_cancel() {
        let (sched, _rx) = scheduler();
        let r = reminder(&[0, 1, 2], 18, 0);
        sched.schedule(UserId(1), r.clone()).unwrap();
        assert_eq!(sched.job_count(), 1);
        assert!(sched.cancel(UserId(1), &r.key()));
        assert_eq!(sched.job_count(), 0);
        assert!(!sched.cancel(UserId(1), &r.key()));
    }

    #[test]
    fn empty_weekdays_is_unschedulable() {
        let (sched, _rx) = scheduler();
        assert!(sched.schedule(UserId(1), reminder(&[], 18, 0)).is_err());
        assert_eq!(sched.job_count(), 0);
    }

    #[test]
    fn key_collision_replaces_old_job() {
        let (sched, _rx) = scheduler();
        let r = reminder(&[0, 4], 18, 0);
        sched.schedule(UserId(1), r.clone()).unwrap();
        sched.schedule(UserId(1), r.clone()).unwrap();
        assert_eq!(sched.job_count(), 1);
    }

    #[test]
    fn same_reminder_for_two_users_is_two_jobs() {
        let (sched, _rx) = scheduler();
        let r = reminder(&[0], 18, 0);
        sched.schedule(UserId(1), r.clone()).unwrap();
        sched.schedule(UserId(2), r.clone()).unwrap();
        assert_eq!(sched.job_count(), 2);
        assert!(sched.cancel(UserId(1), &r.key()));
        assert_eq!(sched.job_count(), 1);
    }

    #[test]
    fn rehydrate_is_idempotent_and_skips_empty_sets() {
        let (sched, _rx) = scheduler();
        let mut a = UserSession::new(UserId(1));
        a.reminders.push(reminder(&[0, 1], 18, 0));
        a.reminders.push(reminder(&[], 19, 0)); // corrupt record
        let mut b = UserSession::new(UserId(2));
        b.reminders.push(reminder(&[3], 8, 30));

        let sessions = vec![a, b];
        assert_eq!(sched.rehydrate_all(sessions.iter()), 2);
        assert_eq!(sched.job_count(), 2);
        // Second pass over the same data: same live job count.
        assert_eq!(sched.rehydrate_all(sessions.iter()), 2);
        assert_eq!(sched.job_count(), 2);
    }

    #[tokio::test]
    async fn tick_fires_due_jobs_and_advances() {
        let (sched, mut rx) = scheduler();
        let r = reminder(&[0, 1, 2, 3, 4, 5, 6], 18, 0);
        sched.schedule(UserId(9), r.clone()).unwrap();

        // Jump past the next run: everything-enabled fires within a day.
        let later = Utc::now() + Duration::days(1) + Duration::hours(1);
        sched.tick(later);

        let fired = rx.try_recv().expect("one firing forwarded");
        assert_eq!(fired.user_id, UserId(9));
        assert_eq!(fired.reminder.key(), r.key());
        // Advanced, not removed.
        assert_eq!(sched.job_count(), 1);
        // No double fire at the same instant.
        sched.tick(later);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancelled_job_does_not_fire() {
        let (sched, mut rx) = scheduler();
        let r = reminder(&[0, 1, 2, 3, 4, 5, 6], 18, 0);
        sched.schedule(UserId(9), r.clone()).unwrap();
        sched.cancel(UserId(9), &r.key());

        sched.tick(Utc::now() + Duration::days(2));
        assert!(rx.try_recv().is_err());
    }
}
