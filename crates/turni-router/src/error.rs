use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Session error: {0}")]
    Session(#[from] turni_sessions::SessionError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] turni_scheduler::SchedulerError),

    #[error(transparent)]
    Core(#[from] turni_core::TurniError),
}

pub type Result<T> = std::result::Result<T, RouterError>;
