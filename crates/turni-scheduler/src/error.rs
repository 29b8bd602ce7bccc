use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The reminder cannot produce any firing (e.g. empty weekday set).
    #[error("Unschedulable reminder: {0}")]
    Unschedulable(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
