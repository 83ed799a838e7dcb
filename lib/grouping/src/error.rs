use thiserror::Error;

pub type Result<T> = std::result::Result<T, GroupingError>;

#[derive(Error, Debug)]
pub enum GroupingError {
    #[error("Invalid group request: {0}")]
    InvalidRequest(String),

    #[error("Invalid grouping configuration: {0}")]
    InvalidConfig(String),

    #[error("Candidate source failed: {0}")]
    Source(#[from] vgroup_core::Error),

    #[error("Grouping request was cancelled")]
    Cancelled,
}
