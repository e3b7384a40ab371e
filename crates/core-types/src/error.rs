use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Unknown trade outcome '{0}' (expected 'Win', 'Loss' or 'Break Even')")]
    UnknownOutcome(String),
}
