use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Rolling window must contain at least one trade, got {0}")]
    InvalidWindow(usize),
}
