//! # Tradelog Core Types
//!
//! Layer 0 of the workspace: the plain data structures shared by every other
//! crate. Nothing in here performs I/O.

pub mod enums;
pub mod error;
pub mod structs;
pub mod time;

// Re-export the core types to provide a clean public API.
pub use enums::{Dimension, Outcome, ViewMode};
pub use error::CoreError;
pub use structs::TradeRecord;
pub use time::{TimeOfDay, hold_minutes};
