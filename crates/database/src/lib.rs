//! # Tradelog Database Crate
//!
//! The trade store: a thin, application-specific layer over PostgreSQL.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** all SQL lives here. Callers work with `TradeRecord`s and
//!   `TradeQuery`s, never with rows.
//! - **Asynchronous & Pooled:** every operation is async and runs on a shared
//!   `PgPool`.
//! - **Ordering is the caller's choice:** streaks and the cumulative curve depend
//!   on the order trades come back in, so `TradeQuery` always names one.
//!
//! ## Public API
//!
//! - `connect`, `run_migrations`: pool setup and schema migrations.
//! - `DbRepository`: loads, saves and deletes trades.
//! - `DbError`: the errors returned from this crate.

pub mod connection;
pub mod error;
pub mod repository;

pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, DbTrade, SortOrder, TradeQuery};
