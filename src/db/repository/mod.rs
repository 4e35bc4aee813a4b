//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection` so callers decide whether
//! it runs inside a transaction.

mod audit;
mod patient;

use chrono::NaiveDateTime;

use super::DatabaseError;

pub use audit::*;
pub use patient::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Accepts both our own millisecond format and SQLite's `datetime('now')`.
pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| DatabaseError::ConstraintViolation(format!("invalid timestamp '{raw}': {e}")))
}
