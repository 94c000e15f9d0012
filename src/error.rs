//! Error types for wp-schedule.
//!
//! Scheduling never fails on bad data (indeterminate dates are `None`,
//! cycles are warnings). These errors cover caller mistakes that cannot
//! be degraded: malformed configuration and unknown seed items.

use thiserror::Error;

use crate::models::WorkItemId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid ISO weekday number: {0} (expected 1..=7)")]
    InvalidWeekday(u8),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("work item not found: {0}")]
    UnknownWorkItem(WorkItemId),
}

pub type Result<T> = std::result::Result<T, Error>;
