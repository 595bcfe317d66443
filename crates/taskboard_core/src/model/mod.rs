//! Domain model for projects, memberships, sprints and tasks.
//!
//! # Responsibility
//! - Define canonical entity structs shared by repositories and services.
//! - Own field-level validation that does not need storage access.
//!
//! # Invariants
//! - Every entity except `Priority` is identified by a stable UUID.
//! - Length checks count the trimmed value; constructors and patches store
//!   trimmed text, so what is counted is what gets persisted.
//! - Stored dates stay within years 1..=9999 so their ISO text sorts and
//!   compares like the dates themselves.

pub mod member;
pub mod project;
pub mod sprint;
pub mod task;
pub mod user;

use chrono::{Datelike, NaiveDate};

const MIN_STORED_YEAR: i32 = 1;
const MAX_STORED_YEAR: i32 = 9999;

/// Field-level validation failures raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("invalid username `{0}`; expected 3-32 characters of [A-Za-z0-9_.-]")]
    InvalidUsername(String),
    #[error("priority id must be positive, got {0}")]
    InvalidPriority(i64),
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("{field} {date} is outside years 1..=9999")]
    DateOutOfRange { field: &'static str, date: NaiveDate },
}

pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    let count = trimmed.chars().count();
    if count < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if count > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub(crate) fn check_stored_date(field: &'static str, date: NaiveDate) -> Result<(), ValidationError> {
    if !(MIN_STORED_YEAR..=MAX_STORED_YEAR).contains(&date.year()) {
        return Err(ValidationError::DateOutOfRange { field, date });
    }
    Ok(())
}

pub(crate) fn check_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    check_stored_date("start date", start)?;
    check_stored_date("end date", end)?;
    if start > end {
        return Err(ValidationError::InvalidDateRange { start, end });
    }
    Ok(())
}
