//! Sprint entity and its partial-update delta.
//!
//! # Invariants
//! - `start_date <= end_date` at all times, including after a patch.
//! - A sprint belongs to exactly one project for its whole lifetime.
//! - `status` only changes through an explicit owner update.

use super::project::ProjectId;
use super::{check_date_range, check_length, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SprintId = Uuid;

const NAME_MAX: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintStatus {
    Open,
    Closed,
}

impl SprintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub project_id: ProjectId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SprintStatus,
}

impl Sprint {
    /// Creates an open sprint from creation input.
    pub fn new(project_id: ProjectId, draft: SprintDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            name: draft.name.trim().to_string(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            status: SprintStatus::Open,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("sprint name", &self.name, 1, NAME_MAX)?;
        check_date_range(self.start_date, self.end_date)
    }

    /// Every calendar day of the sprint, both ends inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_date;
        self.start_date
            .iter_days()
            .take_while(move |day| *day <= end)
    }
}

/// Input for sprint creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintDraft {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Partial sprint update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SprintPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SprintStatus>,
}

impl SprintPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.status.is_none()
    }

    /// Applies provided fields and validates the result.
    ///
    /// The sprint is left untouched when the patched value would be invalid.
    pub fn apply(&self, sprint: &mut Sprint) -> Result<(), ValidationError> {
        let mut patched = sprint.clone();
        if let Some(name) = self.name.as_deref() {
            patched.name = name.trim().to_string();
        }
        if let Some(start_date) = self.start_date {
            patched.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            patched.end_date = end_date;
        }
        if let Some(status) = self.status {
            patched.status = status;
        }
        patched.validate()?;
        *sprint = patched;
        Ok(())
    }
}
