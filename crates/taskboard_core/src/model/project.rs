//! Project aggregate root.
//!
//! # Invariants
//! - `owner_id` never changes after creation.
//! - Members, sprints and tasks are removed together with their project.

use super::user::UserId;
use super::{check_length, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
}

impl Project {
    pub fn new(owner_id: UserId, draft: ProjectDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: normalize_description(draft.description),
            owner_id,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("project name", &self.name, NAME_MIN, NAME_MAX)?;
        if let Some(description) = self.description.as_deref() {
            check_length("project description", description, 1, DESCRIPTION_MAX)?;
        }
        Ok(())
    }
}

/// Input for project creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: Option<String>,
}

/// Partial project update. `None` leaves the field unchanged; a blank
/// description clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn apply(&self, project: &mut Project) {
        if let Some(name) = self.name.as_deref() {
            project.name = name.trim().to_string();
        }
        if let Some(description) = self.description.clone() {
            project.description = normalize_description(Some(description));
        }
    }
}

fn normalize_description(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Project, ProjectDraft, ProjectPatch};
    use uuid::Uuid;

    fn project() -> Project {
        Project::new(
            Uuid::new_v4(),
            ProjectDraft {
                name: "Apollo".to_string(),
                description: Some("moon".to_string()),
            },
        )
    }

    #[test]
    fn patch_leaves_missing_fields_untouched() {
        let mut project = project();
        ProjectPatch {
            name: Some("Artemis".to_string()),
            description: None,
        }
        .apply(&mut project);
        assert_eq!(project.name, "Artemis");
        assert_eq!(project.description.as_deref(), Some("moon"));
    }

    #[test]
    fn blank_description_in_patch_clears_field() {
        let mut project = project();
        ProjectPatch {
            name: None,
            description: Some("   ".to_string()),
        }
        .apply(&mut project);
        assert_eq!(project.description, None);
    }

    #[test]
    fn short_name_is_rejected() {
        let mut project = project();
        project.name = "Ap".to_string();
        assert!(project.validate().is_err());
    }
}
