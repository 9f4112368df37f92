//! Project entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use solar_core::types::{DbId, Timestamp};
use validator::Validate;

/// Name given to projects created without one.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Inspection";

/// Lifecycle of an inspection project.
///
/// `Uploading` is accepted for compatibility but never set by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Uploading,
    Processing,
    Complete,
}

/// A project record from `projects.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub location: String,
    /// Inspection date.
    pub date: NaiveDate,
    /// Number of panels in the installation; 0 when unknown.
    pub panel_count: u32,
    pub status: ProjectStatus,
    pub health_score: Option<f64>,
    pub created_at: Timestamp,
}

/// DTO for creating a new project. Every field has a default.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "location must be at most 500 characters"))]
    pub location: Option<String>,
    /// Defaults to today (UTC).
    pub date: Option<NaiveDate>,
    pub panel_count: Option<u32>,
}

/// DTO for a partial update. Only `id` is required.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub id: DbId,
    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "location must be at most 500 characters"))]
    pub location: Option<String>,
    pub date: Option<NaiveDate>,
    pub panel_count: Option<u32>,
    pub status: Option<ProjectStatus>,
    #[validate(range(min = 0.0, max = 100.0, message = "healthScore must be within 0-100"))]
    pub health_score: Option<f64>,
}

impl Project {
    /// Build a fresh draft project from a create request.
    pub fn from_create(input: &CreateProject, now: Timestamp) -> Self {
        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PROJECT_NAME)
            .to_string();
        Self {
            id: uuid::Uuid::new_v4(),
            name,
            location: input.location.clone().unwrap_or_default(),
            date: input.date.unwrap_or_else(|| now.date_naive()),
            panel_count: input.panel_count.unwrap_or(0),
            status: ProjectStatus::Draft,
            health_score: None,
            created_at: now,
        }
    }

    /// Apply the non-`None` fields of `input`.
    pub fn apply(&mut self, input: &UpdateProject) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(location) = &input.location {
            self.location = location.clone();
        }
        if let Some(date) = input.date {
            self.date = date;
        }
        if let Some(panel_count) = input.panel_count {
            self.panel_count = panel_count;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(score) = input.health_score {
            self.health_score = Some(score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_applies_defaults() {
        let now = chrono::Utc::now();
        let project = Project::from_create(&CreateProject::default(), now);

        assert_eq!(project.name, DEFAULT_PROJECT_NAME);
        assert_eq!(project.location, "");
        assert_eq!(project.date, now.date_naive());
        assert_eq!(project.panel_count, 0);
        assert_eq!(project.status, ProjectStatus::Draft);
        assert!(project.health_score.is_none());
    }

    #[test]
    fn blank_name_falls_back_to_default() {
        let input = CreateProject {
            name: Some("   ".into()),
            ..Default::default()
        };
        let project = Project::from_create(&input, chrono::Utc::now());
        assert_eq!(project.name, DEFAULT_PROJECT_NAME);
    }

    #[test]
    fn apply_only_touches_provided_fields() {
        let mut project = Project::from_create(
            &CreateProject {
                name: Some("North array".into()),
                panel_count: Some(120),
                ..Default::default()
            },
            chrono::Utc::now(),
        );
        let update = UpdateProject {
            id: project.id,
            name: None,
            location: Some("Field B".into()),
            date: None,
            panel_count: None,
            status: Some(ProjectStatus::Complete),
            health_score: None,
        };
        project.apply(&update);

        assert_eq!(project.name, "North array");
        assert_eq!(project.location, "Field B");
        assert_eq!(project.panel_count, 120);
        assert_eq!(project.status, ProjectStatus::Complete);
    }

    #[test]
    fn project_json_uses_camel_case() {
        let project = Project::from_create(&CreateProject::default(), chrono::Utc::now());
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["status"], "draft");
        assert_eq!(json["panelCount"], 0);
        assert!(json["healthScore"].is_null());
        assert!(json["createdAt"].is_string());
        assert_eq!(json["date"].as_str().unwrap().len(), 10);
    }

    #[test]
    fn overlong_name_fails_validation() {
        let input = CreateProject {
            name: Some("x".repeat(201)),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
