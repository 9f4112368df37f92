//! Shared query parameter types for API handlers.

use serde::Deserialize;
use solar_core::error::CoreError;
use solar_core::types::DbId;

/// `?projectId=` selector used by upload and report endpoints.
///
/// Kept as a raw string so a missing or malformed id produces the same
/// JSON error body as every other validation failure.
#[derive(Debug, Deserialize)]
pub struct ProjectIdParams {
    #[serde(rename = "projectId")]
    pub project_id: Option<String>,
}

impl ProjectIdParams {
    /// The parsed project id, or a validation error.
    pub fn require(&self) -> Result<DbId, CoreError> {
        let raw = self
            .project_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CoreError::Validation("projectId required".into()))?;
        raw.parse()
            .map_err(|_| CoreError::Validation(format!("Invalid projectId '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn missing_or_blank_id_is_rejected() {
        for value in [None, Some("  ".to_string())] {
            let params = ProjectIdParams { project_id: value };
            assert_matches!(params.require(), Err(CoreError::Validation(msg)) if msg == "projectId required");
        }
    }

    #[test]
    fn malformed_id_is_rejected() {
        let params = ProjectIdParams {
            project_id: Some("abc".into()),
        };
        assert_matches!(params.require(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn valid_id_parses() {
        let id = uuid::Uuid::new_v4();
        let params = ProjectIdParams {
            project_id: Some(id.to_string()),
        };
        assert_eq!(params.require().unwrap(), id);
    }
}
