use std::fmt;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const PERMISSION_DENIED: &str = "Permission Denied";
pub const PROJECT_NOT_FOUND: &str = "Project not found";
pub const USER_NOT_IN_PROJECT: &str = "User not in the project";

/// A caller's role inside one project, taken from the graph relation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Admin,
    Collaborator,
    Contributor,
}

impl ProjectRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectRole::Admin => "admin",
            ProjectRole::Collaborator => "collaborator",
            ProjectRole::Contributor => "contributor",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "admin" => Some(ProjectRole::Admin),
            "collaborator" => Some(ProjectRole::Collaborator),
            "contributor" => Some(ProjectRole::Contributor),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Greenroom,
    Core,
}

/// Outcome of looking up a user's relation to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleLookup {
    Found(ProjectRole),
    NotInProject,
    ProjectNotFound,
}

impl RoleLookup {
    /// HTTP code the lookup carries (spec §4.2).
    #[must_use]
    pub fn status(self) -> StatusCode {
        match self {
            RoleLookup::Found(_) => StatusCode::OK,
            RoleLookup::NotInProject => StatusCode::FORBIDDEN,
            RoleLookup::ProjectNotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Access granted for one project and zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub project_role: ProjectRole,
    pub project_code: String,
    /// Set when the caller is restricted to their own name-folder.
    pub uploader: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Denial {
    pub error_msg: String,
    pub code: StatusCode,
    pub result: Value,
}

impl Denial {
    #[must_use]
    pub fn new(error_msg: impl Into<String>, code: StatusCode) -> Self {
        Self {
            error_msg: error_msg.into(),
            code,
            result: json!({}),
        }
    }

    #[must_use]
    pub fn with_result(mut self, result: impl Into<Value>) -> Self {
        self.result = result.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allowed(Grant),
    Denied(Denial),
}

impl Decision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed(_))
    }

    /// Converts into a `Result` so handlers can use `?`.
    pub fn into_result(self) -> Result<Grant, Denial> {
        match self {
            Decision::Allowed(grant) => Ok(grant),
            Decision::Denied(denial) => Err(denial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_role_parse() {
        assert_eq!(ProjectRole::parse("admin"), Some(ProjectRole::Admin));
        assert_eq!(
            ProjectRole::parse("Collaborator"),
            Some(ProjectRole::Collaborator)
        );
        assert_eq!(
            ProjectRole::parse("contributor"),
            Some(ProjectRole::Contributor)
        );
        assert_eq!(ProjectRole::parse("owner"), None);
    }

    #[test]
    fn test_project_role_serde() {
        let json = serde_json::to_string(&ProjectRole::Collaborator).unwrap();
        assert_eq!(json, "\"collaborator\"");
        assert_eq!(ProjectRole::Contributor.to_string(), "contributor");
    }

    #[test]
    fn test_decision_into_result() {
        let denied = Decision::Denied(Denial::new(PERMISSION_DENIED, StatusCode::FORBIDDEN));
        assert!(!denied.is_allowed());
        let denial = denied.into_result().unwrap_err();
        assert_eq!(denial.result, json!({}));
    }
}
