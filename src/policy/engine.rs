//! Project permission engine.
//!
//! Access to a project is decided from three inputs: the caller's platform
//! role, their role in the project (a relation in the graph service) and the
//! zone the request targets.
//!
//! | project role | Greenroom                | Core      |
//! |--------------|--------------------------|-----------|
//! | admin        | allowed                  | allowed   |
//! | collaborator | own name-folder only     | allowed   |
//! | contributor  | own name-folder only     | forbidden |

use axum::http::StatusCode;

use super::folder;
use crate::config::ZoneConfig;
use crate::error::Result;
use crate::services::GraphClient;
use crate::types::{
    Decision, Denial, Grant, Identity, PERMISSION_DENIED, PROJECT_NOT_FOUND, ProjectRole,
    RoleLookup, USER_NOT_IN_PROJECT, Zone,
};

/// Resolves the caller's role in a project from the graph service.
pub async fn get_project_role(
    graph: &GraphClient,
    user_id: i64,
    project_code: &str,
) -> Result<RoleLookup> {
    let Some(project) = graph.get_project(project_code).await? else {
        return Ok(RoleLookup::ProjectNotFound);
    };

    let Some(relation) = graph.get_relation_type(user_id, project.id).await? else {
        return Ok(RoleLookup::NotInProject);
    };

    match ProjectRole::parse(&relation) {
        Some(role) => Ok(RoleLookup::Found(role)),
        None => {
            tracing::warn!(
                "Unknown relation '{relation}' between user {user_id} and project {project_code}"
            );
            Ok(RoleLookup::NotInProject)
        }
    }
}

/// The pure decision step. `user_status` is the caller's account status in
/// the graph service, `None` when the user node was not found. `zone` is
/// `None` when the requested zone matches neither label.
#[must_use]
pub fn decide(
    identity: &Identity,
    lookup: RoleLookup,
    user_status: Option<&str>,
    project_code: &str,
    zone: Option<Zone>,
) -> Decision {
    let status = user_status.unwrap_or("unknown");
    if status != "active" {
        let code = match lookup.status() {
            StatusCode::OK => StatusCode::FORBIDDEN,
            code => code,
        };
        return Decision::Denied(
            Denial::new(PERMISSION_DENIED, code).with_result(format!("User status: {status}")),
        );
    }

    let role = match lookup {
        RoleLookup::ProjectNotFound => {
            return Decision::Denied(Denial::new(PROJECT_NOT_FOUND, StatusCode::NOT_FOUND));
        }
        _ if identity.is_platform_admin() => ProjectRole::Admin,
        RoleLookup::NotInProject => {
            return Decision::Denied(
                Denial::new(PERMISSION_DENIED, StatusCode::FORBIDDEN)
                    .with_result(USER_NOT_IN_PROJECT),
            );
        }
        RoleLookup::Found(role) => role,
    };

    let allowed = |uploader: Option<String>| {
        Decision::Allowed(Grant {
            project_role: role,
            project_code: project_code.to_string(),
            uploader,
        })
    };

    match (role, zone) {
        (ProjectRole::Collaborator | ProjectRole::Contributor, Some(Zone::Greenroom)) => {
            allowed(Some(identity.username.clone()))
        }
        (ProjectRole::Admin | ProjectRole::Collaborator, Some(Zone::Core)) => allowed(None),
        (ProjectRole::Admin, _) => allowed(None),
        _ => Decision::Denied(Denial::new(PERMISSION_DENIED, StatusCode::FORBIDDEN)),
    }
}

/// Decides whether `identity` may act on `project_code` in `zone`.
pub async fn check_permission(
    graph: &GraphClient,
    zones: &ZoneConfig,
    identity: &Identity,
    project_code: &str,
    zone: &str,
) -> Result<Decision> {
    let lookup = get_project_role(graph, identity.user_id, project_code).await?;
    let user = graph.get_user(&identity.username).await?;
    let status = user.as_ref().and_then(|u| u.prop_str("status"));

    let decision = decide(identity, lookup, status, project_code, zones.parse(zone));
    tracing::debug!(
        "Permission for {} on {} in {}: {:?}",
        identity.username,
        project_code,
        zone,
        decision
    );
    Ok(decision)
}

/// Enforces the name-folder rule on a folder path.
pub fn require_owned_path(grant: &Grant, path: &str) -> std::result::Result<(), Denial> {
    match &grant.uploader {
        Some(uploader) if !folder::owns_path(uploader, path) => {
            Err(Denial::new(PERMISSION_DENIED, StatusCode::FORBIDDEN))
        }
        _ => Ok(()),
    }
}

/// Enforces the name-folder rule on a folder given as name plus relative path.
pub fn require_owned_folder(
    grant: &Grant,
    folder_name: &str,
    relative_path: &str,
) -> std::result::Result<(), Denial> {
    match &grant.uploader {
        Some(uploader) if !folder::owns_folder(uploader, folder_name, relative_path) => {
            Err(Denial::new(PERMISSION_DENIED, StatusCode::FORBIDDEN))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity(role: &str) -> Identity {
        Identity {
            user_id: 7,
            username: "jdoe".to_string(),
            role: role.to_string(),
            token: String::new(),
        }
    }

    fn grant(decision: Decision) -> Grant {
        decision.into_result().expect("expected access to be granted")
    }

    fn denial(decision: Decision) -> Denial {
        decision.into_result().expect_err("expected access to be denied")
    }

    #[test]
    fn test_role_zone_table() {
        let member = identity("member");
        let cases = [
            (ProjectRole::Admin, Zone::Greenroom, true, false),
            (ProjectRole::Admin, Zone::Core, true, false),
            (ProjectRole::Collaborator, Zone::Greenroom, true, true),
            (ProjectRole::Collaborator, Zone::Core, true, false),
            (ProjectRole::Contributor, Zone::Greenroom, true, true),
            (ProjectRole::Contributor, Zone::Core, false, false),
        ];

        for (role, zone, allowed, restricted) in cases {
            let decision = decide(
                &member,
                RoleLookup::Found(role),
                Some("active"),
                "demo",
                Some(zone),
            );
            assert_eq!(decision.is_allowed(), allowed, "{role} in {zone:?}");
            if let Decision::Allowed(grant) = decision {
                assert_eq!(grant.project_role, role);
                assert_eq!(grant.project_code, "demo");
                assert_eq!(grant.uploader.is_some(), restricted, "{role} in {zone:?}");
            }
        }
    }

    #[test]
    fn test_contributor_in_core_is_forbidden() {
        let decision = decide(
            &identity("member"),
            RoleLookup::Found(ProjectRole::Contributor),
            Some("active"),
            "demo",
            Some(Zone::Core),
        );
        let denial = denial(decision);
        assert_eq!(denial.code, StatusCode::FORBIDDEN);
        assert_eq!(denial.error_msg, PERMISSION_DENIED);
    }

    #[test]
    fn test_uploader_is_username() {
        let decision = decide(
            &identity("member"),
            RoleLookup::Found(ProjectRole::Collaborator),
            Some("active"),
            "demo",
            Some(Zone::Greenroom),
        );
        assert_eq!(grant(decision).uploader.as_deref(), Some("jdoe"));
    }

    #[test]
    fn test_inactive_user_denied_whatever_the_role() {
        let decision = decide(
            &identity("admin"),
            RoleLookup::Found(ProjectRole::Admin),
            Some("disabled"),
            "demo",
            Some(Zone::Core),
        );
        let denial = denial(decision);
        assert_eq!(denial.error_msg, PERMISSION_DENIED);
        assert_eq!(denial.code, StatusCode::FORBIDDEN);
        assert_eq!(denial.result, json!("User status: disabled"));
    }

    #[test]
    fn test_inactive_user_keeps_lookup_code() {
        let decision = decide(
            &identity("member"),
            RoleLookup::ProjectNotFound,
            None,
            "demo",
            Some(Zone::Core),
        );
        let denial = denial(decision);
        assert_eq!(denial.code, StatusCode::NOT_FOUND);
        assert_eq!(denial.result, json!("User status: unknown"));
    }

    #[test]
    fn test_platform_admin_becomes_project_admin() {
        let decision = decide(
            &identity("admin"),
            RoleLookup::NotInProject,
            Some("active"),
            "demo",
            Some(Zone::Greenroom),
        );
        let grant = grant(decision);
        assert_eq!(grant.project_role, ProjectRole::Admin);
        assert_eq!(grant.uploader, None);
    }

    #[test]
    fn test_platform_admin_cannot_reach_missing_project() {
        let decision = decide(
            &identity("admin"),
            RoleLookup::ProjectNotFound,
            Some("active"),
            "ghost",
            Some(Zone::Core),
        );
        let denial = denial(decision);
        assert_eq!(denial.code, StatusCode::NOT_FOUND);
        assert_eq!(denial.error_msg, PROJECT_NOT_FOUND);
    }

    #[test]
    fn test_not_in_project_is_forbidden() {
        let decision = decide(
            &identity("member"),
            RoleLookup::NotInProject,
            Some("active"),
            "demo",
            Some(Zone::Greenroom),
        );
        let denial = denial(decision);
        assert_eq!(denial.code, StatusCode::FORBIDDEN);
        assert_eq!(denial.result, json!(USER_NOT_IN_PROJECT));
    }

    #[test]
    fn test_unknown_zone_only_admits_admins() {
        let collaborator = decide(
            &identity("member"),
            RoleLookup::Found(ProjectRole::Collaborator),
            Some("active"),
            "demo",
            None,
        );
        assert!(!collaborator.is_allowed());

        let admin = decide(
            &identity("member"),
            RoleLookup::Found(ProjectRole::Admin),
            Some("active"),
            "demo",
            None,
        );
        assert!(admin.is_allowed());
    }

    #[test]
    fn test_name_folder_rules() {
        let restricted = Grant {
            project_role: ProjectRole::Contributor,
            project_code: "demo".to_string(),
            uploader: Some("jdoe".to_string()),
        };
        assert!(require_owned_path(&restricted, "jdoe/raw").is_ok());
        assert!(require_owned_path(&restricted, "other/raw").is_err());
        assert!(require_owned_folder(&restricted, "jdoe", "").is_ok());
        assert!(require_owned_folder(&restricted, "raw", "other").is_err());

        let open = Grant {
            uploader: None,
            ..restricted
        };
        assert!(require_owned_path(&open, "other/raw").is_ok());
    }
}
