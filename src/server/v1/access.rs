use crate::policy::{self, require_owned_folder, require_owned_path};
use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};
use crate::types::{Grant, Identity};

/// Runs the permission engine and turns a denial into an API error.
pub async fn require_permission(
    state: &AppState,
    identity: &Identity,
    project_code: &str,
    zone: &str,
) -> Result<Grant, ApiError> {
    let decision = policy::check_permission(
        &state.services.graph,
        &state.zones,
        identity,
        project_code,
        zone,
    )
    .await
    .api_err("Neo4j service")?;

    decision.into_result().map_err(ApiError::from)
}

/// Name-folder rule for a plain folder path.
pub fn require_path_access(grant: &Grant, path: &str) -> Result<(), ApiError> {
    require_owned_path(grant, path).map_err(ApiError::from)
}

/// Name-folder rule for a folder given as name plus relative path.
pub fn require_folder_access(
    grant: &Grant,
    folder_name: &str,
    relative_path: &str,
) -> Result<(), ApiError> {
    require_owned_folder(grant, folder_name, relative_path).map_err(ApiError::from)
}
