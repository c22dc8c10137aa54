use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::auth::RequireIdentity;
use crate::policy::get_project_role;
use crate::server::AppState;
use crate::server::dto::{FileExistQuery, FolderQuery, UploadRequest};
use crate::server::extract::{Json, Query};
use crate::server::response::{
    ApiError, ApiResponse, Passthrough, StoreOptionExt, StoreResultExt,
};
use crate::server::validation::{parse_zone, validate_upload};
use crate::services::RelationQuery;
use crate::types::{GraphNode, PROJECT_NOT_FOUND, RoleLookup, USER_NOT_IN_PROJECT};

use super::access::{require_folder_access, require_path_access, require_permission};

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub name: Option<String>,
    pub code: Option<String>,
    pub id: i64,
}

impl From<&GraphNode> for ProjectSummary {
    fn from(node: &GraphNode) -> Self {
        Self {
            name: node.prop_str("name").map(str::to_string),
            code: node.prop_str("code").map(str::to_string),
            id: node.id,
        }
    }
}

pub async fn list_projects(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let graph = &state.services.graph;
    let nodes = if identity.is_platform_admin() {
        graph.list_projects().await
    } else {
        graph
            .query_relations(&RelationQuery {
                start_label: json!("User"),
                start_params: json!({ "name": identity.username }),
                end_label: json!("Container"),
                end_params: None,
            })
            .await
    }
    .api_err("Neo4j service")?;

    let projects: Vec<ProjectSummary> = nodes
        .iter()
        .filter(|node| node.has_label("Container"))
        .map(ProjectSummary::from)
        .collect();

    Ok::<_, ApiError>(ApiResponse::success(projects))
}

pub async fn get_role(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(project_code): Path<String>,
) -> impl IntoResponse {
    let lookup = get_project_role(&state.services.graph, identity.user_id, &project_code)
        .await
        .api_err("Neo4j service")?;

    let role = match lookup {
        RoleLookup::ProjectNotFound => return Err(ApiError::not_found(PROJECT_NOT_FOUND)),
        _ if identity.is_platform_admin() => "admin",
        RoleLookup::NotInProject => return Err(ApiError::forbidden(USER_NOT_IN_PROJECT)),
        RoleLookup::Found(role) => role.as_str(),
    };

    Ok::<_, ApiError>(ApiResponse::success(role))
}

/// Pre-upload: validates the request, checks permissions and name-folder
/// ownership, rejects files that already exist, then registers the job with
/// the zone's upload service.
pub async fn upload_files(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(project_code): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UploadRequest>,
) -> impl IntoResponse {
    let zone = validate_upload(&state.zones, &req.zone, &req.data_type)?;
    let grant = require_permission(&state, &identity, &project_code, &req.zone).await?;

    if !req.current_folder_node.trim_matches('/').is_empty() {
        require_path_access(&grant, &req.current_folder_node)?;
    }
    for file in &req.data {
        require_path_access(&grant, &file.relative_path())?;
    }

    let zone_label = state.zones.label(zone);
    for file in &req.data {
        let path = file.relative_path();
        let reply = state
            .services
            .file_info
            .file_exists(&project_code, zone_label, &path)
            .await
            .api_err("File info service")?;
        if reply.is_success() {
            return Err(ApiError::conflict("File with that name already exists").with_result(path));
        }
    }

    let mut payload = serde_json::to_value(&req)
        .map_err(|e| ApiError::internal(format!("Upload Error: {e}")))?;
    payload["project_code"] = Value::String(project_code.clone());

    let session_id = headers.get("Session-ID").and_then(|h| h.to_str().ok());

    tracing::info!(
        "Pre-upload of {} file(s) to {} ({}) by {}",
        req.data.len(),
        project_code,
        zone_label,
        identity.username
    );

    let reply = state
        .services
        .transfer
        .pre_upload(zone, session_id, &payload)
        .await
        .api_err("Upload Error")?;

    match reply.status.as_u16() {
        200 => Ok::<_, ApiError>(ApiResponse::success(reply.result())),
        409 => Err(ApiError::conflict(reply.error_msg())),
        _ => Err(ApiError::internal(format!("Upload Error: {}", reply.error_msg()))),
    }
}

pub async fn get_folder(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(project_code): Path<String>,
    Query(params): Query<FolderQuery>,
) -> impl IntoResponse {
    let zone = parse_zone(&state.zones, &params.zone)?;
    let grant = require_permission(&state, &identity, &project_code, &params.zone).await?;
    require_folder_access(&grant, &params.folder, &params.relative_path)?;

    let folder = state
        .services
        .graph
        .search_nodes(&json!({
            "labels": ["Folder", state.zones.label(zone)],
            "project_code": project_code,
            "name": params.folder,
            "folder_relative_path": params.relative_path,
            "archived": false,
        }))
        .await
        .api_err("Neo4j service")?
        .into_iter()
        .next()
        .or_not_found("Folder not exist")?;

    Ok::<_, ApiError>(ApiResponse::success(folder))
}

/// Forwards a file existence check to the file-info service.
pub async fn file_exists(
    RequireIdentity(_identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(project_code): Path<String>,
    Query(params): Query<FileExistQuery>,
) -> impl IntoResponse {
    let reply = state
        .services
        .file_info
        .file_exists(&project_code, &params.zone, &params.file_relative_path)
        .await
        .api_err("File info service")?;

    Ok::<_, ApiError>(Passthrough(reply))
}
