use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::auth::RequireIdentity;
use crate::policy::check_permission;
use crate::policy::folder::{owns_path, split_folder_path};
use crate::server::AppState;
use crate::server::dto::{DownloadRequest, FileListQuery, GeidQuery};
use crate::server::extract::{Json, Query};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::{SourceType, parse_zone, validate_list_request};
use crate::services::RelationQuery;
use crate::types::{Decision, GraphNode, PERMISSION_DENIED};

use super::access::{require_folder_access, require_path_access, require_permission};

const TRASHED_OR_INVALID: &str = "Can only work on file or folder not in Trash Bin";

/// Path of a file or folder node inside its zone, starting with the name-folder.
fn node_path(node: &GraphNode) -> &str {
    node.prop_str("display_path")
        .or_else(|| node.prop_str("folder_relative_path"))
        .unwrap_or_default()
}

fn node_geid(node: &GraphNode) -> Option<&str> {
    node.prop_str("global_entity_id")
}

#[derive(Debug, Serialize)]
pub struct GeidStatus {
    pub status: String,
    /// `[node]` when the caller may work on it, otherwise empty.
    pub result: Vec<GraphNode>,
    pub geid: String,
}

/// Looks up several entities by geid and reports, per geid, whether the
/// caller may work on it.
pub async fn query_geid(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<GeidQuery>,
) -> impl IntoResponse {
    let nodes = state
        .services
        .graph
        .get_nodes_by_geid(&req.geid)
        .await
        .api_err("Neo4j service")?;

    let by_geid: HashMap<String, GraphNode> = nodes
        .into_iter()
        .filter_map(|node| Some((node_geid(&node)?.to_string(), node)))
        .collect();

    let mut decisions: HashMap<(String, String), Decision> = HashMap::new();
    let mut statuses = Vec::with_capacity(req.geid.len());

    for geid in &req.geid {
        let Some(node) = by_geid.get(geid).cloned() else {
            statuses.push(GeidStatus {
                status: "File Not Exist".to_string(),
                result: Vec::new(),
                geid: geid.clone(),
            });
            continue;
        };

        if !(node.has_label("File") || node.has_label("Folder")) || node.prop_bool("archived") {
            statuses.push(GeidStatus {
                status: TRASHED_OR_INVALID.to_string(),
                result: Vec::new(),
                geid: geid.clone(),
            });
            continue;
        }

        let project_code = node.prop_str("project_code").unwrap_or_default().to_string();
        let zone_label = state.zones.label(state.zones.zone_of(&node.labels)).to_string();
        let key = (project_code.clone(), zone_label.clone());

        if !decisions.contains_key(&key) {
            let decision = check_permission(
                &state.services.graph,
                &state.zones,
                &identity,
                &project_code,
                &zone_label,
            )
            .await
            .api_err("Neo4j service")?;
            decisions.insert(key.clone(), decision);
        }

        let status = match &decisions[&key] {
            Decision::Denied(denial) => denial.error_msg.clone(),
            Decision::Allowed(grant) => match &grant.uploader {
                Some(uploader) if !owns_path(uploader, node_path(&node)) => {
                    PERMISSION_DENIED.to_string()
                }
                _ => "success".to_string(),
            },
        };

        let result = if status == "success" {
            vec![node]
        } else {
            Vec::new()
        };
        statuses.push(GeidStatus {
            status,
            result,
            geid: geid.clone(),
        });
    }

    Ok::<_, ApiError>(ApiResponse::success(statuses))
}

/// Lists the children of a project root or of a folder in one zone.
pub async fn list_files(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(project_code): Path<String>,
    Query(params): Query<FileListQuery>,
) -> impl IntoResponse {
    let source_type = validate_list_request(&params.source_type, &params.folder)?;
    let zone = parse_zone(&state.zones, &params.zone)?;
    let grant = require_permission(&state, &identity, &project_code, &params.zone).await?;
    let zone_label = state.zones.label(zone);
    let graph = &state.services.graph;

    let mut child_params = json!({ "project_code": project_code, "archived": false });

    let (start_label, start_params) = match source_type {
        SourceType::Container => {
            if let Some(uploader) = &grant.uploader {
                child_params["uploader"] = Value::String(uploader.clone());
            }
            (json!(SourceType::Container.label()), json!({ "code": project_code }))
        }
        SourceType::Folder => {
            let (relative_path, folder_name) = split_folder_path(&params.folder);
            let folder_params = json!({
                "project_code": project_code,
                "name": folder_name,
                "folder_relative_path": relative_path,
            });

            let mut query = folder_params.clone();
            query["labels"] = json!([SourceType::Folder.label(), zone_label]);
            query["archived"] = Value::Bool(false);
            let found = graph.search_nodes(&query).await.api_err("Neo4j service")?;
            if found.is_empty() {
                return Err(ApiError::forbidden("Folder not exist"));
            }

            require_folder_access(&grant, &folder_name, &relative_path)?;
            (json!([SourceType::Folder.label(), zone_label]), folder_params)
        }
    };

    let children = graph
        .query_relations(&RelationQuery {
            start_label,
            start_params,
            end_label: json!([zone_label]),
            end_params: Some(child_params),
        })
        .await
        .api_err("Neo4j service")?;

    Ok::<_, ApiError>(ApiResponse::success(children))
}

/// Pre-download: every requested file must exist in the project and pass
/// the name-folder rule before the zone's download service is asked.
pub async fn download_pre(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DownloadRequest>,
) -> impl IntoResponse {
    let zone = parse_zone(&state.zones, &req.zone)?;
    let grant = require_permission(&state, &identity, &req.project_code, &req.zone).await?;

    let geids: Vec<String> = req.files.iter().map(|f| f.geid.clone()).collect();
    let nodes = state
        .services
        .graph
        .get_nodes_by_geid(&geids)
        .await
        .api_err("Neo4j service")?;

    for geid in &geids {
        let node = nodes
            .iter()
            .find(|node| node_geid(node) == Some(geid.as_str()))
            .ok_or_else(|| ApiError::not_found("File Not Exist").with_result(geid.clone()))?;

        if node.prop_str("project_code") != Some(req.project_code.as_str()) {
            return Err(ApiError::forbidden(PERMISSION_DENIED).with_result(geid.clone()));
        }
        require_path_access(&grant, node_path(node)).map_err(|e| e.with_result(geid.clone()))?;
    }

    let payload = serde_json::to_value(&req)
        .map_err(|e| ApiError::internal(format!("Download Error: {e}")))?;

    tracing::info!(
        "Pre-download of {} file(s) from {} by {}",
        geids.len(),
        req.project_code,
        identity.username
    );

    let reply = state
        .services
        .transfer
        .pre_download(zone, &payload)
        .await
        .api_err("Download Error")?;

    if reply.status == StatusCode::OK {
        Ok::<_, ApiError>(ApiResponse::success(reply.result()))
    } else {
        Err(ApiError::new(reply.status, reply.error_msg()))
    }
}
