use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};

use crate::auth::RequireIdentity;
use crate::policy::folder::split_folder_path;
use crate::policy::has_valid_attributes;
use crate::server::AppState;
use crate::server::dto::{ManifestEnvelope, ManifestExportQuery, ManifestQuery, attribute_values};
use crate::server::extract::{Json, Query};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{parse_zone, require_field};
use crate::store::manifest_details;
use crate::types::PERMISSION_DENIED;

use super::access::require_permission;

/// Lists the manifests of a project with their attribute definitions.
pub async fn list_manifests(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ManifestQuery>,
) -> impl IntoResponse {
    require_permission(&state, &identity, &params.project_code, &state.zones.greenroom).await?;

    let manifests = state
        .store
        .list_manifests(&params.project_code)
        .api_err("Failed to list manifests")?;
    let ids: Vec<i64> = manifests.iter().map(|m| m.id).collect();
    let attributes = state
        .store
        .list_attributes_for(&ids)
        .api_err("Failed to list attributes")?;

    Ok::<_, ApiError>(ApiResponse::success(manifest_details(&manifests, &attributes)))
}

/// Attaches a manifest and its attribute values to an uploaded file.
pub async fn attach_manifest(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ManifestEnvelope>,
) -> impl IntoResponse {
    let manifest_json = &req.manifest_json;
    let manifest_name = require_field(&manifest_json.manifest_name, "manifest_name")?;
    let project_code = require_field(&manifest_json.project_code, "project_code")?;
    let file_name = require_field(&manifest_json.file_name, "file_name")?;
    let zone_value = require_field(&manifest_json.zone, "zone")?;

    let grant = require_permission(&state, &identity, project_code, zone_value).await?;
    let zone = parse_zone(&state.zones, zone_value)?;

    let mut query = json!({
        "labels": ["File", state.zones.label(zone)],
        "project_code": project_code,
        "archived": false,
    });
    let (folder, name) = split_folder_path(file_name);
    query["name"] = Value::String(name);
    if !folder.is_empty() {
        query["folder_relative_path"] = Value::String(folder);
    }

    let file = state
        .services
        .graph
        .search_nodes(&query)
        .await
        .api_err("Neo4j service")?
        .into_iter()
        .next()
        .or_not_found("File Not Exist")?;

    if let Some(uploader) = &grant.uploader {
        if file.prop_str("uploader") != Some(uploader.as_str()) {
            return Err(ApiError::forbidden(PERMISSION_DENIED));
        }
    }
    let geid = file.prop_str("global_entity_id").unwrap_or_default();

    let manifest = state
        .store
        .get_manifest_by_name(project_code, manifest_name)
        .api_err("Failed to get manifest")?
        .ok_or_else(|| ApiError::bad_request(format!("Manifest Not Exist {manifest_name}")))?;

    let attributes = manifest_json.attributes.clone().unwrap_or_default();
    let schema = state
        .store
        .list_attributes(manifest.id)
        .api_err("Failed to list attributes")?;
    has_valid_attributes(&attribute_values(&attributes), &schema)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    tracing::info!(
        "Attaching manifest {} to {} in {} for {}",
        manifest_name,
        file_name,
        project_code,
        identity.username
    );

    let reply = state
        .services
        .file_info
        .attach_manifest(&json!({
            "project_code": project_code,
            "global_entity_id": [geid],
            "manifest_id": manifest.id,
            "attributes": attributes,
            "username": identity.username,
            "project_role": grant.project_role.as_str(),
        }))
        .await
        .api_err("File info service")?;

    if reply.status == StatusCode::OK {
        Ok::<_, ApiError>(ApiResponse::success(reply.result()))
    } else {
        Err(ApiError::new(reply.status, reply.error_msg()))
    }
}

/// Exports one manifest of a project by name.
pub async fn export_manifest(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ManifestExportQuery>,
) -> impl IntoResponse {
    require_permission(&state, &identity, &params.project_code, &state.zones.greenroom).await?;

    let manifest = state
        .store
        .get_manifest_by_name(&params.project_code, &params.manifest_name)
        .api_err("Failed to get manifest")?
        .or_not_found(format!("Manifest Not Exist {}", params.manifest_name))?;
    let attributes = state
        .store
        .list_attributes(manifest.id)
        .api_err("Failed to list attributes")?;

    let detail = manifest_details(std::slice::from_ref(&manifest), &attributes)
        .into_iter()
        .next()
        .or_not_found(format!("Manifest Not Exist {}", params.manifest_name))?;

    Ok::<_, ApiError>(ApiResponse::success(detail))
}
