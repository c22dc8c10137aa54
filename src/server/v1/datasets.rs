use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;

use crate::auth::RequireIdentity;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::services::RelationQuery;
use crate::types::{DatasetVersion, GraphNode, PERMISSION_DENIED};

const DATASET_NOT_FOUND: &str = "Dataset not found";

#[derive(Debug, Serialize)]
pub struct DatasetDetail {
    pub general_info: GraphNode,
    pub version_detail: Vec<DatasetVersion>,
    pub version_no: usize,
}

/// Datasets the caller has a relation to.
pub async fn list_datasets(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let datasets = state
        .services
        .graph
        .query_relations(&RelationQuery {
            start_label: json!("User"),
            start_params: json!({ "name": identity.username }),
            end_label: json!("Dataset"),
            end_params: None,
        })
        .await
        .api_err("Neo4j service")?;

    Ok::<_, ApiError>(ApiResponse::success(datasets))
}

/// Dataset node plus its published versions. Only the creator may read it.
pub async fn get_dataset(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Path(dataset_code): Path<String>,
) -> impl IntoResponse {
    let node = state
        .services
        .graph
        .get_node("Dataset", &json!({ "code": dataset_code }))
        .await
        .api_err("Neo4j service")?
        .filter(|node| node.has_label("Dataset"))
        .or_not_found(DATASET_NOT_FOUND)?;

    if node.prop_str("creator") != Some(identity.username.as_str()) {
        return Err(ApiError::forbidden(PERMISSION_DENIED));
    }

    let geid = node.prop_str("global_entity_id").unwrap_or_default();
    let versions = state
        .store
        .list_dataset_versions(geid)
        .api_err("Failed to list dataset versions")?;

    Ok::<_, ApiError>(ApiResponse::success(DatasetDetail {
        version_no: versions.len(),
        version_detail: versions,
        general_info: node,
    }))
}
