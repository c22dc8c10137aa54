use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::auth::RequireIdentity;
use crate::server::AppState;
use crate::server::dto::LineageRequest;
use crate::server::extract::Json;
use crate::server::response::{ApiError, Passthrough, StoreResultExt};

pub async fn create_lineage(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<LineageRequest>,
) -> impl IntoResponse {
    tracing::info!(
        "Lineage {} -> {} in {} by {}",
        req.input_geid,
        req.output_geid,
        req.project_code,
        identity.username
    );

    let payload = serde_json::to_value(&req)
        .map_err(|e| ApiError::internal(format!("Provenance service: {e}")))?;
    let reply = state
        .services
        .provenance
        .create_lineage(&payload)
        .await
        .api_err("Provenance service")?;

    Ok::<_, ApiError>(Passthrough(reply))
}
