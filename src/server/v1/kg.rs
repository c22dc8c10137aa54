use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::auth::RequireIdentity;
use crate::server::AppState;
use crate::server::dto::KgImportRequest;
use crate::server::extract::Json;
use crate::server::response::{ApiError, Passthrough, StoreResultExt};

/// Forwards a knowledge-graph import with the caller's own bearer token.
pub async fn import_resources(
    RequireIdentity(identity): RequireIdentity,
    State(state): State<Arc<AppState>>,
    Json(req): Json<KgImportRequest>,
) -> impl IntoResponse {
    tracing::info!("KG import requested by {}", identity.username);

    let reply = state
        .services
        .kg
        .import_resources(&identity.token, &json!({ "data": req.data }))
        .await
        .api_err("KG service")?;

    Ok::<_, ApiError>(Passthrough(reply))
}
