use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::policy::{self, has_valid_attributes};
use crate::server::AppState;
use crate::server::dto::{EnvRequest, GenerateIdRequest, ManifestEnvelope, attribute_values};
use crate::server::extract::Json;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::{is_valid_generate_id, require_field};

const INVALID_DICOM_ID: &str = "Invalid DICOM ID";

pub async fn validate_gid(Json(req): Json<GenerateIdRequest>) -> impl IntoResponse {
    if is_valid_generate_id(&req.dcm_id) {
        Ok::<_, ApiError>(ApiResponse::success("Valid"))
    } else {
        Err(ApiError::bad_request(INVALID_DICOM_ID).with_result(INVALID_DICOM_ID))
    }
}

/// Checks attribute values against a project manifest without attaching
/// anything. Failures are reported in `result`.
pub async fn validate_manifest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ManifestEnvelope>,
) -> impl IntoResponse {
    let manifest_json = &req.manifest_json;
    let manifest_name = require_field(&manifest_json.manifest_name, "manifest_name")?;
    let project_code = require_field(&manifest_json.project_code, "project_code")?;

    let Some(manifest) = state
        .store
        .get_manifest_by_name(project_code, manifest_name)
        .api_err("Failed to get manifest")?
    else {
        let message = format!("Manifest Not Exist {manifest_name}");
        return Err(ApiError::not_found(message.clone()).with_result(message));
    };

    let schema = state
        .store
        .list_attributes(manifest.id)
        .api_err("Failed to list attributes")?;
    let attributes = manifest_json.attributes.clone().unwrap_or_default();

    if let Err(e) = has_valid_attributes(&attribute_values(&attributes), &schema) {
        let message = e.to_string();
        return Err(ApiError::bad_request(message.clone()).with_result(message));
    }

    Ok::<_, ApiError>(ApiResponse::success("Valid"))
}

/// Tells the CLI whether an upload or download may target a zone from the
/// zone it runs in.
pub async fn validate_env(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnvRequest>,
) -> impl IntoResponse {
    let verdict = policy::validate_env(
        &state.zones,
        &state.auth.cli_secret,
        &req.action,
        &req.zone,
        &req.environ,
    );
    if !verdict.is_valid() {
        tracing::debug!("Rejected {} to {}: {}", req.action, req.zone, verdict.error);
    }

    ApiResponse {
        code: verdict.code.as_u16(),
        error_msg: verdict.error,
        result: verdict.result,
    }
}
