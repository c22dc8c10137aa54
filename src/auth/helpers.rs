use std::sync::Arc;

use chrono::Utc;

use super::middleware::AuthError;
use super::token::{Claims, TokenError, decode_claims};
use crate::server::AppState;
use crate::types::Identity;

/// Extracts the token from an Authorization header, with or without the
/// `Bearer ` prefix. Returns None when there is no usable value.
#[must_use]
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<String> {
    let value = auth_header?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Checks expiry and returns the username carried by the claims.
pub fn username_from_claims(claims: &Claims, now: f64) -> Result<String, AuthError> {
    if claims.is_expired(now) {
        return Err(AuthError::TokenExpired);
    }
    claims
        .preferred_username
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or(AuthError::UserNotFound)
}

fn now_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Resolves the caller from a bearer token.
///
/// Expired or malformed tokens are rejected before the graph service is
/// contacted.
pub async fn resolve_identity(
    state: &Arc<AppState>,
    auth_header: Option<&str>,
) -> Result<Identity, AuthError> {
    let token = extract_token_from_header(auth_header).ok_or(AuthError::MissingToken)?;

    let claims = decode_claims(&token, state.auth.jwt_secret.as_deref()).map_err(|e| {
        if e == TokenError::BadSignature {
            tracing::warn!("Rejected token with an invalid signature");
        }
        AuthError::InvalidToken
    })?;

    let username = username_from_claims(&claims, now_secs())?;

    let user = state
        .services
        .graph
        .get_user(&username)
        .await
        .map_err(|e| {
            tracing::warn!("User lookup for {username} failed: {e}");
            AuthError::Directory(e.to_string())
        })?
        .ok_or_else(|| AuthError::UnknownUser(username.clone()))?;

    Ok(Identity {
        user_id: user.id,
        username,
        role: user.prop_str("role").unwrap_or_default().to_string(),
        token,
    })
}
