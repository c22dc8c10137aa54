use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, header::AUTHORIZATION, header::WWW_AUTHENTICATE, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::helpers::resolve_identity;
use crate::server::AppState;
use crate::types::Identity;

/// Extractor that requires a valid bearer token for a known user.
pub struct RequireIdentity(pub Identity);

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenExpired,
    UserNotFound,
    UnknownUser(String),
    Directory(String),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::UserNotFound | AuthError::UnknownUser(_) => StatusCode::NOT_FOUND,
            AuthError::Directory(_) => StatusCode::FORBIDDEN,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            AuthError::MissingToken => "Token required".to_string(),
            AuthError::InvalidToken => "Invalid token".to_string(),
            AuthError::TokenExpired => "Token expired".to_string(),
            AuthError::UserNotFound => "User not found".to_string(),
            AuthError::UnknownUser(username) => {
                format!("Neo4j service: User {username} does not exist.")
            }
            AuthError::Directory(error) => format!("Neo4j service: {error}"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({ "code": status.as_u16(), "error_msg": self.message(), "result": {} });

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"bffcli\""),
            );
        }

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireIdentity {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let identity = resolve_identity(state, auth_header).await?;
        Ok(RequireIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(AuthError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingToken.message(), "Token required");
        assert_eq!(AuthError::TokenExpired.message(), "Token expired");
        assert_eq!(
            AuthError::UnknownUser("jdoe".into()).message(),
            "Neo4j service: User jdoe does not exist."
        );
        assert_eq!(
            AuthError::Directory("timeout".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let response = AuthError::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(WWW_AUTHENTICATE));

        let response = AuthError::UserNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!response.headers().contains_key(WWW_AUTHENTICATE));
    }
}
