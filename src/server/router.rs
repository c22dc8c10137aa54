use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::v1::v1_router;
use crate::config::{AppConfig, AuthConfig, ZoneConfig};
use crate::error::Result;
use crate::services::Services;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub services: Services,
    pub zones: ZoneConfig,
    pub auth: AuthConfig,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        services: Services,
        zones: ZoneConfig,
        auth: AuthConfig,
    ) -> Self {
        Self {
            store,
            services,
            zones,
            auth,
        }
    }

    /// Builds the downstream clients from configuration around an open store.
    pub fn from_config(store: Arc<dyn Store>, config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            store,
            Services::new(&config.services)?,
            config.zones.clone(),
            config.auth.clone(),
        ))
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/v1", v1_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
