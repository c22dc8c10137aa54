//! HTTP clients for the downstream services.
//!
//! All clients share one `reqwest::Client`; each one only knows its own
//! base URL and endpoints.

mod file_info;
mod graph;
mod hpc;
mod kg;
mod provenance;
mod transfer;

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::{Client, Response};
use serde_json::Value;

pub use file_info::FileInfoClient;
pub use graph::{GraphClient, RelationQuery};
pub use hpc::{HpcClient, HpcError, HpcHost, HpcResource};
pub use kg::KgClient;
pub use provenance::ProvenanceClient;
pub use transfer::TransferClient;

use crate::config::ServicesConfig;
use crate::error::{Error, Result};

/// Status and decoded body of a downstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamReply {
    /// Reads a response body, keeping non-JSON bodies as a string.
    pub async fn from_response(resp: Response) -> Result<Self> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Ok(Self { status, body })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `result` field of an envelope-shaped body.
    #[must_use]
    pub fn result(&self) -> Value {
        self.body.get("result").cloned().unwrap_or(Value::Null)
    }

    /// Best effort error text from the body.
    #[must_use]
    pub fn error_msg(&self) -> String {
        match &self.body {
            Value::String(text) if !text.is_empty() => text.clone(),
            body => body
                .get("error_msg")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| self.status.to_string()),
        }
    }
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Turns a non-success response into `Error::UpstreamStatus`.
async fn expect_success(service: &'static str, resp: Response) -> Result<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let reply = UpstreamReply::from_response(resp).await?;
    Err(Error::UpstreamStatus {
        service,
        status: reply.status.as_u16(),
        message: reply.error_msg(),
    })
}

/// Every downstream client, built once at startup.
pub struct Services {
    pub graph: GraphClient,
    pub file_info: FileInfoClient,
    pub transfer: TransferClient,
    pub hpc: HpcClient,
    pub kg: KgClient,
    pub provenance: ProvenanceClient,
}

impl Services {
    pub fn new(config: &ServicesConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            graph: GraphClient::new(client.clone(), &config.graph),
            file_info: FileInfoClient::new(client.clone(), &config.file_info),
            transfer: TransferClient::new(client.clone(), config),
            hpc: HpcClient::new(client.clone(), &config.hpc),
            kg: KgClient::new(client.clone(), &config.kg),
            provenance: ProvenanceClient::new(client, &config.provenance),
        })
    }
}
