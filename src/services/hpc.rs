use axum::http::StatusCode;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use super::join;

/// An HPC failure, already mapped to the status the CLI should see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HpcError {
    pub code: StatusCode,
    pub message: String,
}

impl HpcError {
    fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// A slurm host given as `protocol://host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HpcHost {
    pub protocol: String,
    pub slurm_host: String,
}

impl HpcHost {
    pub fn parse(host: &str) -> Result<Self, HpcError> {
        match host.split_once("://") {
            Some((protocol, slurm_host)) => Ok(Self {
                protocol: protocol.to_string(),
                slurm_host: slurm_host.to_string(),
            }),
            None => Err(HpcError::new(
                StatusCode::BAD_REQUEST,
                "HPC protocal required",
            )),
        }
    }
}

/// Read-only HPC resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HpcResource {
    Job(String),
    Nodes,
    Node(String),
    Partitions,
    Partition(String),
}

impl HpcResource {
    fn path(&self) -> String {
        match self {
            HpcResource::Job(id) => format!("/v1/hpc/job/{id}"),
            HpcResource::Nodes => "/v1/hpc/nodes".to_string(),
            HpcResource::Node(name) => format!("/v1/hpc/nodes/{name}"),
            HpcResource::Partitions => "/v1/hpc/partitions".to_string(),
            HpcResource::Partition(name) => format!("/v1/hpc/partitions/{name}"),
        }
    }

    fn empty_message(&self) -> String {
        match self {
            HpcResource::Job(_) => "Cannot get HPC job information".to_string(),
            HpcResource::Nodes => "Cannot get HPC nodes".to_string(),
            HpcResource::Node(_) => "Cannot get HPC nodes information".to_string(),
            HpcResource::Partitions => "Cannot get HPC partitions".to_string(),
            HpcResource::Partition(name) => format!("Cannot get HPC partition: {name}"),
        }
    }

    /// Maps an upstream failure for this resource to a CLI-facing error.
    #[must_use]
    pub fn classify(&self, code: u16, error_msg: &str) -> HpcError {
        let passthrough = || {
            HpcError::new(
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                error_msg,
            )
        };

        match self {
            HpcResource::Job(_) if error_msg.contains("unknown job") => {
                HpcError::new(StatusCode::NOT_FOUND, "Job ID not found")
            }
            HpcResource::Job(_) if error_msg.contains("Unable find requested URL") => {
                HpcError::new(StatusCode::NOT_FOUND, "Host not found")
            }
            HpcResource::Job(_) => HpcError::internal(error_msg),
            HpcResource::Node(_) if error_msg.contains("Invalid node name specified") => {
                HpcError::new(StatusCode::NOT_FOUND, "Node name not found")
            }
            HpcResource::Partition(_) if error_msg.contains("Invalid partition name specified") => {
                HpcError::new(StatusCode::NOT_FOUND, "Partition name not found")
            }
            _ => passthrough(),
        }
    }
}

/// Maps a failed job submission to a CLI-facing error.
#[must_use]
pub fn classify_submission(code: u16, error_msg: &str) -> HpcError {
    const EMPTY_DESCRIPTION: &str =
        "Jobs description entry not found, empty or not dictionary or list";

    match code {
        400 if error_msg.contains(EMPTY_DESCRIPTION) => {
            HpcError::new(StatusCode::BAD_REQUEST, EMPTY_DESCRIPTION)
        }
        400 => HpcError::new(StatusCode::BAD_REQUEST, error_msg),
        500 if error_msg.contains("Zero Bytes were transmitted or received") => {
            HpcError::new(StatusCode::FORBIDDEN, "HPC token expired")
        }
        _ => HpcError::internal(error_msg),
    }
}

#[derive(Debug, Deserialize)]
struct HpcEnvelope {
    code: u16,
    #[serde(default)]
    error_msg: String,
    #[serde(default)]
    result: Value,
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Client for the HPC job service.
#[derive(Clone)]
pub struct HpcClient {
    client: Client,
    base_url: String,
}

impl HpcClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn envelope(&self, request: reqwest::RequestBuilder) -> Result<HpcEnvelope, HpcError> {
        let resp = request
            .send()
            .await
            .map_err(|e| HpcError::internal(e.to_string()))?;
        resp.json::<HpcEnvelope>()
            .await
            .map_err(|e| HpcError::internal(e.to_string()))
    }

    /// Exchanges HPC credentials for an HPC token.
    pub async fn auth(
        &self,
        token_issuer: &str,
        username: &str,
        password: &str,
    ) -> Result<Value, HpcError> {
        let request = self
            .client
            .post(join(&self.base_url, "/v1/hpc/auth"))
            .json(&json!({
                "token_issuer": token_issuer,
                "username": username,
                "password": password,
            }));

        let token = match self.envelope(request).await {
            Ok(envelope) => envelope.result,
            Err(e) => {
                tracing::warn!("HPC auth request failed: {e}");
                Value::Null
            }
        };

        if is_empty(&token) {
            return Err(HpcError::internal("Cannot authorized HPC"));
        }
        Ok(token)
    }

    pub async fn submit_job(
        &self,
        token: &str,
        host: &HpcHost,
        username: &str,
        job_info: &Value,
    ) -> Result<Value, HpcError> {
        let script = job_info.get("script").and_then(Value::as_str).unwrap_or_default();
        if script.is_empty() {
            return Err(HpcError::new(StatusCode::BAD_REQUEST, "Missing script"));
        }

        let request = self
            .client
            .post(join(&self.base_url, "/v1/hpc/job"))
            .header(AUTHORIZATION, token)
            .json(&json!({
                "slurm_host": host.slurm_host,
                "username": username,
                "job_info": job_info,
                "protocol": host.protocol,
            }));

        let envelope = self.envelope(request).await?;
        if envelope.code == 200 {
            Ok(envelope.result)
        } else {
            Err(classify_submission(envelope.code, &envelope.error_msg))
        }
    }

    pub async fn fetch(
        &self,
        resource: &HpcResource,
        token: &str,
        host: &HpcHost,
        username: &str,
    ) -> Result<Value, HpcError> {
        let request = self
            .client
            .get(join(&self.base_url, &resource.path()))
            .header(AUTHORIZATION, token)
            .query(&[
                ("slurm_host", host.slurm_host.as_str()),
                ("username", username),
                ("protocol", host.protocol.as_str()),
            ]);

        let envelope = self.envelope(request).await?;
        if envelope.code != 200 {
            return Err(resource.classify(envelope.code, &envelope.error_msg));
        }
        if is_empty(&envelope.result) {
            return Err(HpcError::internal(resource.empty_message()));
        }
        Ok(envelope.result)
    }
}
