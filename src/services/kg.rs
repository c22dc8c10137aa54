use reqwest::Client;
use serde_json::Value;

use super::{UpstreamReply, join};
use crate::error::Result;

/// Client for the knowledge-graph import service.
#[derive(Clone)]
pub struct KgClient {
    client: Client,
    base_url: String,
}

impl KgClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Imports resources on behalf of the caller, whose token is re-attached.
    pub async fn import_resources(&self, token: &str, payload: &Value) -> Result<UpstreamReply> {
        let resp = self
            .client
            .post(join(&self.base_url, "/v1/resources"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        UpstreamReply::from_response(resp).await
    }
}
