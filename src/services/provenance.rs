use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::{UpstreamReply, join};
use crate::error::Result;

/// Lineage creation can be slow on the provenance side.
const LINEAGE_TIMEOUT: Duration = Duration::from_secs(100);

#[derive(Clone)]
pub struct ProvenanceClient {
    client: Client,
    base_url: String,
}

impl ProvenanceClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_lineage(&self, payload: &Value) -> Result<UpstreamReply> {
        let resp = self
            .client
            .post(join(&self.base_url, "/v1/lineage"))
            .timeout(LINEAGE_TIMEOUT)
            .json(payload)
            .send()
            .await?;
        UpstreamReply::from_response(resp).await
    }
}
