use reqwest::Client;
use serde_json::Value;

use super::{UpstreamReply, join};
use crate::error::Result;

/// Client for the file metadata service.
#[derive(Clone)]
pub struct FileInfoClient {
    client: Client,
    base_url: String,
}

impl FileInfoClient {
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn file_exists(
        &self,
        project_code: &str,
        zone: &str,
        file_relative_path: &str,
    ) -> Result<UpstreamReply> {
        let url = join(
            &self.base_url,
            &format!("/v1/project/{project_code}/file/exist"),
        );
        let resp = self
            .client
            .get(url)
            .query(&[
                ("project_code", project_code),
                ("zone", zone),
                ("file_relative_path", file_relative_path),
            ])
            .send()
            .await?;
        UpstreamReply::from_response(resp).await
    }

    pub async fn attach_manifest(&self, payload: &Value) -> Result<UpstreamReply> {
        let resp = self
            .client
            .post(join(&self.base_url, "/v1/files/attributes/attach"))
            .json(payload)
            .send()
            .await?;
        UpstreamReply::from_response(resp).await
    }
}
