use reqwest::Client;
use serde_json::Value;

use super::{UpstreamReply, join};
use crate::config::ServicesConfig;
use crate::error::Result;
use crate::types::Zone;

/// Upload and download services, one instance per zone.
#[derive(Clone)]
pub struct TransferClient {
    client: Client,
    upload_greenroom: String,
    upload_core: String,
    download_greenroom: String,
    download_core: String,
}

impl TransferClient {
    #[must_use]
    pub fn new(client: Client, config: &ServicesConfig) -> Self {
        Self {
            client,
            upload_greenroom: config.upload_greenroom.clone(),
            upload_core: config.upload_core.clone(),
            download_greenroom: config.download_greenroom.clone(),
            download_core: config.download_core.clone(),
        }
    }

    fn upload_url(&self, zone: Zone) -> &str {
        match zone {
            Zone::Greenroom => &self.upload_greenroom,
            Zone::Core => &self.upload_core,
        }
    }

    fn download_url(&self, zone: Zone) -> &str {
        match zone {
            Zone::Greenroom => &self.download_greenroom,
            Zone::Core => &self.download_core,
        }
    }

    /// Registers an upload job with the zone's upload service.
    pub async fn pre_upload(
        &self,
        zone: Zone,
        session_id: Option<&str>,
        payload: &Value,
    ) -> Result<UpstreamReply> {
        let mut request = self
            .client
            .post(join(self.upload_url(zone), "/v1/files/jobs"))
            .json(payload);
        if let Some(session_id) = session_id {
            request = request.header("Session-ID", session_id);
        }
        UpstreamReply::from_response(request.send().await?).await
    }

    pub async fn pre_download(&self, zone: Zone, payload: &Value) -> Result<UpstreamReply> {
        let resp = self
            .client
            .post(join(self.download_url(zone), "/v1/download/pre/"))
            .json(payload)
            .send()
            .await?;
        UpstreamReply::from_response(resp).await
    }
}
