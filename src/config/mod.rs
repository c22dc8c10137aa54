//! Gateway configuration, read from a TOML file.
//!
//! Every section has defaults so a partial file (or none at all) is valid.
//!
//! ```toml
//! [server]
//! port = 5080
//!
//! [services]
//! graph = "http://neo4j.utility:5062"
//!
//! [zones]
//! greenroom = "Greenroom"
//! core = "VRECore"
//!
//! [auth]
//! cli_secret = "..."
//! ```

mod server;

use std::path::Path;

use serde::Deserialize;

pub use server::ServerConfig;

use crate::error::{Error, Result};
use crate::types::Zone;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub services: ServicesConfig,
    pub zones: ZoneConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Base URLs of the downstream services.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub graph: String,
    pub file_info: String,
    pub upload_greenroom: String,
    pub upload_core: String,
    pub download_greenroom: String,
    pub download_core: String,
    pub hpc: String,
    pub kg: String,
    pub provenance: String,
    /// Timeout applied to every outbound call, in seconds.
    pub timeout_secs: u64,
}

impl ServicesConfig {
    /// Points every service at the same base URL.
    #[must_use]
    pub fn single_host(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            graph: base.clone(),
            file_info: base.clone(),
            upload_greenroom: base.clone(),
            upload_core: base.clone(),
            download_greenroom: base.clone(),
            download_core: base.clone(),
            hpc: base.clone(),
            kg: base.clone(),
            provenance: base,
            timeout_secs: 30,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            graph: "http://127.0.0.1:5062".to_string(),
            file_info: "http://127.0.0.1:5066".to_string(),
            upload_greenroom: "http://127.0.0.1:5079".to_string(),
            upload_core: "http://127.0.0.1:5079".to_string(),
            download_greenroom: "http://127.0.0.1:5077".to_string(),
            download_core: "http://127.0.0.1:5077".to_string(),
            hpc: "http://127.0.0.1:5090".to_string(),
            kg: "http://127.0.0.1:5081".to_string(),
            provenance: "http://127.0.0.1:5076".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Labels used for the two storage zones in graph nodes and requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub greenroom: String,
    pub core: String,
}

impl ZoneConfig {
    /// Case-insensitive match of a zone string against the configured labels.
    #[must_use]
    pub fn parse(&self, value: &str) -> Option<Zone> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(&self.greenroom) {
            Some(Zone::Greenroom)
        } else if value.eq_ignore_ascii_case(&self.core) {
            Some(Zone::Core)
        } else {
            None
        }
    }

    #[must_use]
    pub fn label(&self, zone: Zone) -> &str {
        match zone {
            Zone::Greenroom => &self.greenroom,
            Zone::Core => &self.core,
        }
    }

    /// Zone of a graph node, from its labels. Nodes without the core label
    /// live in the greenroom.
    #[must_use]
    pub fn zone_of(&self, labels: &[String]) -> Zone {
        if labels.iter().any(|l| l.eq_ignore_ascii_case(&self.core)) {
            Zone::Core
        } else {
            Zone::Greenroom
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            greenroom: "Greenroom".to_string(),
            core: "VRECore".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base64 salt shared with the CLI for the encrypted current-zone variable.
    pub cli_secret: String,
    /// When set, bearer tokens must carry a valid HS256 signature.
    pub jwt_secret: Option<String>,
}
