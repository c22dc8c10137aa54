use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Project requests

#[derive(Debug, Deserialize, Serialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub upload_message: String,
    #[serde(default, rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub dcm_id: String,
    #[serde(default)]
    pub current_folder_node: String,
    #[serde(default)]
    pub data: Vec<UploadFile>,
}

/// One file announced by the CLI before upload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadFile {
    #[serde(default)]
    pub resumable_filename: String,
    #[serde(default)]
    pub resumable_relative_path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadFile {
    /// Path of the file inside the project, relative to the zone root.
    #[must_use]
    pub fn relative_path(&self) -> String {
        let folder = self.resumable_relative_path.trim_matches('/');
        if folder.is_empty() {
            self.resumable_filename.clone()
        } else {
            format!("{folder}/{}", self.resumable_filename)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub relative_path: String,
}

#[derive(Debug, Deserialize)]
pub struct FileExistQuery {
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub file_relative_path: String,
}

// File requests

#[derive(Debug, Deserialize)]
pub struct FileListQuery {
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub source_type: String,
}

#[derive(Debug, Deserialize)]
pub struct GeidQuery {
    #[serde(default)]
    pub geid: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub files: Vec<DownloadFile>,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub project_code: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub zone: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadFile {
    #[serde(default)]
    pub geid: String,
}

// Manifest requests

#[derive(Debug, Deserialize)]
pub struct ManifestQuery {
    #[serde(default)]
    pub project_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ManifestExportQuery {
    #[serde(default)]
    pub project_code: String,
    #[serde(default)]
    pub manifest_name: String,
}

/// Body of manifest attach and validate requests.
#[derive(Debug, Deserialize)]
pub struct ManifestEnvelope {
    #[serde(default)]
    pub manifest_json: ManifestJson,
}

#[derive(Debug, Default, Deserialize)]
pub struct ManifestJson {
    pub manifest_name: Option<String>,
    pub project_code: Option<String>,
    pub file_name: Option<String>,
    pub zone: Option<String>,
    pub attributes: Option<Map<String, Value>>,
}

/// Attribute values as strings in submission order; `null` counts as empty.
#[must_use]
pub fn attribute_values(attributes: &Map<String, Value>) -> IndexMap<String, String> {
    attributes
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

// Validation requests

#[derive(Debug, Deserialize)]
pub struct GenerateIdRequest {
    #[serde(default)]
    pub dcm_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EnvRequest {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub environ: String,
    #[serde(default)]
    pub zone: String,
}

// HPC requests

#[derive(Debug, Deserialize)]
pub struct HpcAuthRequest {
    pub token_issuer: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct HpcJobRequest {
    pub host: String,
    pub username: String,
    pub token: String,
    #[serde(default)]
    pub job_info: Value,
}

#[derive(Debug, Deserialize)]
pub struct HpcQuery {
    pub host: String,
    pub username: String,
    pub token: String,
}

// Forwarded requests

#[derive(Debug, Deserialize)]
pub struct KgImportRequest {
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LineageRequest {
    pub project_code: String,
    pub input_geid: String,
    pub output_geid: String,
    pub pipeline_name: String,
    #[serde(default)]
    pub description: String,
}
