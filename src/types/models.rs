use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated caller of one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    /// Platform role, `admin` or anything else.
    pub role: String,
    #[serde(skip)]
    pub token: String,
}

impl Identity {
    #[must_use]
    pub fn is_platform_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: i64,
    pub name: String,
    pub project_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Text,
    MultipleChoice,
}

impl AttributeType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeType::Text => "text",
            AttributeType::MultipleChoice => "multiple_choice",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(AttributeType::Text),
            "multiple_choice" => Some(AttributeType::MultipleChoice),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field definition of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: i64,
    pub manifest_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    /// Comma separated choices for `multiple_choice`.
    pub value: Option<String>,
    pub optional: bool,
    pub project_code: String,
}

impl Attribute {
    /// Allowed values of a `multiple_choice` attribute.
    pub fn choices(&self) -> impl Iterator<Item = &str> {
        self.value.as_deref().unwrap_or_default().split(',')
    }
}

#[derive(Debug, Clone)]
pub struct NewAttribute {
    pub manifest_id: i64,
    pub name: String,
    pub attribute_type: AttributeType,
    pub value: Option<String>,
    pub optional: bool,
    pub project_code: String,
}

/// Attribute as shown to the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeView {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub optional: bool,
    pub value: Option<String>,
}

impl From<&Attribute> for AttributeView {
    fn from(attribute: &Attribute) -> Self {
        Self {
            name: attribute.name.clone(),
            attribute_type: attribute.attribute_type,
            optional: attribute.optional,
            value: attribute.value.clone(),
        }
    }
}

/// A manifest together with its attribute definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDetail {
    pub manifest_name: String,
    pub id: i64,
    pub attributes: Vec<AttributeView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetVersion {
    pub id: i64,
    pub dataset_code: String,
    pub dataset_geid: String,
    pub version: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub location: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDatasetVersion {
    pub dataset_code: String,
    pub dataset_geid: String,
    pub version: String,
    pub created_by: String,
    pub location: String,
    pub notes: Option<String>,
}

/// A node returned by the graph service. Properties other than `id` and
/// `labels` are kept verbatim so they can be passed back to the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphNode {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl GraphNode {
    #[must_use]
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn prop_bool(&self, key: &str) -> bool {
        self.properties
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}
