mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the relational interface for manifests and dataset versions.
///
/// Manifests and attributes are normally written by an external admin
/// process; the create methods exist for operators and tests.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Manifest operations
    fn create_manifest(&self, name: &str, project_code: &str) -> Result<Manifest>;
    fn get_manifest_by_name(&self, project_code: &str, name: &str) -> Result<Option<Manifest>>;
    fn list_manifests(&self, project_code: &str) -> Result<Vec<Manifest>>;

    // Attribute operations
    fn create_attribute(&self, attribute: &NewAttribute) -> Result<Attribute>;
    fn list_attributes(&self, manifest_id: i64) -> Result<Vec<Attribute>>;
    fn list_attributes_for(&self, manifest_ids: &[i64]) -> Result<Vec<Attribute>>;

    // Dataset version operations
    fn create_dataset_version(&self, version: &NewDatasetVersion) -> Result<DatasetVersion>;
    fn list_dataset_versions(&self, dataset_geid: &str) -> Result<Vec<DatasetVersion>>;
}

/// Builds the CLI view of manifests, preserving manifest order.
#[must_use]
pub fn manifest_details(manifests: &[Manifest], attributes: &[Attribute]) -> Vec<ManifestDetail> {
    manifests
        .iter()
        .map(|manifest| ManifestDetail {
            manifest_name: manifest.name.clone(),
            id: manifest.id,
            attributes: attributes
                .iter()
                .filter(|a| a.manifest_id == manifest.id)
                .map(AttributeView::from)
                .collect(),
        })
        .collect()
}
