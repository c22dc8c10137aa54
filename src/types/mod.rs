mod models;
mod permission;

pub use models::{
    Attribute, AttributeType, AttributeView, DatasetVersion, GraphNode, Identity, Manifest,
    ManifestDetail, NewAttribute, NewDatasetVersion,
};
pub use permission::{
    Decision, Denial, Grant, PERMISSION_DENIED, PROJECT_NOT_FOUND, ProjectRole, RoleLookup,
    USER_NOT_IN_PROJECT, Zone,
};
