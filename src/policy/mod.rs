//! Authorization and validation rules that do not depend on HTTP.

pub mod attributes;
pub mod crypto;
pub mod engine;
pub mod environment;
pub mod folder;

pub use attributes::{AttributeError, has_valid_attributes};
pub use crypto::{decrypt_zone, encrypt_zone};
pub use engine::{
    check_permission, decide, get_project_role, require_owned_folder, require_owned_path,
};
pub use environment::{Action, EnvVerdict, permitted_zones, validate_env};
