mod helpers;
mod middleware;
mod token;

pub use helpers::{extract_token_from_header, resolve_identity, username_from_claims};
pub use middleware::{AuthError, RequireIdentity};
pub use token::{Claims, TokenError, decode_claims};
