pub mod dto;
pub mod extract;
pub mod response;
mod router;
mod v1;
pub mod validation;

pub use router::{AppState, create_router};
pub use v1::v1_router;
