//! HTTP middleware.

mod layers;
mod request_id;
mod security;

pub use layers::{compression, cors};
pub use request_id::request_id_middleware;
pub use security::security_headers_middleware;
