//! REST API components: routing, handlers, the response envelope, and the
//! OpenAPI surface.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use routes::{build_router, ApiState};
pub use server::start_api_server;
