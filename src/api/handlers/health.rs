//! Liveness probe.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::{ok, Envelope};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" when the server answers at all.
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Liveness probe
///
/// Unauthenticated; answers as long as the server is accepting requests.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_handler() -> Json<Envelope<HealthResponse>> {
    ok(HealthResponse { status: "ok".to_string(), version: crate::VERSION.to_string() })
}
