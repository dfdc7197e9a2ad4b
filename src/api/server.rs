use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::routes::{build_router, ApiState};
use crate::config::ServerConfig;
use crate::errors::InnkeepError;

/// Bind the API server and run it until ctrl-c.
pub async fn start_api_server(config: ServerConfig, state: ApiState) -> crate::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| InnkeepError::config(format!("Invalid API address: {}", e)))?;

    let mut router: Router = build_router(state);
    if config.enable_cors {
        router = router.layer(cors_layer(&config.cors_origins));
    }
    let router = router.layer(TraceLayer::new_for_http().make_span_with(
        |request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        },
    ));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| InnkeepError::internal(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");
    run_http_server(listener, router).await?;

    info!("API server shutdown completed");
    Ok(())
}

async fn run_http_server(listener: TcpListener, router: Router) -> crate::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "API server shutdown listener failed");
            }
        })
        .await
        .map_err(|e| InnkeepError::internal(format!("API server error: {}", e)))
}

/// CORS for browser clients. Session cookies only travel cross-origin when
/// the allowed origins are listed explicitly, so the credentialed variant
/// requires a non-empty origin list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> =
        origins.iter().filter_map(|origin| origin.parse().ok()).collect();

    if parsed.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([header::CONTENT_TYPE]);
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
