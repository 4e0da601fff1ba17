//! Single-origin cross-origin policy.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header::ORIGIN, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowHeaders, CorsLayer};
use tracing::warn;

use crate::error::AppError;
use crate::state::ServerState;

/// CORS headers for the one allowed origin. Pre-flight answers with 200.
pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
}

/// Rejects browser requests from any other origin before they reach a handler.
/// Requests without an `Origin` header are not cross-origin and pass through.
pub async fn reject_foreign_origin(
    State(state): State<Arc<ServerState>>,
    req: Request,
    next: Next,
) -> Response {
    match req.headers().get(ORIGIN) {
        Some(origin) if *origin != state.allowed_origin => {
            warn!(origin = ?origin, method = %req.method(), uri = %req.uri(), "Rejected cross-origin request");
            AppError::Forbidden.into_response()
        }
        _ => next.run(req).await,
    }
}
