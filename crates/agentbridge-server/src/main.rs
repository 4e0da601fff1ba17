mod config;
mod cors;
mod dto;
mod error;
mod handlers;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agentbridge_runtime::BedrockAgentClient;
use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::state::ServerState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        "Agent {} (alias {}), allowed origin {:?}",
        config.agent_id, config.agent_alias_id, config.allowed_origin
    );

    let runtime = BedrockAgentClient::new(config.runtime.clone(), config.credentials.clone())?;
    let state = Arc::new(ServerState::new(
        Arc::new(runtime),
        config.agent_id,
        config.agent_alias_id,
        config.allowed_origin,
    ));

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server is running on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Routes plus the origin guard, CORS and request tracing layers.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route(
            "/chat",
            post(handlers::chat::chat).options(handlers::chat::preflight),
        )
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/health", get(handlers::health))
        .layer(cors::cors_layer(state.allowed_origin.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cors::reject_foreign_origin,
        ))
        .with_state(state)
}
