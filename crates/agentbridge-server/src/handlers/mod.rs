//! HTTP route handlers for the chat gateway.

pub mod chat;

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}
