use std::sync::Arc;

use agentbridge_runtime::AgentRuntime;
use axum::http::HeaderValue;

/// Immutable dependencies shared by every request.
pub struct ServerState {
    pub runtime: Arc<dyn AgentRuntime>,
    pub agent_id: String,
    pub agent_alias_id: String,
    pub allowed_origin: HeaderValue,
}

impl ServerState {
    pub fn new(
        runtime: Arc<dyn AgentRuntime>,
        agent_id: impl Into<String>,
        agent_alias_id: impl Into<String>,
        allowed_origin: HeaderValue,
    ) -> Self {
        Self {
            runtime,
            agent_id: agent_id.into(),
            agent_alias_id: agent_alias_id.into(),
            allowed_origin,
        }
    }
}
