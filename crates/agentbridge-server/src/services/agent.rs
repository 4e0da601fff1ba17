//! Agent invocation service.

use agentbridge_core::BridgeError;
use agentbridge_runtime::{collect_completion, InvokeAgentRequest};
use tracing::info;

use crate::dto::ChatResponse;
use crate::state::ServerState;

/// Sends one message to the configured agent and waits for the whole
/// completion. The caller's session id is echoed back untouched.
pub async fn invoke(state: &ServerState, message: String, session_id: String) -> Result<ChatResponse, BridgeError> {
    let request = InvokeAgentRequest {
        agent_id: state.agent_id.clone(),
        agent_alias_id: state.agent_alias_id.clone(),
        session_id: session_id.clone(),
        input_text: message,
    };

    let response = state.runtime.invoke_agent(request).await?;
    info!("Response: {:?}", response);

    let completion = collect_completion(response.completion).await?;

    Ok(ChatResponse { session_id, completion })
}
