//! YouTube search function for Bedrock agent action groups.
//!
//! [`handle_invocation`] reads the `query` / `maxResults` parameters, runs one
//! search through a [`VideoSearch`] implementation and wraps the formatted
//! result list in the envelope the agent expects.

mod config;
mod format;
mod invocation;
mod youtube;

pub use agentbridge_core::ConfigError;
pub use config::SearchConfig;
pub use format::format_results;
pub use invocation::{
    ActionResponse, FunctionResponse, Parameter, ResponseBody, SearchInvocation, SearchResponseEnvelope,
    TextBody,
};
pub use youtube::{VideoResult, VideoSearch, YouTubeClient};

use agentbridge_core::BridgeError;
use tracing::{error, info};

/// Handles one action-group invocation. Collaborator errors are logged and
/// returned unchanged.
pub async fn handle_invocation(
    search: &dyn VideoSearch,
    invocation: SearchInvocation,
) -> Result<SearchResponseEnvelope, BridgeError> {
    let query = invocation.query().to_string();
    let max_results = invocation.max_results();
    info!(
        action_group = %invocation.action_group,
        function = %invocation.function,
        query = %query,
        max_results,
        "Handling search invocation"
    );

    let videos = search.search(&query, max_results).await.map_err(|e| {
        error!("Error: {}", e);
        e
    })?;

    let envelope = SearchResponseEnvelope::text(&invocation, format_results(&query, &videos));
    info!("Response: {}", serde_json::to_string(&envelope)?);

    Ok(envelope)
}
