//! Folds a chunk stream into the final completion text.

use agentbridge_core::BridgeError;
use futures::StreamExt;

use crate::CompletionStream;

/// Concatenates every chunk payload in arrival order.
///
/// Events without bytes are skipped. The first stream error aborts the fold
/// and is returned as-is, so callers never see a partial completion.
pub async fn collect_completion(completion: Option<CompletionStream>) -> Result<String, BridgeError> {
    let Some(mut stream) = completion else {
        return Err(BridgeError::protocol("missing completion stream"));
    };

    let mut accumulated = String::new();
    while let Some(event) = stream.next().await {
        let Some(bytes) = event?.bytes else {
            continue;
        };
        accumulated.push_str(&String::from_utf8_lossy(&bytes));
    }
    Ok(accumulated)
}
