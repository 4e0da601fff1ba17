//! Client for the Bedrock Agent Runtime `InvokeAgent` operation.
//!
//! The agent answers with an AWS event stream; [`BedrockAgentClient`] decodes it
//! into a [`CompletionStream`] of [`ChunkEvent`]s and [`collect_completion`]
//! folds those chunks into the final text.

mod client;
mod completion;
mod credentials;
mod event_stream;
mod signing;

pub use client::{BedrockAgentClient, ClientConfig};
pub use completion::collect_completion;
pub use credentials::AwsCredentials;
pub use event_stream::{EventStreamMessage, EventStreamParser, HeaderValue};
pub use signing::SigV4Signer;

use std::fmt;
use std::pin::Pin;

use agentbridge_core::BridgeError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Input for a single agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeAgentRequest {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub session_id: String,
    pub input_text: String,
}

/// One unit of the streamed completion. Only `chunk` events carry bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkEvent {
    pub event_type: String,
    pub bytes: Option<Bytes>,
}

impl ChunkEvent {
    pub fn chunk(bytes: impl Into<Bytes>) -> Self {
        Self {
            event_type: "chunk".into(),
            bytes: Some(bytes.into()),
        }
    }

    pub fn empty(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bytes: None,
        }
    }
}

/// Lazy, finite, non-restartable sequence of chunk events.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<ChunkEvent, BridgeError>> + Send>>;

/// Response of an agent invocation. `completion` is `None` when the service
/// answered without an event stream body.
pub struct InvokeAgentResponse {
    pub session_id: Option<String>,
    pub content_type: Option<String>,
    pub completion: Option<CompletionStream>,
}

impl fmt::Debug for InvokeAgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokeAgentResponse")
            .field("session_id", &self.session_id)
            .field("content_type", &self.content_type)
            .field("completion", &self.completion.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collaborator trait
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke_agent(&self, request: InvokeAgentRequest)
        -> Result<InvokeAgentResponse, BridgeError>;
}
