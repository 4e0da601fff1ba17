//! HTTP client for `InvokeAgent`.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use agentbridge_core::BridgeError;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::credentials::AwsCredentials;
use crate::event_stream::{EventStreamMessage, EventStreamParser};
use crate::signing::SigV4Signer;
use crate::{AgentRuntime, ChunkEvent, CompletionStream, InvokeAgentRequest, InvokeAgentResponse};

/// InvokeAgent is signed for `bedrock`, not `bedrock-agent-runtime`.
const SIGNING_SERVICE: &str = "bedrock";
const EVENT_STREAM_CONTENT_TYPE: &str = "application/vnd.amazon.eventstream";
const SESSION_ID_HEADER: &str = "x-amz-bedrock-agent-session-id";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvokeAgentBody<'a> {
    input_text: &'a str,
}

#[derive(Deserialize)]
struct PayloadPart {
    bytes: Option<String>,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Where and how long to talk to the agent runtime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub region: String,
    pub endpoint: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Uses the public regional endpoint.
    pub fn for_region(region: impl Into<String>, timeout: Duration) -> Result<Self, url::ParseError> {
        let region = region.into();
        let endpoint = Url::parse(&format!("https://bedrock-agent-runtime.{}.amazonaws.com", region))?;
        Ok(Self { region, endpoint, timeout })
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// Bedrock Agent Runtime client.
pub struct BedrockAgentClient {
    http: Client,
    signer: SigV4Signer,
    endpoint: Url,
}

impl BedrockAgentClient {
    pub fn new(config: ClientConfig, credentials: AwsCredentials) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        info!(
            "BedrockAgentClient: region={}, endpoint={}, timeout={:?}",
            config.region, config.endpoint, config.timeout
        );
        Ok(Self {
            http,
            signer: SigV4Signer::new(credentials, config.region, SIGNING_SERVICE),
            endpoint: config.endpoint,
        })
    }

    fn invoke_url(&self, request: &InvokeAgentRequest) -> Result<Url, BridgeError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| BridgeError::protocol(format!("endpoint cannot be a base URL: {}", self.endpoint)))?
            .pop_if_empty()
            .extend([
                "agents",
                request.agent_id.as_str(),
                "agentAliases",
                request.agent_alias_id.as_str(),
                "sessions",
                request.session_id.as_str(),
                "text",
            ]);
        Ok(url)
    }
}

impl fmt::Debug for BedrockAgentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockAgentClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentClient {
    async fn invoke_agent(&self, request: InvokeAgentRequest) -> Result<InvokeAgentResponse, BridgeError> {
        let url = self.invoke_url(&request)?;
        let body = serde_json::to_vec(&InvokeAgentBody {
            input_text: &request.input_text,
        })?;

        let headers = vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("accept".to_string(), EVENT_STREAM_CONTENT_TYPE.to_string()),
        ];
        let signed = self.signer.sign("POST", &url, &headers, &body);

        let mut builder = self.http.post(url.clone());
        for (name, value) in headers.iter().chain(signed.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(%url, session_id = %request.session_id, "Invoking agent");
        let response = builder.body(body).send().await.map_err(BridgeError::collaborator)?;

        info!(
            status = %response.status(),
            headers = ?response.headers(),
            "InvokeAgent response"
        );

        if !response.status().is_success() {
            let status = response.status();
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => format!("<unreadable body: {}>", e),
            };
            let detail = serde_json::from_str::<ServiceErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(text);
            return Err(BridgeError::Collaborator(format!(
                "InvokeAgent error {}: {}",
                status, detail
            )));
        }

        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let session_id = header(SESSION_ID_HEADER);
        let content_type = header("content-type");

        let completion = content_type
            .as_deref()
            .filter(|ct| ct.starts_with(EVENT_STREAM_CONTENT_TYPE))
            .is_some()
            .then(|| decode_completion(response.bytes_stream()));

        Ok(InvokeAgentResponse {
            session_id,
            content_type,
            completion,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Body decoding
// ─────────────────────────────────────────────────────────────────────────────

struct DecodeState<S> {
    body: S,
    parser: EventStreamParser,
    ready: VecDeque<Result<ChunkEvent, BridgeError>>,
    finished: bool,
}

/// Turns a raw event stream body into chunk events. Yields at most one error,
/// after which the stream ends.
pub(crate) fn decode_completion<S, E>(body: S) -> CompletionStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = DecodeState {
        body: Box::pin(body),
        parser: EventStreamParser::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    let events = futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.ready.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }

            match st.body.next().await {
                Some(Ok(bytes)) => {
                    st.parser.feed(&bytes);
                    for message in st.parser.drain() {
                        let event = message.and_then(into_chunk_event);
                        st.finished = event.is_err();
                        st.ready.push_back(event);
                        if st.finished {
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    st.finished = true;
                    st.ready.push_back(Err(BridgeError::collaborator(e)));
                }
                None => {
                    st.finished = true;
                    if st.parser.pending() > 0 {
                        st.ready
                            .push_back(Err(BridgeError::protocol("event stream ended mid-message")));
                    }
                }
            }
        }
    });

    Box::pin(events)
}

fn into_chunk_event(message: EventStreamMessage) -> Result<ChunkEvent, BridgeError> {
    if message.is_exception() {
        let kind = message
            .exception_type()
            .or_else(|| message.header_str(":error-code"))
            .unwrap_or("unknown")
            .to_string();
        let detail = serde_json::from_slice::<ServiceErrorBody>(&message.payload)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| String::from_utf8_lossy(&message.payload).into_owned());
        return Err(BridgeError::Collaborator(format!("{}: {}", kind, detail)));
    }

    let event_type = message.event_type().unwrap_or_default().to_string();
    if event_type != "chunk" {
        return Ok(ChunkEvent::empty(event_type));
    }

    let part: PayloadPart = serde_json::from_slice(&message.payload)?;
    let Some(encoded) = part.bytes else {
        return Ok(ChunkEvent::empty(event_type));
    };
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| BridgeError::protocol(format!("chunk bytes are not base64: {}", e)))?;

    Ok(ChunkEvent::chunk(decoded))
}
