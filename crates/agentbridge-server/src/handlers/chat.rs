//! Chat HTTP handlers.

use std::sync::Arc;

use agentbridge_core::BridgeError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use crate::dto::{ChatRequest, ChatResponse};
use crate::error::{AppError, MISSING_FIELDS};
use crate::services::agent as agent_service;
use crate::state::ServerState;

/// POST /chat - Forwards a message to the agent and returns the full completion.
pub async fn chat(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let (message, session_id) = match payload {
        Ok(Json(req)) => validate(req)?,
        Err(rejection) => {
            info!("Rejected chat body: {}", rejection.body_text());
            return Err(BridgeError::validation(MISSING_FIELDS).into());
        }
    };

    let response = agent_service::invoke(&state, message, session_id)
        .await
        .map_err(|e| {
            error!("Error: {}", e);
            e
        })?;

    Ok(Json(response))
}

/// OPTIONS /chat - Plain OPTIONS without CORS request headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn validate(req: ChatRequest) -> Result<(String, String), BridgeError> {
    let message = req.message.filter(|m| !m.is_empty());
    let session_id = req.session_id.filter(|s| !s.is_empty());
    match (message, session_id) {
        (Some(message), Some(session_id)) => Ok((message, session_id)),
        _ => Err(BridgeError::validation(MISSING_FIELDS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use agentbridge_runtime::{AgentRuntime, ChunkEvent, InvokeAgentRequest, InvokeAgentResponse};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, HeaderValue, Request};
    use axum::Router;
    use tower::ServiceExt;

    const ORIGIN: &str = "http://localhost:5173";

    enum Reply {
        Chunks(Vec<Option<&'static str>>),
        NoStream,
        Fail,
    }

    struct FakeRuntime {
        reply: Reply,
        calls: AtomicUsize,
        last: Mutex<Option<InvokeAgentRequest>>,
    }

    impl FakeRuntime {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentRuntime for FakeRuntime {
        async fn invoke_agent(&self, request: InvokeAgentRequest) -> Result<InvokeAgentResponse, BridgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());

            let completion = match &self.reply {
                Reply::Fail => return Err(BridgeError::collaborator("UnrecognizedClientException")),
                Reply::NoStream => None,
                Reply::Chunks(chunks) => {
                    let events: Vec<Result<ChunkEvent, BridgeError>> = chunks
                        .iter()
                        .map(|c| match c {
                            Some(text) => Ok(ChunkEvent::chunk(text.to_string())),
                            None => Ok(ChunkEvent::empty("trace")),
                        })
                        .collect();
                    Some(Box::pin(futures::stream::iter(events)) as agentbridge_runtime::CompletionStream)
                }
            };

            Ok(InvokeAgentResponse {
                session_id: Some(request.session_id),
                content_type: None,
                completion,
            })
        }
    }

    fn app(runtime: Arc<FakeRuntime>) -> Router {
        let state = ServerState::new(runtime, "AGENT1", "ALIAS1", HeaderValue::from_static(ORIGIN));
        crate::build_router(Arc::new(state))
    }

    fn post_chat(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_completion_and_session() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![Some("Hel"), Some("lo, "), None, Some("world")]));
        let resp = app(runtime.clone())
            .oneshot(post_chat(r#"{"message":"hi","sessionId":"abc-123"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body, serde_json::json!({ "sessionId": "abc-123", "completion": "Hello, world" }));
        assert_eq!(runtime.calls(), 1);
    }

    #[tokio::test]
    async fn test_chat_forwards_agent_and_input() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![Some("ok")]));
        app(runtime.clone())
            .oneshot(post_chat(r#"{"message":"What is Lambda?","sessionId":"s1"}"#))
            .await
            .unwrap();

        let sent = runtime.last.lock().unwrap().clone().unwrap();
        assert_eq!(
            sent,
            InvokeAgentRequest {
                agent_id: "AGENT1".into(),
                agent_alias_id: "ALIAS1".into(),
                session_id: "s1".into(),
                input_text: "What is Lambda?".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_message_is_bad_request() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![]));
        let resp = app(runtime.clone())
            .oneshot(post_chat(r#"{"sessionId":"abc"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], MISSING_FIELDS);
        assert_eq!(runtime.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_session_is_bad_request() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![]));
        let resp = app(runtime.clone())
            .oneshot(post_chat(r#"{"message":"hi","sessionId":""}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(runtime.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![]));
        let resp = app(runtime.clone()).oneshot(post_chat("{not json")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(runtime.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_stream_is_internal_error() {
        let runtime = FakeRuntime::new(Reply::NoStream);
        let resp = app(runtime)
            .oneshot(post_chat(r#"{"message":"hi","sessionId":"abc"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(resp).await;
        assert_eq!(body, serde_json::json!({ "error": "An error occurred while processing your request." }));
    }

    #[tokio::test]
    async fn test_collaborator_failure_is_generic_internal_error() {
        let runtime = FakeRuntime::new(Reply::Fail);
        let resp = app(runtime)
            .oneshot(post_chat(r#"{"message":"hi","sessionId":"abc"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(resp).await;
        assert!(!body["error"].as_str().unwrap().contains("UnrecognizedClientException"));
    }

    #[tokio::test]
    async fn test_foreign_origin_is_rejected() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![Some("x")]));
        let mut req = post_chat(r#"{"message":"hi","sessionId":"abc"}"#);
        req.headers_mut()
            .insert(header::ORIGIN, HeaderValue::from_static("https://evil.example"));

        let resp = app(runtime.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(runtime.calls(), 0);
    }

    #[tokio::test]
    async fn test_allowed_origin_gets_cors_headers() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![Some("x")]));
        let mut req = post_chat(r#"{"message":"hi","sessionId":"abc"}"#);
        req.headers_mut().insert(header::ORIGIN, HeaderValue::from_static(ORIGIN));

        let resp = app(runtime).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    }

    #[tokio::test]
    async fn test_preflight_from_allowed_origin() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![]));
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/chat")
            .header(header::ORIGIN, ORIGIN)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let resp = app(runtime.clone()).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
        assert_eq!(runtime.calls(), 0);
    }

    #[tokio::test]
    async fn test_preflight_from_foreign_origin_is_rejected() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![]));
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/chat")
            .header(header::ORIGIN, "https://evil.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let resp = app(runtime).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_health() {
        let runtime = FakeRuntime::new(Reply::Chunks(vec![]));
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let resp = app(runtime).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn test_validate() {
        let ok = validate(ChatRequest {
            message: Some("hi".into()),
            session_id: Some("s".into()),
        });
        assert_eq!(ok.unwrap(), ("hi".to_string(), "s".to_string()));

        assert!(validate(ChatRequest::default()).is_err());
        assert!(validate(ChatRequest {
            message: Some(String::new()),
            session_id: Some("s".into()),
        })
        .is_err());
    }
}
