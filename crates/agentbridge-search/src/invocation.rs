//! Action-group function invocation and response shapes.

use serde::{Deserialize, Serialize};

const DEFAULT_QUERY: &str = "AWS services";
const DEFAULT_MAX_RESULTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            value: value.into(),
        }
    }
}

/// Event delivered by the agent when it calls a function of an action group.
///
/// Only `actionGroup`, `function`, `parameters` and `messageVersion` are
/// used; the remaining fields are accepted so the full event deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInvocation {
    pub action_group: String,
    pub function: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub message_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
}

impl SearchInvocation {
    /// Value of the first parameter with the given name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// `query` parameter, or the fallback when absent or empty.
    pub fn query(&self) -> &str {
        self.parameter("query")
            .filter(|q| !q.is_empty())
            .unwrap_or(DEFAULT_QUERY)
    }

    /// `maxResults` parameter, read from its leading decimal digits so that
    /// `"3.0"` and `"10abc"` count as 3 and 10. Values without leading digits
    /// fall back to the default instead of failing the call.
    pub fn max_results(&self) -> u32 {
        self.parameter("maxResults")
            .and_then(leading_integer)
            .unwrap_or(DEFAULT_MAX_RESULTS)
    }
}

/// Leading run of ASCII digits after optional whitespace and `+`.
fn leading_integer(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned[..end].parse().ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Response envelope
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

/// What the function hands back to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponseEnvelope {
    pub response: ActionResponse,
    pub message_version: String,
}

impl SearchResponseEnvelope {
    /// Wraps `body` as a TEXT response, echoing the invocation's identifiers.
    pub fn text(invocation: &SearchInvocation, body: String) -> Self {
        Self {
            response: ActionResponse {
                action_group: invocation.action_group.clone(),
                function: invocation.function.clone(),
                function_response: FunctionResponse {
                    response_body: ResponseBody {
                        text: TextBody { body },
                    },
                },
            },
            message_version: invocation.message_version.clone(),
        }
    }

    pub fn body(&self) -> &str {
        &self.response.function_response.response_body.text.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invocation(params: Vec<Parameter>) -> SearchInvocation {
        SearchInvocation {
            action_group: "youtube-search".into(),
            function: "search_videos".into(),
            parameters: params,
            message_version: "1.0".into(),
            agent: None,
            session_id: None,
            input_text: None,
        }
    }

    #[test]
    fn test_deserializes_agent_event() {
        let event = json!({
            "messageVersion": "1.0",
            "agent": { "name": "video-helper", "id": "A1", "alias": "TSTALIASID", "version": "DRAFT" },
            "inputText": "find rust talks",
            "sessionId": "123456789",
            "actionGroup": "youtube-search",
            "function": "search_videos",
            "parameters": [
                { "name": "query", "type": "string", "value": "rust async" },
                { "name": "maxResults", "type": "integer", "value": "3" }
            ],
            "sessionAttributes": {},
            "promptSessionAttributes": {}
        });

        let inv: SearchInvocation = serde_json::from_value(event).unwrap();
        assert_eq!(inv.action_group, "youtube-search");
        assert_eq!(inv.function, "search_videos");
        assert_eq!(inv.query(), "rust async");
        assert_eq!(inv.max_results(), 3);
        assert_eq!(inv.parameters[1].param_type.as_deref(), Some("integer"));
    }

    #[test]
    fn test_query_defaults() {
        assert_eq!(invocation(vec![]).query(), "AWS services");
        assert_eq!(invocation(vec![Parameter::new("query", "")]).query(), "AWS services");
    }

    #[test]
    fn test_first_matching_parameter_wins() {
        let inv = invocation(vec![
            Parameter::new("maxResults", "2"),
            Parameter::new("query", "first"),
            Parameter::new("query", "second"),
        ]);
        assert_eq!(inv.query(), "first");
        assert_eq!(inv.max_results(), 2);
    }

    #[test]
    fn test_max_results_fallbacks() {
        assert_eq!(invocation(vec![]).max_results(), 5);
        assert_eq!(invocation(vec![Parameter::new("maxResults", "abc")]).max_results(), 5);
        assert_eq!(invocation(vec![Parameter::new("maxResults", "")]).max_results(), 5);
        assert_eq!(invocation(vec![Parameter::new("maxResults", "-1")]).max_results(), 5);
        assert_eq!(invocation(vec![Parameter::new("maxResults", "10")]).max_results(), 10);
        assert_eq!(invocation(vec![Parameter::new("maxResults", ".5")]).max_results(), 5);
    }

    #[test]
    fn test_max_results_reads_leading_digits() {
        let max = |v: &str| invocation(vec![Parameter::new("maxResults", v)]).max_results();
        assert_eq!(max("10abc"), 10);
        assert_eq!(max("3.0"), 3);
        assert_eq!(max("  7 "), 7);
        assert_eq!(max("+4"), 4);
        assert_eq!(max("0"), 0);
        assert_eq!(max("99999999999"), 5);
    }

    #[test]
    fn test_envelope_wire_shape() {
        let inv = invocation(vec![]);
        let envelope = SearchResponseEnvelope::text(&inv, "hello".into());

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "response": {
                    "actionGroup": "youtube-search",
                    "function": "search_videos",
                    "functionResponse": { "responseBody": { "TEXT": { "body": "hello" } } }
                },
                "messageVersion": "1.0"
            })
        );
        assert_eq!(envelope.body(), "hello");
    }
}
