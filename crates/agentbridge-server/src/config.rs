//! Environment configuration for the chat gateway.

use std::time::Duration;

use agentbridge_core::ConfigError;
use agentbridge_runtime::{AwsCredentials, ClientConfig};
use axum::http::HeaderValue;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_origin: HeaderValue,
    pub agent_id: String,
    pub agent_alias_id: String,
    pub runtime: ClientConfig,
    pub credentials: AwsCredentials,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let credentials = AwsCredentials::from_env().ok_or(ConfigError::Missing(
            "AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY",
        ))?;
        Self::from_lookup(|key| std::env::var(key).ok(), credentials)
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F, credentials: AwsCredentials) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::invalid("PORT", e))?,
            None => DEFAULT_PORT,
        };

        let origin = get("ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let allowed_origin = HeaderValue::from_str(&origin).map_err(|e| ConfigError::invalid("ALLOWED_ORIGIN", e))?;

        let timeout_secs = match get("AGENT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::invalid("AGENT_TIMEOUT_SECS", e))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        let mut runtime = ClientConfig::for_region(&region, Duration::from_secs(timeout_secs))
            .map_err(|e| ConfigError::invalid("AWS_REGION", e))?;
        if let Some(endpoint) = get("BEDROCK_AGENT_ENDPOINT") {
            let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::invalid("BEDROCK_AGENT_ENDPOINT", e))?;
            runtime = runtime.with_endpoint(endpoint);
        }

        Ok(Self {
            port,
            allowed_origin,
            agent_id: require("AGENT_ID")?,
            agent_alias_id: require("AGENT_ALIAS_ID")?,
            runtime,
            credentials,
        })
    }
}
