//! Error taxonomy shared by the chat gateway and the search action, plus the
//! start-up configuration error both binaries report.

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The caller omitted a required field.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A collaborator answered, but its response is missing something we need
    /// or does not follow the expected wire format.
    #[error("Upstream protocol error: {0}")]
    UpstreamProtocol(String),

    /// Network, auth, quota or timeout failure reported by a collaborator.
    #[error("Collaborator failure: {0}")]
    Collaborator(String),
}

impl BridgeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BridgeError::Validation(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        BridgeError::UpstreamProtocol(msg.into())
    }

    pub fn collaborator(e: impl std::fmt::Display) -> Self {
        BridgeError::Collaborator(e.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::UpstreamProtocol(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            key,
            reason: reason.to_string(),
        }
    }
}
