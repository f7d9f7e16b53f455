use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the wizard.
/// Cloneable so the last failure can be kept in `WizardState` for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WizardError {
    /// The backend answered with a non-success status
    #[error("request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// A driver or request was invoked without its required input
    #[error("precondition failed: {reason}")]
    PreconditionFailed { reason: String },

    /// A base64 payload could not be decoded
    #[error("failed to decode payload: {reason}")]
    DecodeFailed { reason: String },

    /// Connection-level failure before a status was received
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Success status but the body did not match the expected shape
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, WizardError>;

impl WizardError {
    pub fn request_failed<S: Into<String>>(status: u16, message: S) -> Self {
        WizardError::RequestFailed {
            status,
            message: message.into(),
        }
    }

    pub fn precondition<S: Into<String>>(reason: S) -> Self {
        WizardError::PreconditionFailed {
            reason: reason.into(),
        }
    }

    /// Short stage label used as a structured log field
    pub fn stage(&self) -> &'static str {
        match self {
            WizardError::RequestFailed { .. } => "request",
            WizardError::PreconditionFailed { .. } => "precondition",
            WizardError::DecodeFailed { .. } => "decode",
            WizardError::Transport { .. } => "transport",
            WizardError::InvalidResponse { .. } => "json_parse",
            WizardError::Io { .. } => "io",
            WizardError::Config { .. } => "config",
        }
    }

    /// HTTP status for backend failures
    pub fn status(&self) -> Option<u16> {
        match self {
            WizardError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WizardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WizardError::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            WizardError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for WizardError {
    fn from(err: serde_json::Error) -> Self {
        WizardError::InvalidResponse {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for WizardError {
    fn from(err: std::io::Error) -> Self {
        WizardError::Io {
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for WizardError {
    fn from(err: base64::DecodeError) -> Self {
        WizardError::DecodeFailed {
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WizardError {
    fn from(err: toml::de::Error) -> Self {
        WizardError::Config {
            message: err.to_string(),
        }
    }
}
