/// Contract of the remote risk-analysis service.
///
/// [`RiskApi`] is the seam between the controller and the network. The
/// production implementation is [`http::HttpApi`] (blocking `ureq` calls);
/// tests substitute scripted fakes. Every authenticated method takes the
/// bearer token explicitly so a caller can tell which token a `401` was
/// issued against.
pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{HistoryEntry, Stats, TextAnalysis, UrlAnalysis};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of `POST /signup` and `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful `POST /login` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Error body the service attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Flatten `detail` into a message. Validation failures send a list of
    /// objects rather than a string; those are rendered as compact JSON.
    pub(crate) fn message(self) -> Option<String> {
        match self.detail? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single call against the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// `401`: the token (or the credentials) were refused.
    #[error("unauthorized{}", fmt_detail(.0))]
    Unauthorized(Option<String>),
    /// Any other non-2xx status.
    #[error("HTTP {status}{}", fmt_detail(.detail))]
    Status { status: u16, detail: Option<String> },
    /// No response at all: DNS, connect, TLS, timeout.
    #[error("transport error: {0}")]
    Transport(String),
    /// A 2xx response whose body did not match the contract.
    #[error("malformed response: {0}")]
    Decode(String),
}

fn fmt_detail(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {d}"))
        .unwrap_or_default()
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Server-supplied message, when the response carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(detail) | Self::Status { detail, .. } => detail.as_deref(),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Map a non-2xx status and its optional detail.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        if status == 401 {
            Self::Unauthorized(detail)
        } else {
            Self::Status { status, detail }
        }
    }
}

// ---------------------------------------------------------------------------
// Service trait
// ---------------------------------------------------------------------------

/// Remote service operations used by the client.
///
/// Implementations must be shareable across the threads `sync_all` spawns
/// for its concurrent fetches.
pub trait RiskApi: Send + Sync {
    fn signup(&self, credentials: &Credentials) -> Result<(), ApiError>;

    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// Returns the username the token belongs to.
    fn validate_token(&self, token: &str) -> Result<String, ApiError>;

    fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError>;

    fn clear_history(&self, token: &str) -> Result<(), ApiError>;

    fn stats(&self, token: &str) -> Result<Stats, ApiError>;

    fn analyze_text(&self, token: &str, text: &str) -> Result<TextAnalysis, ApiError>;

    fn analyze_url(&self, token: &str, url: &str) -> Result<UrlAnalysis, ApiError>;
}
