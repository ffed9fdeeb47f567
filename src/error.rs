//! Client-facing error taxonomy.
//!
//! Every operation of the controller fails with a [`ClientError`]. Only
//! [`ClientError::SessionExpired`] implies that the session was torn down;
//! the other variants leave the session untouched.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Required input was empty. Raised before any network call.
    #[error("{0}")]
    Validation(String),
    /// The service refused the credentials.
    #[error("{}", .0.as_deref().unwrap_or("invalid credentials"))]
    InvalidCredentials(Option<String>),
    /// The service refused to create the account.
    #[error("{}", .0.as_deref().unwrap_or("could not register user"))]
    Registration(Option<String>),
    /// An authenticated operation was attempted without a local token.
    #[error("log in first")]
    Unauthenticated,
    /// The service rejected the token; the session has been cleared.
    #[error("session expired, log in again")]
    SessionExpired,
    /// Scoring failed on the server side.
    #[error("analysis failed{}", .0.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Analysis(Option<String>),
    /// Non-authorization failure of another authenticated request.
    #[error("request rejected: {0}")]
    Rejected(String),
    /// No response from the service.
    #[error("network error: {0}")]
    Network(String),
    /// A successful response that did not match the contract.
    #[error("unexpected response from server: {0}")]
    InvalidResponse(String),
    /// The local session store could not be read or written.
    #[error("local storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Map transport-level failures shared by every operation. Returns the
    /// original error for status failures, which each caller maps itself.
    pub(crate) fn from_transport(err: ApiError) -> Result<Self, ApiError> {
        match err {
            ApiError::Transport(msg) => Ok(Self::Network(msg)),
            ApiError::Decode(msg) => Ok(Self::InvalidResponse(msg)),
            other => Err(other),
        }
    }

    pub(crate) fn storage(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }

    /// Whether the failure ended the session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}
