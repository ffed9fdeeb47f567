//! Analysis submission.
//!
//! A submission is validated locally first (non-blank input, a token must
//! exist), then posted. On success the result becomes the last result and
//! history/stats are re-synchronized before the call returns. A result
//! that arrives after the session was torn down or replaced is discarded
//! and reported as [`ClientError::SessionExpired`].

use std::fmt;
use std::sync::Arc;

use crate::api::{ApiError, RiskApi};
use crate::error::ClientError;
use crate::logging;
use crate::models::AnalysisResult;
use crate::session::SessionManager;
use crate::state::Resources;
use crate::sync::Synchronizer;

const COMPONENT: &str = "analyze";

/// Content to score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    Text(String),
    Url(String),
}

impl AnalysisRequest {
    fn content(&self) -> &str {
        match self {
            Self::Text(s) | Self::Url(s) => s,
        }
    }
}

impl fmt::Display for AnalysisRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => write!(f, "text"),
            Self::Url(_) => write!(f, "url"),
        }
    }
}

pub struct AnalysisSubmitter {
    api: Arc<dyn RiskApi>,
    sessions: Arc<SessionManager>,
    sync: Arc<Synchronizer>,
    resources: Arc<Resources>,
}

impl AnalysisSubmitter {
    pub fn new(
        api: Arc<dyn RiskApi>,
        sessions: Arc<SessionManager>,
        sync: Arc<Synchronizer>,
        resources: Arc<Resources>,
    ) -> Self {
        Self {
            api,
            sessions,
            sync,
            resources,
        }
    }

    pub fn submit_text(&self, content: &str) -> Result<AnalysisResult, ClientError> {
        self.submit(AnalysisRequest::Text(content.to_string()))
    }

    pub fn submit_url(&self, content: &str) -> Result<AnalysisResult, ClientError> {
        self.submit(AnalysisRequest::Url(content.to_string()))
    }

    pub fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        if request.content().trim().is_empty() {
            return Err(ClientError::Validation(match request {
                AnalysisRequest::Text(_) => "enter some text to analyze".to_string(),
                AnalysisRequest::Url(_) => "enter a URL to analyze".to_string(),
            }));
        }

        // Taken before the token: a reset in between makes the epoch stale.
        let epoch = self.resources.epoch();
        let token = self
            .sessions
            .current_token()
            .ok_or(ClientError::Unauthenticated)?;

        let response = match &request {
            AnalysisRequest::Text(text) => self
                .api
                .analyze_text(&token, text)
                .map(AnalysisResult::Text),
            AnalysisRequest::Url(url) => self
                .api
                .analyze_url(&token, url)
                .map(AnalysisResult::Url),
        };

        let result = match response {
            Ok(result) => result,
            Err(ApiError::Unauthorized(_)) => return Err(self.sessions.expire(&token)),
            Err(err) => {
                logging::warn(COMPONENT, &format!("{request} analysis failed: {err}"));
                return Err(ClientError::from_transport(err)
                    .unwrap_or_else(|err| ClientError::Analysis(err.detail().map(str::to_string))));
            }
        };

        logging::info(
            COMPONENT,
            &format!("{request} analysis verdict={}", result.verdict()),
        );

        if !self.resources.set_result_if(epoch, result.clone()) {
            logging::info(COMPONENT, "dropped result of a session that has ended");
            return Err(ClientError::SessionExpired);
        }
        let outcome = self.sync.sync_all()?;
        logging::info(COMPONENT, &format!("post-analysis sync {outcome}"));

        Ok(result)
    }

    /// Drop the last result (manual reset of the result panel).
    pub fn reset_result(&self) {
        self.resources.clear_result();
    }
}
