/// Blocking HTTP implementation of [`RiskApi`] on top of `ureq`.
///
/// One [`ureq::Agent`] is shared by every call so connections are pooled;
/// the agent is `Send + Sync`, which lets `sync_all` issue the history and
/// stats requests from two threads at once.
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ApiError, Credentials, ErrorBody, LoginResponse, RiskApi};
use crate::config::schema::ServerConfig;
use crate::models::{HistoryEntry, Stats, TextAnalysis, UrlAnalysis};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AnalyzeTextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct AnalyzeUrlRequest<'a> {
    url: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ValidateTokenResponse {
    username: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the risk-analysis service.
#[derive(Debug, Clone)]
pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpApi {
    /// Build a client for `base_url`. Without a timeout the transport
    /// defaults apply.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a client from the resolved `[server]` config section.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            &config.base_url,
            config.timeout_ms.map(Duration::from_millis),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str, token: &str) -> ureq::Request {
        self.agent
            .get(&self.url(path))
            .set("Authorization", &bearer(token))
    }

    fn post(&self, path: &str, token: Option<&str>) -> ureq::Request {
        let request = self.agent.post(&self.url(path));
        match token {
            Some(token) => request.set("Authorization", &bearer(token)),
            None => request,
        }
    }
}

impl RiskApi for HttpApi {
    fn signup(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let resp = self.post("/signup", None).send_json(credentials);
        discard(resp)
    }

    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let resp = self.post("/login", None).send_json(credentials);
        decode(resp)
    }

    fn logout(&self, token: &str) -> Result<(), ApiError> {
        let resp = self.post("/logout", Some(token)).call();
        discard(resp)
    }

    fn validate_token(&self, token: &str) -> Result<String, ApiError> {
        let resp = self.get("/validate-token", token).call();
        decode::<ValidateTokenResponse>(resp).map(|r| r.username)
    }

    fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        decode(self.get("/history", token).call())
    }

    fn clear_history(&self, token: &str) -> Result<(), ApiError> {
        let resp = self
            .agent
            .delete(&self.url("/history"))
            .set("Authorization", &bearer(token))
            .call();
        discard(resp)
    }

    fn stats(&self, token: &str) -> Result<Stats, ApiError> {
        decode(self.get("/stats", token).call())
    }

    fn analyze_text(&self, token: &str, text: &str) -> Result<TextAnalysis, ApiError> {
        let resp = self
            .post("/analyze", Some(token))
            .send_json(AnalyzeTextRequest { text });
        decode(resp)
    }

    fn analyze_url(&self, token: &str, url: &str) -> Result<UrlAnalysis, ApiError> {
        let resp = self
            .post("/analyze_url", Some(token))
            .send_json(AnalyzeUrlRequest { url });
        decode(resp)
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Parse a 2xx JSON body into `T`, or map the failure.
fn decode<T: DeserializeOwned>(resp: Result<ureq::Response, ureq::Error>) -> Result<T, ApiError> {
    resp.map_err(map_error)?
        .into_json::<T>()
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Accept any 2xx response, ignoring the body.
fn discard(resp: Result<ureq::Response, ureq::Error>) -> Result<(), ApiError> {
    resp.map(|_| ()).map_err(map_error)
}

fn map_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, resp) => {
            let detail = resp
                .into_json::<ErrorBody>()
                .ok()
                .and_then(ErrorBody::message);
            ApiError::from_status(status, detail)
        }
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}
