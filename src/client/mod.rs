/// The controller facade used by UI layers.
///
/// [`PhishGuardClient`] wires the session manager, synchronizer, and
/// submitter around one shared [`Resources`] value and exposes the
/// commands a UI invokes:
///
/// | Command                      | Effect                                        |
/// |------------------------------|-----------------------------------------------|
/// | [`start`](PhishGuardClient::start) | restore the stored session, then sync   |
/// | [`login`](PhishGuardClient::login) | establish a session, then sync          |
/// | [`logout`](PhishGuardClient::logout) | notify server, tear down              |
/// | [`submit_text`](PhishGuardClient::submit_text) / [`submit_url`](PhishGuardClient::submit_url) | analyze, then sync |
/// | [`ui_state`](PhishGuardClient::ui_state) | derive what to draw                |
///
/// All methods take `&self`; the client can be shared across threads.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::RiskApi;
use crate::api::http::HttpApi;
use crate::config::{self, ClientConfig};
use crate::error::ClientError;
use crate::models::{AnalysisResult, Session};
use crate::present::{self, UiState};
use crate::session::{SessionManager, SessionState};
use crate::state::{ResourceSnapshot, Resources};
use crate::store::theme::Theme;
use crate::store::{FileStore, LocalStore};
use crate::submit::{AnalysisRequest, AnalysisSubmitter};
use crate::sync::{SyncOutcome, Synchronizer};

pub struct PhishGuardClient {
    store: Arc<dyn LocalStore>,
    resources: Arc<Resources>,
    sessions: Arc<SessionManager>,
    sync: Arc<Synchronizer>,
    submitter: AnalysisSubmitter,
}

impl PhishGuardClient {
    /// Assemble a client from its two collaborators.
    pub fn new(api: Arc<dyn RiskApi>, store: Arc<dyn LocalStore>, validate_on_restore: bool) -> Self {
        let resources = Arc::new(Resources::new());
        let sessions = Arc::new(SessionManager::new(
            api.clone(),
            store.clone(),
            resources.clone(),
            validate_on_restore,
        ));
        let sync = Arc::new(Synchronizer::new(
            api.clone(),
            sessions.clone(),
            resources.clone(),
        ));
        let submitter =
            AnalysisSubmitter::new(api, sessions.clone(), sync.clone(), resources.clone());

        Self {
            store,
            resources,
            sessions,
            sync,
            submitter,
        }
    }

    /// HTTP transport and file store as configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let store_path =
            config::store_path(config).context("could not determine session store location")?;
        let api = Arc::new(HttpApi::from_config(&config.server));
        let store = Arc::new(FileStore::new(store_path));
        Ok(Self::new(api, store, config.session.validate_on_restore))
    }

    // -- Session --

    /// Startup: restore the stored session and synchronize.
    ///
    /// A stale stored token surfaces as [`ClientError::SessionExpired`]
    /// after the teardown; otherwise the sync outcome is returned.
    pub fn start(&self) -> Result<SyncOutcome, ClientError> {
        self.sessions.restore_session()?;
        self.sync.sync_all()
    }

    /// Log in and load the new user's data.
    ///
    /// The session is established even if the follow-up sync reports a
    /// partial failure.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let session = self.sessions.login(username, password)?;
        self.sync.sync_all()?;
        Ok(session)
    }

    pub fn signup(&self, username: &str, password: &str) -> Result<(), ClientError> {
        self.sessions.signup(username, password)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.sessions.logout()
    }

    pub fn session_state(&self) -> SessionState {
        self.sessions.state()
    }

    pub fn current_token(&self) -> Option<String> {
        self.sessions.current_token()
    }

    // -- Resources --

    pub fn sync_all(&self) -> Result<SyncOutcome, ClientError> {
        self.sync.sync_all()
    }

    pub fn clear_history(&self) -> Result<(), ClientError> {
        self.sync.clear_history()
    }

    pub fn submit_text(&self, content: &str) -> Result<AnalysisResult, ClientError> {
        self.submitter.submit_text(content)
    }

    pub fn submit_url(&self, content: &str) -> Result<AnalysisResult, ClientError> {
        self.submitter.submit_url(content)
    }

    pub fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult, ClientError> {
        self.submitter.submit(request)
    }

    pub fn reset_result(&self) {
        self.submitter.reset_result();
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        self.resources.snapshot()
    }

    // -- Theme --

    pub fn theme(&self) -> Theme {
        Theme::load(self.store.as_ref()).unwrap_or_default()
    }

    /// Persist `theme`, or toggle the saved one when `None`.
    pub fn set_theme(&self, theme: Option<Theme>) -> Result<Theme, ClientError> {
        let theme = theme.unwrap_or_else(|| Theme::toggled(Theme::load(self.store.as_ref())));
        theme
            .save(self.store.as_ref())
            .map_err(ClientError::storage)?;
        Ok(theme)
    }

    // -- Rendering --

    pub fn ui_state(&self) -> UiState {
        present::render(&self.sessions.state(), &self.resources.snapshot(), self.theme())
    }
}
