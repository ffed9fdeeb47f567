//! Scripted stand-in for the remote service.
//!
//! Each endpoint has a FIFO of replies. A reply may carry a [`Gate`]: the
//! call then signals that it has started and blocks until the test
//! releases it, so a test controls the order responses arrive in.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use phishguard::api::{ApiError, Credentials, LoginResponse, RiskApi};
use phishguard::models::{EntryKind, HistoryEntry, Stats, TextAnalysis, UrlAnalysis};
use phishguard::store::{LocalStore, MemoryStore};
use phishguard::PhishGuardClient;

const GATE_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

/// Held by the scripted reply.
pub struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Held by the test.
pub struct GateHandle {
    entered: Receiver<()>,
    release: Sender<()>,
}

pub fn gate() -> (Gate, GateHandle) {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    (
        Gate {
            entered: entered_tx,
            release: release_rx,
        },
        GateHandle {
            entered: entered_rx,
            release: release_tx,
        },
    )
}

impl Gate {
    fn pass(self) {
        let _ = self.entered.send(());
        let _ = self.release.recv_timeout(GATE_TIMEOUT);
    }
}

impl GateHandle {
    /// Block until the gated call has started.
    pub fn wait_entered(&self) {
        self.entered
            .recv_timeout(GATE_TIMEOUT)
            .expect("gated call never started");
    }

    pub fn release(&self) {
        let _ = self.release.send(());
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

struct Reply<T> {
    result: Result<T, ApiError>,
    gate: Option<Gate>,
}

struct Queue<T>(Mutex<VecDeque<Reply<T>>>);

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self(Mutex::new(VecDeque::new()))
    }
}

impl<T> Queue<T> {
    fn push(&self, result: Result<T, ApiError>, gate: Option<Gate>) {
        self.0.lock().unwrap().push_back(Reply { result, gate });
    }

    /// Pop the next reply, waiting at its gate if it has one. The lock is
    /// released before waiting.
    fn next(&self, fallback: impl FnOnce() -> Result<T, ApiError>) -> Result<T, ApiError> {
        let reply = self.0.lock().unwrap().pop_front();
        match reply {
            Some(Reply { result, gate }) => {
                if let Some(gate) = gate {
                    gate.pass();
                }
                result
            }
            None => fallback(),
        }
    }
}

fn unscripted<T>(endpoint: &str) -> Result<T, ApiError> {
    Err(ApiError::Transport(format!("no scripted reply for {endpoint}")))
}

// ---------------------------------------------------------------------------
// ScriptedApi
// ---------------------------------------------------------------------------

/// Unscripted `history`, `stats`, `logout`, `signup`, and `clear_history`
/// calls succeed with empty data; the rest fail with a transport error.
#[derive(Default)]
pub struct ScriptedApi {
    signup: Queue<()>,
    login: Queue<LoginResponse>,
    logout: Queue<()>,
    validate: Queue<String>,
    history: Queue<Vec<HistoryEntry>>,
    clear_history: Queue<()>,
    stats: Queue<Stats>,
    analyze_text: Queue<TextAnalysis>,
    analyze_url: Queue<UrlAnalysis>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_signup(&self, result: Result<(), ApiError>) {
        self.signup.push(result, None);
    }

    pub fn on_login(&self, result: Result<LoginResponse, ApiError>) {
        self.login.push(result, None);
    }

    pub fn on_logout(&self, result: Result<(), ApiError>) {
        self.logout.push(result, None);
    }

    pub fn on_validate(&self, result: Result<String, ApiError>) {
        self.validate.push(result, None);
    }

    pub fn on_history(&self, result: Result<Vec<HistoryEntry>, ApiError>) {
        self.history.push(result, None);
    }

    pub fn on_history_gated(&self, result: Result<Vec<HistoryEntry>, ApiError>) -> GateHandle {
        let (gate, handle) = gate();
        self.history.push(result, Some(gate));
        handle
    }

    pub fn on_clear_history(&self, result: Result<(), ApiError>) {
        self.clear_history.push(result, None);
    }

    pub fn on_stats(&self, result: Result<Stats, ApiError>) {
        self.stats.push(result, None);
    }

    pub fn on_stats_gated(&self, result: Result<Stats, ApiError>) -> GateHandle {
        let (gate, handle) = gate();
        self.stats.push(result, Some(gate));
        handle
    }

    pub fn on_analyze_text(&self, result: Result<TextAnalysis, ApiError>) {
        self.analyze_text.push(result, None);
    }

    pub fn on_analyze_url(&self, result: Result<UrlAnalysis, ApiError>) {
        self.analyze_url.push(result, None);
    }

    pub fn on_analyze_url_gated(&self, result: Result<UrlAnalysis, ApiError>) -> GateHandle {
        let (gate, handle) = gate();
        self.analyze_url.push(result, Some(gate));
        handle
    }

    pub fn on_analyze_text_gated(&self, result: Result<TextAnalysis, ApiError>) -> GateHandle {
        let (gate, handle) = gate();
        self.analyze_text.push(result, Some(gate));
        handle
    }

    /// Calls made so far, as `endpoint token-or-username`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls to `endpoint`.
    pub fn count(&self, endpoint: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(endpoint))
            .count()
    }

    fn record(&self, endpoint: &str, arg: &str) {
        self.calls.lock().unwrap().push(format!("{endpoint} {arg}"));
    }
}

impl RiskApi for ScriptedApi {
    fn signup(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.record("signup", &credentials.username);
        self.signup.next(|| Ok(()))
    }

    fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.record("login", &credentials.username);
        self.login.next(|| unscripted("login"))
    }

    fn logout(&self, token: &str) -> Result<(), ApiError> {
        self.record("logout", token);
        self.logout.next(|| Ok(()))
    }

    fn validate_token(&self, token: &str) -> Result<String, ApiError> {
        self.record("validate", token);
        self.validate.next(|| unscripted("validate"))
    }

    fn history(&self, token: &str) -> Result<Vec<HistoryEntry>, ApiError> {
        self.record("history", token);
        self.history.next(|| Ok(Vec::new()))
    }

    fn clear_history(&self, token: &str) -> Result<(), ApiError> {
        self.record("clear_history", token);
        self.clear_history.next(|| Ok(()))
    }

    fn stats(&self, token: &str) -> Result<Stats, ApiError> {
        self.record("stats", token);
        self.stats.next(|| Ok(Stats::default()))
    }

    fn analyze_text(&self, token: &str, _text: &str) -> Result<TextAnalysis, ApiError> {
        self.record("analyze_text", token);
        self.analyze_text.next(|| unscripted("analyze_text"))
    }

    fn analyze_url(&self, token: &str, _url: &str) -> Result<UrlAnalysis, ApiError> {
        self.record("analyze_url", token);
        self.analyze_url.next(|| unscripted("analyze_url"))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn client(api: &Arc<ScriptedApi>, store: &Arc<MemoryStore>) -> PhishGuardClient {
    let api: Arc<dyn RiskApi> = api.clone();
    let store: Arc<dyn LocalStore> = store.clone();
    PhishGuardClient::new(api, store, true)
}

pub fn login_ok(token: &str, username: &str) -> Result<LoginResponse, ApiError> {
    Ok(LoginResponse {
        token: token.to_string(),
        username: username.to_string(),
    })
}

pub fn entry(input: &str, verdict: &str) -> HistoryEntry {
    HistoryEntry {
        kind: EntryKind::Text,
        verdict: verdict.to_string(),
        percentage: None,
        input: input.to_string(),
        timestamp: "2024-05-01 10:00:00".to_string(),
    }
}

pub fn stats(total: u64) -> Stats {
    Stats {
        total,
        avg_risk: 40.0,
        safe: 50.0,
        suspicious: 25.0,
        phishing: 25.0,
    }
}

pub fn unauthorized() -> ApiError {
    ApiError::Unauthorized(Some("invalid or expired token".to_string()))
}
