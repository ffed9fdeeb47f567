/// Dependent-resource synchronization: history and stats.
///
/// [`Synchronizer::sync_all`] fetches both resources concurrently for the
/// current token and commits them together through the [`Resources`]
/// fence. Overlapping calls are safe: only the most recently issued sync
/// may commit, older completions are dropped as
/// [`SyncOutcome::Superseded`].
///
/// Failure policy:
///
/// - a `401` from either fetch tears the session down and fails the whole
///   sync with [`ClientError::SessionExpired`], unless the sync was
///   already superseded;
/// - any other failure resets only the affected resource to its empty form
///   and is reported in the [`SyncReport`], not raised.
use std::fmt;
use std::sync::Arc;
use std::thread;

use crate::api::{ApiError, RiskApi};
use crate::error::ClientError;
use crate::logging;
use crate::session::SessionManager;
use crate::state::Resources;

const COMPONENT: &str = "sync";

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// What happened to one resource during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceStatus {
    /// Fresh server data was applied.
    Fresh,
    /// The fetch failed; the resource now shows its empty form.
    Reset(String),
}

impl ResourceStatus {
    fn from_result<T>(result: &Result<T, ApiError>) -> Self {
        match result {
            Ok(_) => Self::Fresh,
            Err(err) => Self::Reset(err.to_string()),
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Per-resource result of an applied sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub history: ResourceStatus,
    pub stats: ResourceStatus,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.history.is_fresh() && self.stats.is_fresh()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No session: resources were reset to empty.
    NoSession,
    /// Results were committed.
    Applied(SyncReport),
    /// A newer sync (or a teardown) was issued meanwhile; results dropped.
    Superseded,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "no session"),
            Self::Applied(report) if report.is_complete() => write!(f, "applied"),
            Self::Applied(_) => write!(f, "applied (partial)"),
            Self::Superseded => write!(f, "superseded"),
        }
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

pub struct Synchronizer {
    api: Arc<dyn RiskApi>,
    sessions: Arc<SessionManager>,
    resources: Arc<Resources>,
}

impl Synchronizer {
    pub fn new(
        api: Arc<dyn RiskApi>,
        sessions: Arc<SessionManager>,
        resources: Arc<Resources>,
    ) -> Self {
        Self {
            api,
            sessions,
            resources,
        }
    }

    /// Refresh history and stats for the current session.
    pub fn sync_all(&self) -> Result<SyncOutcome, ClientError> {
        let ticket = self.resources.issue();

        let Some(token) = self.sessions.current_token() else {
            self.resources.commit(ticket, None, None);
            return Ok(SyncOutcome::NoSession);
        };

        // Both requests are in flight at once; the stats fetch runs on the
        // calling thread while history runs on a scoped worker.
        let (history, stats) = thread::scope(|scope| {
            let history = scope.spawn(|| self.api.history(&token));
            let stats = self.api.stats(&token);
            let history = history
                .join()
                .unwrap_or_else(|_| Err(ApiError::Transport("history fetch panicked".into())));
            (history, stats)
        });

        let unauthorized = matches!(&history, Err(err) if err.is_unauthorized())
            || matches!(&stats, Err(err) if err.is_unauthorized());
        if unauthorized {
            if !self.resources.is_current(ticket) {
                logging::info(COMPONENT, "ignored 401 from a stale sync");
                return Ok(SyncOutcome::Superseded);
            }
            logging::warn(COMPONENT, "authorization refused during sync");
            return Err(self.sessions.expire(&token));
        }

        let report = SyncReport {
            history: ResourceStatus::from_result(&history),
            stats: ResourceStatus::from_result(&stats),
        };

        if !self.resources.commit(ticket, history.ok(), stats.ok()) {
            logging::info(
                COMPONENT,
                &format!("dropped stale sync #{}", ticket.sequence()),
            );
            return Ok(SyncOutcome::Superseded);
        }

        if let ResourceStatus::Reset(reason) = &report.history {
            logging::warn(COMPONENT, &format!("history unavailable: {reason}"));
        }
        if let ResourceStatus::Reset(reason) = &report.stats {
            logging::warn(COMPONENT, &format!("stats unavailable: {reason}"));
        }

        Ok(SyncOutcome::Applied(report))
    }

    /// Delete the user's history on the server and clear it locally.
    pub fn clear_history(&self) -> Result<(), ClientError> {
        let token = self
            .sessions
            .current_token()
            .ok_or(ClientError::Unauthenticated)?;

        match self.api.clear_history(&token) {
            Ok(()) => {
                self.resources.clear_history();
                logging::info(COMPONENT, "history cleared");
                Ok(())
            }
            Err(ApiError::Unauthorized(_)) => Err(self.sessions.expire(&token)),
            Err(err) => Err(ClientError::from_transport(err)
                .unwrap_or_else(|err| ClientError::Rejected(err.to_string()))),
        }
    }
}
