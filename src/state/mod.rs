//! Session-dependent resources and the stale-completion fence.
//!
//! History, statistics, and the last analysis result live in one
//! [`Resources`] value behind a single mutex, so history and stats are
//! always replaced together. Every synchronization first takes a
//! [`SyncTicket`]; a commit is accepted only while its ticket is still the
//! latest one issued. [`Resources::reset`] also issues a ticket, which
//! makes every in-flight sync stale the moment the session is torn down.
//!
//! The last result has its own fence: [`Resources::reset`] also advances a
//! [`SessionEpoch`], and [`Resources::set_result_if`] only writes while the
//! epoch captured before the analysis is still current. Syncs and history
//! clears do not advance it.

use std::sync::{Mutex, MutexGuard};

use crate::models::{AnalysisResult, HistoryEntry, Stats};

/// Point-in-time copy of the dependent resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSnapshot {
    /// Server insertion order (oldest first).
    pub history: Vec<HistoryEntry>,
    pub stats: Stats,
    pub last_result: Option<AnalysisResult>,
}

/// Sequence number of one synchronization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SyncTicket(u64);

impl SyncTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Count of session resets; a result is only valid within its epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionEpoch(u64);

#[derive(Debug, Default)]
struct Inner {
    issued: u64,
    epoch: u64,
    snapshot: ResourceSnapshot,
}

#[derive(Debug, Default)]
pub struct Resources {
    inner: Mutex<Inner>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue a ticket newer than every ticket issued before.
    pub fn issue(&self) -> SyncTicket {
        let mut inner = self.lock();
        inner.issued += 1;
        SyncTicket(inner.issued)
    }

    /// Whether `ticket` is still the latest issued.
    pub fn is_current(&self, ticket: SyncTicket) -> bool {
        self.lock().issued == ticket.0
    }

    /// Replace history and stats together if `ticket` is still current.
    ///
    /// `None` stands for a failed fetch and resets that resource to its
    /// empty form. Returns `false` when the ticket is stale and nothing
    /// was written.
    pub fn commit(
        &self,
        ticket: SyncTicket,
        history: Option<Vec<HistoryEntry>>,
        stats: Option<Stats>,
    ) -> bool {
        let mut inner = self.lock();
        if inner.issued != ticket.0 {
            return false;
        }
        inner.snapshot.history = history.unwrap_or_default();
        inner.snapshot.stats = stats.unwrap_or_default();
        true
    }

    /// Clear history and stats, keeping the last result, and invalidate
    /// in-flight syncs.
    pub fn clear_history(&self) {
        let mut inner = self.lock();
        inner.issued += 1;
        inner.snapshot.history.clear();
        inner.snapshot.stats = Stats::default();
    }

    /// Clear everything and invalidate in-flight syncs and analyses.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.issued += 1;
        inner.epoch += 1;
        inner.snapshot = ResourceSnapshot::default();
    }

    /// Epoch to capture before starting an analysis.
    pub fn epoch(&self) -> SessionEpoch {
        SessionEpoch(self.lock().epoch)
    }

    /// Store `result` if no reset happened since `epoch` was taken.
    /// Returns `false` and writes nothing otherwise.
    pub fn set_result_if(&self, epoch: SessionEpoch, result: AnalysisResult) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch.0 {
            return false;
        }
        inner.snapshot.last_result = Some(result);
        true
    }

    pub fn clear_result(&self) {
        self.lock().snapshot.last_result = None;
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        self.lock().snapshot.clone()
    }
}
