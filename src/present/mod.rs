/// Presentation mapper: server data to display-ready values.
///
/// Pure functions only. [`render`] derives the whole [`UiState`] from the
/// session state and a resource snapshot; with no session every panel is
/// in its empty form regardless of what the snapshot holds.
pub mod risk;
pub mod text;

use crate::error::ClientError;
use crate::models::{AnalysisResult, EntryKind, HistoryEntry, Stats, UrlDetails};
use crate::session::SessionState;
use crate::state::ResourceSnapshot;
use crate::store::theme::Theme;

use risk::{Rgb, RiskLevel};

/// Label of the auth control when logged out.
pub const LOGIN_LABEL: &str = "Login";

/// Label of the auth control when logged in.
pub const LOGOUT_LABEL: &str = "Logout";

/// Placeholder shown when the history list is empty.
pub const EMPTY_HISTORY: &str = "No history";

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// Everything the UI layer needs to draw the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub logged_in: bool,
    /// Username shown next to the auth control; empty when logged out.
    pub username: String,
    /// `Login` or `Logout`.
    pub auth_control: &'static str,
    /// Confirmed by the server (login or token validation).
    pub verified: bool,
    /// Most recent first.
    pub history: Vec<HistoryRow>,
    pub kpis: Kpis,
    pub result: Option<ResultPanel>,
    pub theme: Theme,
}

impl UiState {
    /// Placeholder text when there are no rows.
    pub fn history_placeholder(&self) -> Option<&'static str> {
        self.history.is_empty().then_some(EMPTY_HISTORY)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub kind: EntryKind,
    pub verdict: String,
    pub tone: RiskLevel,
    /// Truncated and markup-escaped input.
    pub input: String,
    pub timestamp: String,
}

/// KPI strings, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpis {
    pub total: String,
    pub avg_risk: String,
    pub safe: String,
    pub suspicious: String,
    pub phishing: String,
}

impl Default for Kpis {
    fn default() -> Self {
        kpis(&Stats::default())
    }
}

/// Last analysis result, as shown in the result panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPanel {
    pub verdict: String,
    pub reasons: Vec<String>,
    /// Reported or verdict-derived percentage.
    pub percentage: f64,
    pub level: RiskLevel,
    pub background: Rgb,
    pub arrow_position: f64,
    /// e.g. `90% risk`.
    pub label: String,
    /// URLs found inside an analyzed text, with their verdicts.
    pub url_findings: Vec<String>,
    /// Per-provider verdicts of a URL analysis.
    pub providers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Derive the UI state. Logged out means empty panels.
pub fn render(session: &SessionState, snapshot: &ResourceSnapshot, theme: Theme) -> UiState {
    let Some(current) = session.session() else {
        return UiState {
            logged_in: false,
            username: String::new(),
            auth_control: LOGIN_LABEL,
            verified: false,
            history: Vec::new(),
            kpis: Kpis::default(),
            result: None,
            theme,
        };
    };

    UiState {
        logged_in: true,
        username: text::display_text(&current.username),
        auth_control: LOGOUT_LABEL,
        verified: session.is_verified(),
        history: history_rows(&snapshot.history),
        kpis: kpis(&snapshot.stats),
        result: snapshot.last_result.as_ref().map(result_panel),
        theme,
    }
}

/// History rows, most recent first.
pub fn history_rows(entries: &[HistoryEntry]) -> Vec<HistoryRow> {
    entries
        .iter()
        .rev()
        .map(|entry| HistoryRow {
            kind: entry.kind,
            verdict: text::display_text(&entry.verdict),
            tone: RiskLevel::from_verdict(&entry.verdict),
            input: text::history_input(&entry.input),
            timestamp: text::display_text(&entry.timestamp),
        })
        .collect()
}

pub fn kpis(stats: &Stats) -> Kpis {
    Kpis {
        total: stats.total.to_string(),
        avg_risk: format_pct(stats.avg_risk),
        safe: format_pct(stats.safe),
        suspicious: format_pct(stats.suspicious),
        phishing: format_pct(stats.phishing),
    }
}

pub fn result_panel(result: &AnalysisResult) -> ResultPanel {
    let percentage = risk::effective_percentage(result.percentage(), result.verdict());

    let url_findings = match result {
        AnalysisResult::Text(text) => text
            .url_results
            .iter()
            .map(|finding| {
                let line = format!(
                    "{}: {}{}",
                    finding.url.as_deref().unwrap_or("?"),
                    finding.verdict.as_deref().unwrap_or("?"),
                    finding
                        .reason
                        .as_deref()
                        .map(|r| format!(" ({r})"))
                        .unwrap_or_default()
                );
                text::display_text(&line)
            })
            .collect(),
        AnalysisResult::Url(_) => Vec::new(),
    };

    let providers = match result {
        AnalysisResult::Url(url) => url
            .details
            .as_ref()
            .map(provider_lines)
            .unwrap_or_default(),
        AnalysisResult::Text(_) => Vec::new(),
    };

    ResultPanel {
        reasons: result
            .reasons()
            .iter()
            .map(|reason| text::display_text(reason))
            .collect(),
        level: RiskLevel::from_percentage(percentage),
        background: risk::risk_gradient(percentage),
        arrow_position: risk::arrow_position(percentage),
        label: format!("{} risk", format_pct(percentage)),
        percentage,
        verdict: text::display_text(result.verdict()),
        url_findings,
        providers,
    }
}

fn provider_lines(details: &UrlDetails) -> Vec<String> {
    details
        .providers()
        .into_iter()
        .map(|(name, verdict)| {
            let shown = text::display_text(&verdict.verdict);
            match verdict.score {
                Some(score) => format!("{name}: {shown} ({})", format_pct(score)),
                None => format!("{name}: {shown}"),
            }
        })
        .collect()
}

/// `42%` for whole numbers, `42.5%` otherwise.
pub fn format_pct(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}%")
    } else {
        format!("{value:.1}%")
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient, non-blocking message for the user. Messages may quote
/// server text, so control characters are made inert on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: text::escape_controls(&message.into()),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: text::escape_controls(&message.into()),
        }
    }

    pub fn error(err: &ClientError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: text::escape_controls(&err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
