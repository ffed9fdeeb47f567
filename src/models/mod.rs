/// Data model shared by the session, synchronization, and presentation layers.
///
/// Everything here mirrors what the risk-analysis service sends over the
/// wire. The client never mutates received values: history and statistics
/// are replaced wholesale on every fetch, analysis results are superseded by
/// the next analysis.
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The authenticated identity held by the client.
///
/// Token and username always travel together; there is no way to build a
/// `Session` with only one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            username: username.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Kind of content an analysis was run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Free text. The service spells this `"texto"`.
    #[serde(alias = "texto")]
    Text,
    Url,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Url => write!(f, "url"),
        }
    }
}

/// One row of the user's analysis history, in server insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub verdict: String,
    /// Only text analyses carry a numeric score.
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregate risk statistics for the current user.
///
/// `Default` is the all-zero snapshot shown when logged out or after a
/// failed fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total: u64,
    pub avg_risk: f64,
    pub safe: f64,
    pub suspicious: f64,
    pub phishing: f64,
}

// ---------------------------------------------------------------------------
// Analysis results
// ---------------------------------------------------------------------------

/// Per-URL finding embedded in a text analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlFinding {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub verdict: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub combined_verdict: String,
    pub percentage: f64,
    #[serde(default)]
    pub url_results: Vec<UrlFinding>,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Verdict reported by one scoring provider for a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderVerdict {
    pub verdict: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Breakdown of the providers consulted for a URL analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlDetails {
    pub heuristic: Option<ProviderVerdict>,
    pub safe_browsing: Option<ProviderVerdict>,
    pub gemini: Option<ProviderVerdict>,
}

impl UrlDetails {
    /// Providers that produced a verdict, labelled for display.
    pub fn providers(&self) -> Vec<(&'static str, &ProviderVerdict)> {
        [
            ("heuristic", self.heuristic.as_ref()),
            ("safe browsing", self.safe_browsing.as_ref()),
            ("gemini", self.gemini.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, verdict)| verdict.map(|v| (name, v)))
        .collect()
    }
}

/// Response of `POST /analyze_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub verdict: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub details: Option<UrlDetails>,
}

/// Result of a single analysis, as rendered in the result panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalysisResult {
    Text(TextAnalysis),
    Url(UrlAnalysis),
}

impl AnalysisResult {
    /// Headline verdict regardless of variant.
    pub fn verdict(&self) -> &str {
        match self {
            Self::Text(t) => &t.combined_verdict,
            Self::Url(u) => &u.verdict,
        }
    }

    /// Numeric risk reported by the service, if any.
    pub fn percentage(&self) -> Option<f64> {
        match self {
            Self::Text(t) => Some(t.percentage),
            Self::Url(_) => None,
        }
    }

    /// Human-readable reasons, one per line.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            Self::Text(t) => t.reasons.clone(),
            Self::Url(u) if u.reason.is_empty() => Vec::new(),
            Self::Url(u) => vec![u.reason.clone()],
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entry_accepts_spanish_text_kind() {
        let json = r#"{"type":"texto","input":"hola","verdict":"Segura","percentage":12,"timestamp":"2024-05-01 10:00:00"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, EntryKind::Text);
        assert_eq!(entry.percentage, Some(12.0));
    }

    #[test]
    fn history_entry_url_without_percentage() {
        let json = r#"{"type":"url","input":"http://a.b","verdict":"Maliciosa","percentage":null,"timestamp":"t"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.kind, EntryKind::Url);
        assert_eq!(entry.percentage, None);
    }

    #[test]
    fn stats_missing_fields_default_to_zero() {
        let stats: Stats = serde_json::from_str(r#"{"total": 3}"#).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.avg_risk, 0.0);
    }

    #[test]
    fn url_analysis_parses_provider_details() {
        let json = r#"{
            "verdict": "Maliciosa",
            "reason": "blacklisted",
            "details": {
                "heuristic": {"verdict": "Sospechosa", "score": 40, "reason": "ip host"},
                "safe_browsing": null,
                "gemini": null
            },
            "provider_tried": {"heuristic": true, "gemini": false, "google_safe_browsing": false}
        }"#;
        let parsed: UrlAnalysis = serde_json::from_str(json).unwrap();
        let details = parsed.details.unwrap();
        let providers = details.providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].0, "heuristic");
        assert_eq!(providers[0].1.score, Some(40.0));
    }

    #[test]
    fn analysis_result_accessors() {
        let url = AnalysisResult::Url(UrlAnalysis {
            verdict: "Segura".to_string(),
            reason: String::new(),
            details: None,
        });
        assert_eq!(url.verdict(), "Segura");
        assert_eq!(url.percentage(), None);
        assert!(url.reasons().is_empty());
    }
}
