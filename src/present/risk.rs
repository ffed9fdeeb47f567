/// Risk score to visual state: severity bucket, gradient color, arrow.
///
/// | Percentage   | Level   |
/// |--------------|---------|
/// | `p <= 33`    | Safe    |
/// | `33 < p <= 66` | Warning |
/// | `p > 66`     | Danger  |
///
/// URL results carry no percentage; their verdict is mapped to a
/// representative score first ([`fallback_percentage`]).
use std::fmt;

/// Verdict the service uses for a clean URL.
pub const VERDICT_SAFE: &str = "Segura";

/// Verdict the service uses for a malicious URL.
pub const VERDICT_MALICIOUS: &str = "Maliciosa";

/// Verdict some text analyses use for phishing content.
pub const VERDICT_PHISHING: &str = "Phishing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Safe,
    Warning,
    Danger,
}

impl RiskLevel {
    /// Bucket a percentage. Monotonic in `p`.
    pub fn from_percentage(p: f64) -> Self {
        if p > 66.0 {
            Self::Danger
        } else if p > 33.0 {
            Self::Warning
        } else {
            Self::Safe
        }
    }

    /// Tone of a history row, judged from its verdict alone.
    pub fn from_verdict(verdict: &str) -> Self {
        match verdict {
            VERDICT_MALICIOUS | VERDICT_PHISHING => Self::Danger,
            VERDICT_SAFE => Self::Safe,
            _ => Self::Warning,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Warning => write!(f, "warning"),
            Self::Danger => write!(f, "danger"),
        }
    }
}

/// Representative score for a verdict without a percentage.
pub fn fallback_percentage(verdict: &str) -> f64 {
    match verdict {
        VERDICT_SAFE => 10.0,
        VERDICT_MALICIOUS => 90.0,
        _ => 50.0,
    }
}

/// Reported percentage, or the verdict fallback when absent.
pub fn effective_percentage(percentage: Option<f64>, verdict: &str) -> f64 {
    percentage.unwrap_or_else(|| fallback_percentage(verdict))
}

/// Horizontal arrow position on the 0..=100 risk bar.
pub fn arrow_position(p: f64) -> f64 {
    p.clamp(0.0, 100.0)
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Two-segment linear gradient anchored at 50.
///
/// `p <= 50`: green held at 255, red rises 0 → 255.
/// `p > 50`: red held at 255, green falls 255 → 0.
/// Input is clamped to `[0, 100]`; blue is always 0.
pub fn risk_gradient(p: f64) -> Rgb {
    let p = p.clamp(0.0, 100.0);
    let (r, g) = if p <= 50.0 {
        (255.0 * p / 50.0, 255.0)
    } else {
        (255.0, 255.0 * (100.0 - p) / 50.0)
    };
    Rgb {
        r: r.round() as u8,
        g: g.round() as u8,
        b: 0,
    }
}
