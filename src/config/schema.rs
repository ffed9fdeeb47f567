/// Configuration schema and defaults for the phishguard client.
///
/// Sections: `[server]`, `[session]`, `[logging]`. Every field has a
/// built-in default; config files only need the keys they change.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default address of the risk-analysis service.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level client configuration, as read from `~/.phishguard/config.toml`
/// and `.phishguard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Where and how to reach the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: String,
    /// Overall request timeout. Unset means the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [session]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Check a restored token with `GET /validate-token` at startup.
    pub validate_on_restore: bool,
    /// Override for the session store file (default `<data dir>/session.json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            validate_on_restore: true,
            store_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write `<data dir>/client.log`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ClientConfig {
    /// Annotated default config written by `phishguard config init`.
    pub fn default_toml() -> &'static str {
        r#"# phishguard client configuration
#
# Precedence (later wins): built-in defaults, this file,
# .phishguard.toml in the working directory, PHISHGUARD_* env vars.

[server]
# Risk-analysis service. Env: PHISHGUARD_URL
base_url = "http://127.0.0.1:8000"
# Request timeout in milliseconds; transport default when unset.
# Env: PHISHGUARD_TIMEOUT_MS
# timeout_ms = 15000

[session]
# Confirm a stored token with GET /validate-token at startup.
# Env: PHISHGUARD_VALIDATE
validate_on_restore = true
# store_path = "/path/to/session.json"

[logging]
# Append diagnostics to client.log in the data directory.
# Env: PHISHGUARD_LOG
enabled = true
"#
    }
}
