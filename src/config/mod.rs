/// Configuration system for the phishguard client.
///
/// Layered, later layers win at the field level:
///
/// 1. **Built-in defaults**: [`schema::ClientConfig::default()`]
/// 2. **User global config**: `~/.phishguard/config.toml`
/// 3. **Project local config**: `.phishguard.toml` in the working directory
/// 4. **Environment variables**: `PHISHGUARD_*` overrides
///
/// The data directory (`~/.phishguard` unless `PHISHGUARD_HOME` is set)
/// also holds the session store and the diagnostic log.
///
/// # Usage
///
/// ```rust,ignore
/// let cfg = phishguard::config::load();
/// let client = PhishGuardClient::from_config(&cfg);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::ClientConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
pub fn load() -> ClientConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_value(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config: ClientConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config);
    config
}

/// Read a TOML file as an untyped value.
///
/// Missing or malformed files are ignored; a broken config file must not
/// lock the user out of the client.
fn load_toml_value(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Overlay `layer` onto `base`, table by table. Only keys present in the
/// layer are replaced, so a project file can change a single setting
/// without resetting the rest of the global file.
fn merge_values(base: &mut toml::Value, layer: toml::Value) {
    match (base, layer) {
        (toml::Value::Table(base_table), toml::Value::Table(layer_table)) => {
            for (key, value) in layer_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding config, session store, and log.
pub fn data_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("PHISHGUARD_HOME")
        && !home.is_empty()
    {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".phishguard"))
}

/// `<data dir>/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("config.toml"))
}

/// `.phishguard.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".phishguard.toml"))
}

pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Session store location: explicit `session.store_path`, else
/// `<data dir>/session.json`.
pub fn store_path(config: &ClientConfig) -> Option<PathBuf> {
    config
        .session
        .store_path
        .clone()
        .or_else(|| data_dir().map(|dir| dir.join("session.json")))
}

/// Log location, or `None` when logging is disabled.
pub fn log_path(config: &ClientConfig) -> Option<PathBuf> {
    if !config.logging.enabled {
        return None;
    }
    data_dir().map(|dir| dir.join("client.log"))
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PHISHGUARD_URL`: service base URL
/// - `PHISHGUARD_TIMEOUT_MS`: request timeout (`0` clears it)
/// - `PHISHGUARD_VALIDATE`: validate the token on restore (`1`/`true`/...)
/// - `PHISHGUARD_LOG`: enable the diagnostic log
fn apply_env_overrides(config: &mut ClientConfig) {
    if let Ok(val) = std::env::var("PHISHGUARD_URL")
        && !val.is_empty()
    {
        config.server.base_url = val;
    }
    if let Ok(val) = std::env::var("PHISHGUARD_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.server.timeout_ms = (ms > 0).then_some(ms);
    }
    if let Ok(val) = std::env::var("PHISHGUARD_VALIDATE") {
        config.session.validate_on_restore = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PHISHGUARD_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / show
// ---------------------------------------------------------------------------

/// Write the annotated default config to `<data dir>/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    fs::write(&path, ClientConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a dotted key (e.g. `server.base_url`) in the global config file.
///
/// Starts from the existing file, or from the serialized defaults when
/// there is none, and keeps the value type of the key being replaced.
pub fn set_config_value(key: &str, value: &str) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config file")?
    } else {
        let defaults = toml::to_string_pretty(&ClientConfig::default())
            .context("failed to serialize default config")?;
        toml::from_str(&defaults).context("failed to parse serialized defaults")?
    };

    set_toml_value(&mut root, key, value)?;

    // Reject edits that would no longer load.
    let _: ClientConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(path)
}

/// Set a value in a TOML tree using a dotted key path.
///
/// The section must exist; the leaf may be new (optional keys such as
/// `server.timeout_ms` are absent from the defaults).
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section_path, leaf)) = key.rsplit_once('.') else {
        anyhow::bail!("config key must be 'section.key', got '{key}'");
    };

    let mut current = root;
    for part in section_path.split('.') {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current
        .as_table_mut()
        .with_context(|| format!("expected table at '{section_path}'"))?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => toml::Value::Integer(
            raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?,
        ),
        _ => match raw_value.parse::<i64>() {
            Ok(n) if leaf.ends_with("_ms") => toml::Value::Integer(n),
            _ => toml::Value::String(raw_value.to_string()),
        },
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    toml::to_string_pretty(&load()).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
