//! Append-only diagnostic log: `<data dir>/client.log`.
//!
//! One line per event: RFC 3339 timestamp, level, component, message.
//! Best-effort: I/O failures are ignored.
//!
//! Logging is off until [`init`] is called. The binary calls it at startup;
//! library users and tests leave it off and nothing is written.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::Utc;

static LOG_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
        }
    }
}

/// Enable logging to `path`, or keep it disabled with `None`.
///
/// Only the first call takes effect.
pub fn init(path: Option<PathBuf>) {
    let _ = LOG_PATH.set(path);
}

/// Path of the active log file, if logging is enabled.
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get().and_then(Option::as_ref)
}

pub fn info(component: &str, message: &str) {
    log(Level::Info, component, message);
}

pub fn warn(component: &str, message: &str) {
    log(Level::Warn, component, message);
}

pub fn log(level: Level, component: &str, message: &str) {
    let Some(path) = log_path() else {
        return;
    };

    if let Some(parent) = path.parent() {
        if create_dir_all(parent).is_err() {
            return;
        }
    }

    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let _ = writeln!(file, "{}", format_line(level, component, message));
}

fn format_line(level: Level, component: &str, message: &str) -> String {
    let message = message.replace(['\r', '\n'], " ");
    format!(
        "{} {} [{}] {}",
        Utc::now().to_rfc3339(),
        level.as_str(),
        component,
        message
    )
}
