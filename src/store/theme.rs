//! Theme preference, stored independently of the session.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{LocalStore, THEME_KEY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Light goes to dark; anything else goes to light.
    pub fn toggled(current: Option<Self>) -> Self {
        match current {
            Some(Self::Light) => Self::Dark,
            _ => Self::Light,
        }
    }

    /// Saved preference, if any. Unknown values read as unset.
    pub fn load(store: &dyn LocalStore) -> Option<Self> {
        store.get(THEME_KEY).and_then(|v| Self::parse(&v))
    }

    pub fn save(self, store: &dyn LocalStore) -> Result<()> {
        store.put(THEME_KEY, &self.to_string())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}
