//! Persisted user settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::Mode;

/// Colour theme of the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark background
    Dark,
    /// Light background
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{}' (expected dark or light)", other)),
        }
    }
}

/// User settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Colour theme
    pub theme: Theme,
    /// Default translation mode
    pub mode: Mode,
    /// Default provider identifier
    pub engine: String,
    /// Meter characters sent to the metered provider
    pub limit_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            mode: Mode::QuotesOnly,
            engine: "google".to_string(),
            limit_enabled: true,
        }
    }
}

type PersistHook = Box<dyn FnMut(&Settings) + Send>;

/// Owns the current settings and writes them back whenever they change
pub struct SettingsStore {
    path: PathBuf,
    current: Settings,
    on_change: Option<PersistHook>,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("path", &self.path)
            .field("current", &self.current)
            .finish()
    }
}

impl SettingsStore {
    /// Read settings from `path`. Missing or unreadable files give defaults.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let current = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Settings::default()
            }),
            Err(_) => {
                debug!("No settings at {}, using defaults", path.display());
                Settings::default()
            }
        };

        Self {
            path,
            current,
            on_change: None,
        }
    }

    /// Register a callback run after each persisted change
    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Settings) + Send + 'static,
    {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// Settings file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current settings
    pub fn get(&self) -> &Settings {
        &self.current
    }

    /// Apply `change` and persist if anything differs. Returns whether the
    /// settings changed.
    pub fn update<F>(&mut self, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Settings),
    {
        let mut next = self.current.clone();
        change(&mut next);
        if next == self.current {
            return Ok(false);
        }

        self.current = next;
        self.persist()?;
        if let Some(hook) = self.on_change.as_mut() {
            hook(&self.current);
        }
        info!("Settings updated");
        Ok(true)
    }

    /// Write the current settings to disk
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.path, content).map_err(|e| TranslationError::FileError {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}
