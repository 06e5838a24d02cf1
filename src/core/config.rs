//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TRANSLATOR_DATA_DIR";

/// Prefix for backend credential overrides, e.g.
/// `TRANSLATOR__PROVIDERS__DEEPL__API_KEY`
pub const BACKEND_ENV_PREFIX: &str = "TRANSLATOR";

/// Locations of every file the translator reads or writes
#[derive(Debug, Clone)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    /// Paths under `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Explicit directory first, then `TRANSLATOR_DATA_DIR`, then the
    /// working directory
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        let root = explicit
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        debug!("Using data directory {}", root.display());
        Self::new(root)
    }

    /// Data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `settings.json`
    pub fn settings(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    /// `usage.json`
    pub fn usage(&self) -> PathBuf {
        self.root.join("usage.json")
    }

    /// `config.json` holding provider credentials
    pub fn backend_config(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Directory of daily translation logs
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

/// Credentials for one provider. Which fields matter depends on the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    /// DeepL authentication key
    #[serde(default)]
    pub api_key: Option<String>,
    /// Lingvanex bearer token
    #[serde(default)]
    pub token: Option<String>,
    /// Microsoft subscription key
    #[serde(default)]
    pub subscription_key: Option<String>,
    /// Microsoft resource region
    #[serde(default)]
    pub region: Option<String>,
    /// Overrides the provider's default URL
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl ProviderCredentials {
    /// Non-empty value of an optional field
    pub fn field<'a>(value: &'a Option<String>) -> Option<&'a str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Backend configuration: credentials keyed by provider identifier
///
/// ```json
/// { "providers": { "deepl": { "api_key": "..." },
///                  "microsoft": { "subscription_key": "...", "region": "westeurope" } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Credentials by lower-case provider identifier
    #[serde(default)]
    pub providers: HashMap<String, ProviderCredentials>,
}

impl BackendConfig {
    /// Read the config file (optional) layered with environment overrides.
    /// Called on every translation so edits apply without a restart.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = |e: config::ConfigError| TranslationError::UnreadableConfig {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(BACKEND_ENV_PREFIX).separator("__"))
            .build()
            .map_err(unreadable)?;

        settings.try_deserialize::<Self>().map_err(unreadable)
    }

    /// Credentials for a provider, empty when not configured
    pub fn credentials(&self, provider: &str) -> ProviderCredentials {
        self.providers
            .get(&provider.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}
