//! Translation providers and the gateway that dispatches to them

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::core::config::{BackendConfig, ProviderCredentials};
use crate::core::errors::{Result, TranslationError};

pub mod deepl;
pub mod google;
pub mod lingvanex;
pub mod local;
pub mod microsoft;

pub use deepl::DeeplProvider;
pub use google::GoogleProvider;
pub use lingvanex::LingvanexProvider;
pub use local::LocalProvider;
pub use microsoft::MicrosoftProvider;

/// Anything that can turn text into a translation for a named engine
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    /// Translate `text` from `source` to `target` with the provider named `engine`
    async fn translate(&self, text: &str, source: &str, target: &str, engine: &str) -> Result<String>;
}

/// One translation backend
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Identifier used in settings and on the command line
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn display_name(&self) -> &'static str;

    /// Translate one piece of text using the supplied credentials
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        credentials: &ProviderCredentials,
    ) -> Result<String>;
}

/// Maps engine identifiers to providers. Credentials are re-read from the
/// backend config on every call.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn TranslationProvider>>,
    config_path: PathBuf,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .field("config_path", &self.config_path)
            .finish()
    }
}

impl ProviderRegistry {
    /// Empty registry reading credentials from `config_path`
    pub fn new<P: Into<PathBuf>>(config_path: P) -> Self {
        Self {
            providers: Vec::new(),
            config_path: config_path.into(),
        }
    }

    /// Registry with every built-in provider sharing one HTTP client
    pub fn with_defaults<P: Into<PathBuf>>(config_path: P) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .build()?;

        let mut registry = Self::new(config_path);
        registry.register(GoogleProvider::new(client.clone()));
        registry.register(DeeplProvider::new(client.clone()));
        registry.register(LingvanexProvider::new(client.clone()));
        registry.register(MicrosoftProvider::new(client));
        registry.register(LocalProvider);
        Ok(registry)
    }

    /// Add a provider, replacing any with the same identifier
    pub fn register<P: TranslationProvider + 'static>(&mut self, provider: P) {
        self.providers.retain(|p| p.id() != provider.id());
        self.providers.push(Box::new(provider));
    }

    /// Provider registered under `id`, ignoring ASCII case
    pub fn get(&self, id: &str) -> Option<&dyn TranslationProvider> {
        self.providers
            .iter()
            .find(|p| p.id().eq_ignore_ascii_case(id))
            .map(|p| p.as_ref())
    }

    /// Registered providers in registration order
    pub fn providers(&self) -> impl Iterator<Item = &dyn TranslationProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    /// Identifiers of the registered providers
    pub fn ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }
}

#[async_trait]
impl TranslationGateway for ProviderRegistry {
    async fn translate(&self, text: &str, source: &str, target: &str, engine: &str) -> Result<String> {
        let config = BackendConfig::load(&self.config_path)?;

        let provider = self
            .get(engine)
            .ok_or_else(|| TranslationError::UnsupportedEngine {
                engine: engine.to_string(),
            })?;

        debug!("Translating {} chars with {}", text.chars().count(), provider.id());
        provider
            .translate(text, source, target, &config.credentials(provider.id()))
            .await
    }
}

/// Required credential field, or `MissingCredential`
pub(crate) fn require<'a>(provider: &str, field: &str, value: &'a Option<String>) -> Result<&'a str> {
    ProviderCredentials::field(value).ok_or_else(|| TranslationError::MissingCredential {
        provider: provider.to_string(),
        field: field.to_string(),
    })
}

/// Check the status and decode a JSON body
pub(crate) async fn read_json(provider: &str, response: reqwest::Response) -> Result<serde_json::Value> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(TranslationError::ProviderRejected {
            provider: provider.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| TranslationError::InvalidResponseError {
            provider: provider.to_string(),
            message: e.to_string(),
        })
}

pub(crate) fn network_error(provider: &str) -> impl FnOnce(reqwest::Error) -> TranslationError + '_ {
    move |e| TranslationError::NetworkError {
        provider: provider.to_string(),
        message: e.to_string(),
    }
}

pub(crate) fn missing_field(provider: &str, what: &str) -> TranslationError {
    TranslationError::InvalidResponseError {
        provider: provider.to_string(),
        message: format!("No {} in response", what),
    }
}
