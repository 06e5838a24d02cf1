//! DeepL API (free tier by default)

use async_trait::async_trait;

use crate::core::config::ProviderCredentials;
use crate::core::errors::Result;
use crate::providers::{missing_field, network_error, read_json, require, TranslationProvider};

const DEFAULT_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";

/// DeepL provider, needs `api_key`
#[derive(Debug, Clone)]
pub struct DeeplProvider {
    client: reqwest::Client,
}

impl DeeplProvider {
    /// Provider sending requests through `client`
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// First entry of `translations` in a `/v2/translate` response
fn parse_response(json: &serde_json::Value) -> Option<String> {
    json["translations"]
        .get(0)
        .and_then(|t| t["text"].as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl TranslationProvider for DeeplProvider {
    fn id(&self) -> &'static str {
        "deepl"
    }

    fn display_name(&self) -> &'static str {
        "DeepL"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        credentials: &ProviderCredentials,
    ) -> Result<String> {
        let key = require(self.display_name(), "api_key", &credentials.api_key)?;
        let endpoint = ProviderCredentials::field(&credentials.endpoint).unwrap_or(DEFAULT_ENDPOINT);

        // DeepL expects upper-case language codes
        let source = source.to_uppercase();
        let target = target.to_uppercase();

        let response = self
            .client
            .post(endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", key))
            .form(&[
                ("text", text),
                ("source_lang", source.as_str()),
                ("target_lang", target.as_str()),
            ])
            .send()
            .await
            .map_err(network_error(self.display_name()))?;

        let json = read_json(self.display_name(), response).await?;
        parse_response(&json).ok_or_else(|| missing_field(self.display_name(), "translation"))
    }
}
