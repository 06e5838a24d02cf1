//! Microsoft Translator v3.0, the metered provider

use async_trait::async_trait;

use crate::core::config::ProviderCredentials;
use crate::core::errors::Result;
use crate::providers::{missing_field, network_error, read_json, require, TranslationProvider};

const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

/// Microsoft provider, needs `subscription_key` and `region`
#[derive(Debug, Clone)]
pub struct MicrosoftProvider {
    client: reqwest::Client,
}

impl MicrosoftProvider {
    /// Provider sending requests through `client`
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Text of the first translation of the first input item
fn parse_response(json: &serde_json::Value) -> Option<String> {
    json.get(0)
        .and_then(|item| item["translations"].get(0))
        .and_then(|t| t["text"].as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl TranslationProvider for MicrosoftProvider {
    fn id(&self) -> &'static str {
        "microsoft"
    }

    fn display_name(&self) -> &'static str {
        "Microsoft"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        credentials: &ProviderCredentials,
    ) -> Result<String> {
        let key = require(self.display_name(), "subscription_key", &credentials.subscription_key)?;
        let region = require(self.display_name(), "region", &credentials.region)?;
        let endpoint = ProviderCredentials::field(&credentials.endpoint).unwrap_or(DEFAULT_ENDPOINT);

        let response = self
            .client
            .post(format!("{}/translate", endpoint.trim_end_matches('/')))
            .query(&[("api-version", "3.0"), ("from", source), ("to", target)])
            .header("Ocp-Apim-Subscription-Key", key)
            .header("Ocp-Apim-Subscription-Region", region)
            .json(&serde_json::json!([{ "text": text }]))
            .send()
            .await
            .map_err(network_error(self.display_name()))?;

        let json = read_json(self.display_name(), response).await?;
        parse_response(&json).ok_or_else(|| missing_field(self.display_name(), "translation"))
    }
}
