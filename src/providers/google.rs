//! Google Translate through the public web endpoint

use async_trait::async_trait;

use crate::core::config::ProviderCredentials;
use crate::core::errors::Result;
use crate::providers::{missing_field, network_error, read_json, TranslationProvider};

const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Keyless Google provider
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Provider sending requests through `client`
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Join the translated sentence chunks of a `translate_a/single` response
fn parse_response(json: &serde_json::Value) -> Option<String> {
    let chunks = json.get(0)?.as_array()?;
    let text: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(|t| t.as_str()))
        .collect();
    Some(text)
}

#[async_trait]
impl TranslationProvider for GoogleProvider {
    fn id(&self) -> &'static str {
        "google"
    }

    fn display_name(&self) -> &'static str {
        "Google"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        credentials: &ProviderCredentials,
    ) -> Result<String> {
        let endpoint = ProviderCredentials::field(&credentials.endpoint).unwrap_or(DEFAULT_ENDPOINT);

        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(network_error(self.display_name()))?;

        let json = read_json(self.display_name(), response).await?;
        parse_response(&json).ok_or_else(|| missing_field(self.display_name(), "translation"))
    }
}
