//! Lingvanex B2B API

use async_trait::async_trait;

use crate::core::config::ProviderCredentials;
use crate::core::errors::Result;
use crate::providers::{missing_field, network_error, read_json, require, TranslationProvider};

const DEFAULT_ENDPOINT: &str = "https://api-b2b.backenster.com/b1/api/v3/translate";

/// Lingvanex provider, needs a bearer `token`
#[derive(Debug, Clone)]
pub struct LingvanexProvider {
    client: reqwest::Client,
}

impl LingvanexProvider {
    /// Provider sending requests through `client`
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn parse_response(json: &serde_json::Value) -> Option<String> {
    json["result"].as_str().map(|s| s.to_string())
}

#[async_trait]
impl TranslationProvider for LingvanexProvider {
    fn id(&self) -> &'static str {
        "lingvanex"
    }

    fn display_name(&self) -> &'static str {
        "Lingvanex"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        credentials: &ProviderCredentials,
    ) -> Result<String> {
        let token = require(self.display_name(), "token", &credentials.token)?;
        let endpoint = ProviderCredentials::field(&credentials.endpoint).unwrap_or(DEFAULT_ENDPOINT);

        let body = serde_json::json!({
            "from": source,
            "to": target,
            "data": text,
            "platform": "api"
        });

        let response = self
            .client
            .post(endpoint)
            .header("Authorization", format!("Bearer {}", token))
            .json(&body)
            .send()
            .await
            .map_err(network_error(self.display_name()))?;

        let json = read_json(self.display_name(), response).await?;
        parse_response(&json).ok_or_else(|| missing_field(self.display_name(), "result"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_result_field() {
        let body = json!({"err": null, "result": "Ciao mondo", "cacheUse": 0});
        assert_eq!(parse_response(&body).unwrap(), "Ciao mondo");
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert!(parse_response(&json!({"err": "Invalid token", "result": null})).is_none());
        assert!(parse_response(&json!(["result"])).is_none());
    }
}
