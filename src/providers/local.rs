//! Offline stand-in that tags text with the language pair

use async_trait::async_trait;

use crate::core::config::ProviderCredentials;
use crate::core::errors::Result;
use crate::providers::TranslationProvider;

/// Returns `[src→tgt] text` without any network access
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvider;

#[async_trait]
impl TranslationProvider for LocalProvider {
    fn id(&self) -> &'static str {
        "local"
    }

    fn display_name(&self) -> &'static str {
        "Local"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
        _credentials: &ProviderCredentials,
    ) -> Result<String> {
        Ok(format!("[{}→{}] {}", source, target, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_language_pair() {
        let out = tokio_test::block_on(LocalProvider.translate(
            "world",
            "en",
            "ru",
            &ProviderCredentials::default(),
        ))
        .unwrap();
        assert_eq!(out, "[en→ru] world");
    }
}
