//! Runs one translation request end to end

use tracing::{debug, info, warn};

use crate::core::audit::{AuditEntry, AuditLog};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Mode, TranslationRequest, TranslationResult};
use crate::core::quotes::{extract_quotes, quote_spans, replace_quotes};
use crate::core::usage::{is_metered, ThresholdStatus, UsageLedger, UsageRecord};
use crate::providers::TranslationGateway;

/// Usage after a metered translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageUpdate {
    /// Record as persisted after this request
    pub record: UsageRecord,
    /// Threshold check on `record`
    pub status: ThresholdStatus,
}

/// Everything a caller needs after a translation
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    /// Translated text and highlight spans
    pub result: TranslationResult,
    /// Mode actually used for this request
    pub mode: Mode,
    /// Quote detection overrode the requested mode; the caller decides
    /// whether to persist it
    pub mode_changed: bool,
    /// Present when the request was metered
    pub usage: Option<UsageUpdate>,
}

/// Ties together quote handling, the gateway, the audit log and the ledger
pub struct TranslationOrchestrator<G> {
    gateway: G,
    ledger: UsageLedger,
    audit: AuditLog,
}

impl<G: TranslationGateway> TranslationOrchestrator<G> {
    /// Orchestrator over `gateway`, metering into `ledger` and logging to `audit`
    pub fn new(gateway: G, ledger: UsageLedger, audit: AuditLog) -> Self {
        Self {
            gateway,
            ledger,
            audit,
        }
    }

    /// Gateway used for provider calls
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Ledger metered by this orchestrator
    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Translate `request`.
    ///
    /// Empty input fails with [`TranslationError::EmptyInput`] before any side
    /// effect. Provider failures do not fail the call: their message becomes
    /// the translated text and is logged and metered like a real result.
    pub async fn run_translation(
        &self,
        request: &TranslationRequest,
        limit_enabled: bool,
    ) -> Result<TranslationOutcome> {
        if request.raw_text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let (mode, mode_changed) = effective_mode(request);
        if mode_changed {
            info!("Quotes detected, switching to quotes-only mode");
        }

        let text = match mode {
            Mode::QuotesOnly => {
                let quoted = extract_quotes(&request.raw_text);
                debug!("Translating {} quoted segments", quoted.len());

                let mut translated = Vec::with_capacity(quoted.len());
                for segment in &quoted {
                    translated.push(self.translate_inline(request, segment).await?);
                }
                replace_quotes(&request.raw_text, &translated)?
            }
            Mode::WholeText => self.translate_inline(request, &request.raw_text).await?,
        };

        let result = TranslationResult {
            highlight_spans: quote_spans(&text),
            text,
        };

        let entry = AuditEntry::now(
            &request.source_lang,
            &request.target_lang,
            &request.raw_text,
            &result.text,
        );
        if let Err(e) = self.audit.append(&entry) {
            warn!("Failed to write translation log: {}", e);
        }

        let usage = if limit_enabled && is_metered(&request.engine) {
            self.meter(request.char_count())
        } else {
            None
        };

        Ok(TranslationOutcome {
            result,
            mode,
            mode_changed,
            usage,
        })
    }

    /// One gateway call. Inline errors become the translated text.
    async fn translate_inline(&self, request: &TranslationRequest, text: &str) -> Result<String> {
        match self
            .gateway
            .translate(text, &request.source_lang, &request.target_lang, &request.engine)
            .await
        {
            Ok(translated) => Ok(translated),
            Err(e) if e.is_inline() => {
                warn!("Translation with {} failed: {}", request.engine, e);
                Ok(e.inline_payload())
            }
            Err(e) => Err(e),
        }
    }

    fn meter(&self, chars: u64) -> Option<UsageUpdate> {
        let record = self.ledger.load();
        match self.ledger.record_usage(record, chars) {
            Ok(record) => {
                let status = self.ledger.check_threshold(&record);
                Some(UsageUpdate { record, status })
            }
            Err(e) => {
                warn!("Failed to record usage: {}", e);
                None
            }
        }
    }
}

/// Any double quote in the input forces quotes-only mode
fn effective_mode(request: &TranslationRequest) -> (Mode, bool) {
    if request.mode != Mode::QuotesOnly && request.raw_text.contains('"') {
        (Mode::QuotesOnly, true)
    } else {
        (request.mode, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    use crate::core::usage::{MAX_LIMIT, METERED_ENGINE};

    /// Echoes `[src→tgt] text` and records every call
    #[derive(Default)]
    struct EchoGateway {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TranslationGateway for EchoGateway {
        async fn translate(&self, text: &str, source: &str, target: &str, _engine: &str) -> Result<String> {
            self.calls.lock().unwrap().push(text.to_string());
            Ok(format!("[{}→{}] {}", source, target, text))
        }
    }

    struct FailingGateway;

    #[async_trait]
    impl TranslationGateway for FailingGateway {
        async fn translate(&self, _text: &str, _source: &str, _target: &str, engine: &str) -> Result<String> {
            Err(TranslationError::MissingCredential {
                provider: engine.to_string(),
                field: "api_key".to_string(),
            })
        }
    }

    fn orchestrator<G: TranslationGateway>(gateway: G) -> (TempDir, TranslationOrchestrator<G>) {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.json"));
        let audit = AuditLog::new(dir.path().join("logs"));
        (dir, TranslationOrchestrator::new(gateway, ledger, audit))
    }

    fn log_lines(dir: &TempDir) -> usize {
        let logs = dir.path().join("logs");
        if !logs.exists() {
            return 0;
        }
        std::fs::read_dir(logs)
            .unwrap()
            .map(|e| std::fs::read_to_string(e.unwrap().path()).unwrap().lines().count())
            .sum()
    }

    #[tokio::test]
    async fn test_quotes_only_translates_each_span() {
        let (dir, orch) = orchestrator(EchoGateway::default());
        let request = TranslationRequest::new(r#"Hello "world" and "там""#, "en", "ru")
            .with_mode(Mode::QuotesOnly)
            .with_engine("local");

        let outcome = orch.run_translation(&request, true).await.unwrap();
        assert_eq!(
            outcome.result.text,
            r#"Hello "[en→ru] world" and "[en→ru] там""#
        );
        assert_eq!(*orch.gateway().calls.lock().unwrap(), vec!["world", "там"]);
        assert!(!outcome.mode_changed);

        let highlighted: Vec<&str> = outcome.result.highlighted().collect();
        assert_eq!(highlighted, vec![r#""[en→ru] world""#, r#""[en→ru] там""#]);
        assert_eq!(log_lines(&dir), 1);
    }

    #[tokio::test]
    async fn test_quote_in_input_forces_quotes_mode() {
        let (_dir, orch) = orchestrator(EchoGateway::default());
        let request = TranslationRequest::new(r#"e "Hi." with fade"#, "en", "de")
            .with_mode(Mode::WholeText);

        let outcome = orch.run_translation(&request, false).await.unwrap();
        assert!(outcome.mode_changed);
        assert_eq!(outcome.mode, Mode::QuotesOnly);
        assert_eq!(outcome.result.text, r#"e "[en→de] Hi." with fade"#);
    }

    #[tokio::test]
    async fn test_whole_text_single_call() {
        let (_dir, orch) = orchestrator(EchoGateway::default());
        let request = TranslationRequest::new("Good morning. See you.", "en", "it")
            .with_mode(Mode::WholeText);

        let outcome = orch.run_translation(&request, false).await.unwrap();
        assert_eq!(outcome.result.text, "[en→it] Good morning. See you.");
        assert_eq!(orch.gateway().calls.lock().unwrap().len(), 1);
        assert!(outcome.result.highlight_spans.is_empty());
    }

    #[tokio::test]
    async fn test_quotes_mode_without_quotes_makes_no_calls() {
        let (_dir, orch) = orchestrator(EchoGateway::default());
        let request = TranslationRequest::new("plain line", "en", "ru");

        let outcome = orch.run_translation(&request, false).await.unwrap();
        assert_eq!(outcome.result.text, "plain line");
        assert!(orch.gateway().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input_has_no_side_effects() {
        let (dir, orch) = orchestrator(EchoGateway::default());
        for text in ["", "   \n\t "] {
            let request = TranslationRequest::new(text, "en", "ru").with_engine(METERED_ENGINE);
            let err = orch.run_translation(&request, true).await.unwrap_err();
            assert!(matches!(err, TranslationError::EmptyInput));
        }

        assert!(orch.gateway().calls.lock().unwrap().is_empty());
        assert_eq!(log_lines(&dir), 0);
        assert!(!orch.ledger().path().exists());
    }

    #[tokio::test]
    async fn test_unmetered_engine_skips_ledger() {
        let (_dir, orch) = orchestrator(EchoGateway::default());
        let text = "a".repeat(5_000_000);
        let request = TranslationRequest::new(text, "en", "ru")
            .with_mode(Mode::WholeText)
            .with_engine("local");

        let outcome = orch.run_translation(&request, true).await.unwrap();
        assert!(outcome.usage.is_none());
        assert!(!orch.ledger().path().exists());
    }

    #[tokio::test]
    async fn test_metered_engine_counts_raw_input() {
        let (_dir, orch) = orchestrator(EchoGateway::default());
        let request = TranslationRequest::new(r#"x "привет""#, "ru", "en")
            .with_engine(METERED_ENGINE);

        let outcome = orch.run_translation(&request, true).await.unwrap();
        let usage = outcome.usage.unwrap();
        // Raw input is 10 characters; the longer output is not counted
        assert_eq!(usage.record.used, 10);
        assert_eq!(usage.status, ThresholdStatus::Ok);
        assert_eq!(orch.ledger().load().used, 10);
    }

    #[tokio::test]
    async fn test_limit_toggle_disables_metering() {
        let (_dir, orch) = orchestrator(EchoGateway::default());
        let request = TranslationRequest::new("hello", "en", "de").with_engine(METERED_ENGINE);

        let outcome = orch.run_translation(&request, false).await.unwrap();
        assert!(outcome.usage.is_none());
        assert!(!orch.ledger().path().exists());
    }

    #[tokio::test]
    async fn test_threshold_warning_is_reported() {
        let (_dir, orch) = orchestrator(EchoGateway::default());
        let record = orch.ledger().load();
        orch.ledger().record_usage(record, MAX_LIMIT - 100).unwrap();

        let request = TranslationRequest::new("hello", "en", "de")
            .with_mode(Mode::WholeText)
            .with_engine(METERED_ENGINE);
        let first = orch.run_translation(&request, true).await.unwrap();
        let second = orch.run_translation(&request, true).await.unwrap();

        assert_eq!(first.usage.unwrap().status, ThresholdStatus::Warn);
        assert_eq!(second.usage.unwrap().status, ThresholdStatus::Warn);
    }

    #[tokio::test]
    async fn test_provider_error_is_inline_and_still_metered() {
        let (dir, orch) = orchestrator(FailingGateway);
        let request = TranslationRequest::new("hello", "en", "de")
            .with_mode(Mode::WholeText)
            .with_engine(METERED_ENGINE);

        let outcome = orch.run_translation(&request, true).await.unwrap();
        assert_eq!(
            outcome.result.text,
            "[Error: Missing credential for microsoft: api_key]"
        );
        assert_eq!(outcome.usage.unwrap().record.used, 5);
        assert_eq!(log_lines(&dir), 1);
    }

    #[test]
    fn test_effective_mode() {
        let quoted = TranslationRequest::new("say \"x\"", "en", "ru").with_mode(Mode::WholeText);
        assert_eq!(effective_mode(&quoted), (Mode::QuotesOnly, true));

        let plain = TranslationRequest::new("say x", "en", "ru").with_mode(Mode::WholeText);
        assert_eq!(effective_mode(&plain), (Mode::WholeText, false));
    }
}
