//! Quote Translator - quote-aware text translation library
//!
//! Translates either whole texts or only the double-quoted segments of
//! script and dialogue files, dispatching to pluggable providers and metering
//! monthly character usage for the one provider that bills by volume.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod providers;

// Re-export key types for convenience
pub use crate::core::{
    audit::{AuditEntry, AuditLog},
    config::{AppPaths, BackendConfig, ProviderCredentials},
    errors::TranslationError,
    models::{Mode, Span, TranslationRequest, TranslationResult},
    orchestrator::{TranslationOrchestrator, TranslationOutcome},
    quotes::{extract_quotes, quote_spans, replace_quotes},
    settings::{Settings, SettingsStore, Theme},
    usage::{UsageLedger, UsageRecord, MAX_LIMIT, METERED_ENGINE},
};

pub use crate::providers::{ProviderRegistry, TranslationGateway, TranslationProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
