//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of the input is sent to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Only the contents of double-quoted spans are translated
    #[serde(rename = "quotes")]
    QuotesOnly,
    /// The whole input is translated in one call
    #[serde(rename = "full")]
    WholeText,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::QuotesOnly => write!(f, "quotes"),
            Mode::WholeText => write!(f, "full"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quotes" | "quotes-only" => Ok(Mode::QuotesOnly),
            "full" | "whole" | "whole-text" => Ok(Mode::WholeText),
            other => Err(format!("unknown mode '{}' (expected quotes or full)", other)),
        }
    }
}

/// Languages offered for translation, code and display name
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("ru", "Russian"),
    ("uk", "Ukrainian"),
    ("en", "English"),
    ("it", "Italian"),
    ("de", "German"),
];

/// Check whether a language code is in the catalogue
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Display name for a language code
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Translation request built from one user action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Text as entered, metered exactly as given
    pub raw_text: String,
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Requested mode; quotes in the input override it
    pub mode: Mode,
    /// Provider identifier
    pub engine: String,
}

impl TranslationRequest {
    /// Quotes-only request for the `google` engine
    pub fn new(
        raw_text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            raw_text: raw_text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            mode: Mode::QuotesOnly,
            engine: "google".to_string(),
        }
    }

    /// Set the mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the provider identifier
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Character count used for metering
    pub fn char_count(&self) -> u64 {
        self.raw_text.chars().count() as u64
    }
}

/// Range of a quoted segment, quote characters included.
///
/// `start` and `end` are UTF-8 byte offsets into the result `String`, so
/// `&text[start..end]` is always valid. Widgets that index by character
/// (or by UTF-16 unit) need converted offsets; [`Span::char_range`] gives
/// the character form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the opening quote
    pub start: usize,
    /// Byte offset just past the closing quote
    pub end: usize,
}

impl Span {
    /// The same range counted in characters of `text`
    pub fn char_range(&self, text: &str) -> std::ops::Range<usize> {
        let start = text[..self.start].chars().count();
        let end = start + text[self.start..self.end].chars().count();
        start..end
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Final text, quotes reinserted in quotes-only mode
    pub text: String,
    /// Quoted segments of `text`, left to right
    pub highlight_spans: Vec<Span>,
}

impl TranslationResult {
    /// Highlighted slices of the result text
    pub fn highlighted(&self) -> impl Iterator<Item = &str> {
        self.highlight_spans
            .iter()
            .map(move |span| &self.text[span.start..span.end])
    }
}
