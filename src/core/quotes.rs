//! Quoted segment extraction and reinsertion
//!
//! Extraction and reinsertion share one pattern, `"(.*?)"`, so the number and
//! order of spans seen by both passes is always identical. There is no escape
//! or nesting support: an odd number of quote characters leaves the last one
//! unmatched, and the pairing follows the regex, not a human reading.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::Span;

fn quote_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#""(.*?)""#).expect("quote pattern is valid"))
}

/// Contents of every quoted span, left to right. Empty quotes yield `""`.
pub fn extract_quotes(text: &str) -> Vec<String> {
    quote_pattern()
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace the contents of each quoted span with the next replacement.
///
/// Fails with [`TranslationError::QuoteCountMismatch`] when there are fewer
/// replacements than spans. Surplus replacements are ignored.
pub fn replace_quotes<S: AsRef<str>>(text: &str, replacements: &[S]) -> Result<String> {
    let spans = quote_pattern().find_iter(text).count();
    if replacements.len() < spans {
        return Err(TranslationError::QuoteCountMismatch {
            spans,
            replacements: replacements.len(),
        });
    }

    let mut next = replacements.iter();
    let replaced = quote_pattern().replace_all(text, |_: &Captures| {
        // Count checked above
        let replacement: &str = next.next().map(|r| r.as_ref()).unwrap_or("");
        format!("\"{}\"", replacement)
    });

    Ok(replaced.into_owned())
}

/// Byte ranges of every quoted span, quote characters included
pub fn quote_spans(text: &str) -> Vec<Span> {
    quote_pattern()
        .find_iter(text)
        .map(|m| Span {
            start: m.start(),
            end: m.end(),
        })
        .collect()
}
