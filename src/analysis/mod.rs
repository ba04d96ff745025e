//! Text analysis module for Pigeonhole.
//!
//! This module provides the normalization pipeline applied to raw email
//! text before any feature derivation: newline stripping, lowercasing,
//! whitespace tokenization, stopword removal, and lemmatization.

pub mod lemmatizer;
pub mod stopwords;

// Re-export commonly used types
pub use lemmatizer::{Lemmatizer, NounLemmatizer};
pub use stopwords::english_stop_words;

use std::collections::HashSet;
use std::sync::Arc;

/// The text normalization pipeline.
///
/// Applies processing in this order:
/// 1. Newline variants (`\r\n`, `\n`, `\r`) are replaced with single spaces
/// 2. Lowercasing
/// 3. Whitespace tokenization
/// 4. Stopword removal (exact token match against the fixed English set)
/// 5. Lemmatization of surviving tokens
/// 6. Tokens rejoined with single spaces
///
/// An empty output is valid: a document made entirely of stopwords
/// normalizes to the empty string.
#[derive(Clone)]
pub struct Normalizer {
    stop_words: &'static HashSet<&'static str>,
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Create a normalizer with the default English stopword set and the
    /// noun-form lemmatizer.
    pub fn new() -> Self {
        Normalizer {
            stop_words: english_stop_words(),
            lemmatizer: Arc::new(NounLemmatizer::new()),
        }
    }

    /// Create a normalizer with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Normalizer {
            stop_words: english_stop_words(),
            lemmatizer,
        }
    }

    /// Normalize raw text into a single-line, lowercase, stopword-free,
    /// lemmatized string.
    pub fn normalize(&self, text: &str) -> String {
        let text = text
            .replace("\r\n", " ")
            .replace('\n', " ")
            .replace('\r', " ")
            .to_lowercase();

        text.split_whitespace()
            .filter(|token| !self.stop_words.contains(token))
            .map(|token| self.lemmatizer.lemmatize(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalize a batch of documents, preserving order.
    pub fn normalize_all(&self, texts: &[String]) -> Vec<String> {
        use rayon::prelude::*;

        texts.par_iter().map(|text| self.normalize(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_become_spaces() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize("invoice\r\nattached\ntoday\rok");
        assert!(!result.contains('\n'));
        assert!(!result.contains('\r'));
    }

    #[test]
    fn test_output_is_lowercase() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize("URGENT Invoice DUE");
        assert_eq!(result, result.to_lowercase());
    }

    #[test]
    fn test_stopwords_removed() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize("the invoice is in the mail");
        assert!(!result.split(' ').any(|t| t == "the"));
        assert!(!result.split(' ').any(|t| t == "is"));
        assert!(result.contains("invoice"));
        assert!(result.contains("mail"));
    }

    #[test]
    fn test_lemmatization_applied() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize("invoices orders payments");
        assert_eq!(result, "invoice order payment");
    }

    #[test]
    fn test_all_stopwords_yield_empty_string() {
        let normalizer = Normalizer::new();
        assert_eq!(normalizer.normalize("the and of"), "");
    }

    #[test]
    fn test_stopword_dropped_after_lowercasing() {
        let normalizer = Normalizer::new();
        // "OFF" lowercases to the stopword "off" and is removed.
        assert_eq!(normalizer.normalize("50% OFF"), "50%");
    }

    #[test]
    fn test_batch_preserves_order() {
        let normalizer = Normalizer::new();
        let texts = vec!["Invoices due".to_string(), "50% DISCOUNT".to_string()];
        let normalized = normalizer.normalize_all(&texts);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0], "invoice due");
        assert_eq!(normalized[1], "50% discount");
    }
}
