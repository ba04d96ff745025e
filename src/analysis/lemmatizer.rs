//! Lemmatization for reducing words to their dictionary base forms.
//!
//! Normalization assumes every token is a noun (no part-of-speech
//! disambiguation), mirroring dictionary lemmatizers run with their
//! default settings. Without a full lexicon the rules are guarded so
//! that words like `glass` or `bonus` survive unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Trait for lemmatization algorithms.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a word to its base form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

/// Irregular noun plurals that no suffix rule can recover.
static IRREGULAR_NOUNS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("lice", "louse"),
        ("oxen", "ox"),
        ("dice", "die"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("appendices", "appendix"),
        ("analyses", "analysis"),
        ("crises", "crisis"),
        ("theses", "thesis"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
    ])
});

/// Ordered noun suffix substitution rules: (suffix, replacement).
///
/// The first matching rule wins. The bare `-s` rule comes last and is
/// guarded separately in [`NounLemmatizer::lemmatize`].
const NOUN_SUFFIX_RULES: &[(&str, &str)] = &[
    ("ches", "ch"),
    ("shes", "sh"),
    ("sses", "ss"),
    ("xes", "x"),
    ("zes", "z"),
    ("ves", "f"),
    ("ies", "y"),
];

/// Rule-based noun lemmatizer.
///
/// Checks the irregular-plural table first, then applies ordered suffix
/// rules, then strips a trailing `s` when it is safe to do so.
#[derive(Debug, Clone, Default)]
pub struct NounLemmatizer;

impl NounLemmatizer {
    /// Create a new noun lemmatizer.
    pub fn new() -> Self {
        NounLemmatizer
    }

    /// Whether stripping a final `s` is safe for this word.
    ///
    /// Words ending in `ss`, `us`, or `is` keep their suffix (`glass`,
    /// `bonus`, `basis`), and very short words are left alone so tokens
    /// like `was` or `its` are not mangled.
    fn can_strip_plural_s(word: &str) -> bool {
        word.len() >= 4
            && word.ends_with('s')
            && !word.ends_with("ss")
            && !word.ends_with("us")
            && !word.ends_with("is")
    }
}

impl Lemmatizer for NounLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if let Some(&base) = IRREGULAR_NOUNS.get(word) {
            return base.to_string();
        }

        for &(suffix, replacement) in NOUN_SUFFIX_RULES {
            // The stem must keep at least two characters.
            if word.len() > suffix.len() + 1 && word.ends_with(suffix) {
                let stem = &word[..word.len() - suffix.len()];
                return format!("{stem}{replacement}");
            }
        }

        if Self::can_strip_plural_s(word) {
            return word[..word.len() - 1].to_string();
        }

        word.to_string()
    }

    fn name(&self) -> &'static str {
        "noun"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("invoices"), "invoice");
        assert_eq!(lemmatizer.lemmatize("orders"), "order");
        assert_eq!(lemmatizer.lemmatize("payments"), "payment");
    }

    #[test]
    fn test_suffix_rules() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("batches"), "batch");
        assert_eq!(lemmatizer.lemmatize("wishes"), "wish");
        assert_eq!(lemmatizer.lemmatize("glasses"), "glass");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("wolves"), "wolf");
        assert_eq!(lemmatizer.lemmatize("companies"), "company");
    }

    #[test]
    fn test_irregular_plurals() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("feet"), "foot");
        assert_eq!(lemmatizer.lemmatize("mice"), "mouse");
    }

    #[test]
    fn test_guarded_words_unchanged() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("glass"), "glass");
        assert_eq!(lemmatizer.lemmatize("bonus"), "bonus");
        assert_eq!(lemmatizer.lemmatize("basis"), "basis");
        assert_eq!(lemmatizer.lemmatize("was"), "was");
        assert_eq!(lemmatizer.lemmatize("gas"), "gas");
    }

    #[test]
    fn test_non_plural_tokens_pass_through() {
        let lemmatizer = NounLemmatizer::new();
        assert_eq!(lemmatizer.lemmatize("50%"), "50%");
        assert_eq!(lemmatizer.lemmatize("invoice"), "invoice");
        assert_eq!(lemmatizer.lemmatize(""), "");
    }
}
