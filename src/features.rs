//! Scalar surface-statistic features for email classification.
//!
//! Every signal is a pure function of the already-normalized document
//! text; no signal depends on external state or on other documents.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice-indicative keyword list used by the message-body pipeline.
///
/// Matching is substring containment, case-sensitive against the
/// normalized (lowercase) text. The capitalized entries therefore never
/// match after normalization; the list is reproduced verbatim from the
/// deployed configuration rather than corrected.
pub const BODY_INVOICE_KEYWORDS: &[&str] = &[
    "invoice #",
    "order number",
    "order #",
    "invoice",
    "purchase",
    "hsn code",
    "bill to",
    "total invoice value",
    "ship to",
    "address",
    "tax invoice",
    "order id",
    "receipt",
    "billing",
    "payment",
    "transaction",
    "due date",
    "amount due",
    "credit",
    "debit",
    "account statement",
    "balance",
    "invoice date",
    "payment due",
    "total amount",
    "payable",
    "purchase order",
    "confirmation",
    "shipping",
    "tracking",
    "shipment",
    "dispatch",
    "delivery",
    "order confirmation",
    "receipt number",
    "payment details",
    "invoice total",
    "itemized bill",
    "Delivered",
    "Total paid",
    "Items ordered",
];

/// Invoice-indicative keyword list used by the subject-line pipeline.
///
/// Identical to [`BODY_INVOICE_KEYWORDS`] plus a bare `order` entry.
pub const SUBJECT_INVOICE_KEYWORDS: &[&str] = &[
    "invoice #",
    "order number",
    "order #",
    "invoice",
    "purchase",
    "hsn code",
    "bill to",
    "total invoice value",
    "ship to",
    "address",
    "tax invoice",
    "order id",
    "receipt",
    "billing",
    "payment",
    "transaction",
    "due date",
    "amount due",
    "credit",
    "debit",
    "account statement",
    "balance",
    "invoice date",
    "payment due",
    "total amount",
    "payable",
    "purchase order",
    "confirmation",
    "shipping",
    "tracking",
    "shipment",
    "dispatch",
    "delivery",
    "order confirmation",
    "receipt number",
    "payment details",
    "invoice total",
    "itemized bill",
    "Delivered",
    "Total paid",
    "Items ordered",
    "order",
];

/// Which built-in keyword list a pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordVariant {
    /// Message-body list.
    Body,
    /// Subject-line list (adds `order`).
    Subject,
}

impl KeywordVariant {
    /// The keyword list for this variant.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            KeywordVariant::Body => BODY_INVOICE_KEYWORDS,
            KeywordVariant::Subject => SUBJECT_INVOICE_KEYWORDS,
        }
    }
}

/// The seven per-document scalar signals, in their fixed fusion order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarFeatures {
    /// Count of `!` characters.
    pub exclamation_mark_count: u32,
    /// Whether any configured keyword occurs as a substring.
    pub has_invoice_keyword: bool,
    /// Count of decimal digit characters.
    pub numeric_count: u32,
    /// Count of `%` characters.
    pub percentage_sign_count: u32,
    /// Count of `$` characters.
    pub dollar_symbol_count: u32,
    /// Count of `₹` characters.
    pub rupee_symbol_count: u32,
    /// Count of emoji glyphs.
    pub emoji_count: u32,
}

impl ScalarFeatures {
    /// Number of scalar signals.
    pub const LEN: usize = 7;

    /// The signals as a dense row in the fixed fusion order.
    pub fn to_dense(&self) -> [f64; Self::LEN] {
        [
            f64::from(self.exclamation_mark_count),
            if self.has_invoice_keyword { 1.0 } else { 0.0 },
            f64::from(self.numeric_count),
            f64::from(self.percentage_sign_count),
            f64::from(self.dollar_symbol_count),
            f64::from(self.rupee_symbol_count),
            f64::from(self.emoji_count),
        ]
    }
}

/// Extractor deriving [`ScalarFeatures`] from normalized text.
///
/// The keyword list is configuration, not a constant, so either shipped
/// variant (or a custom list) can be selected per pipeline.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    keywords: Vec<String>,
}

impl FeatureExtractor {
    /// Create an extractor with a custom keyword list.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeatureExtractor {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an extractor for one of the built-in keyword variants.
    pub fn for_variant(variant: KeywordVariant) -> Self {
        Self::new(variant.keywords().iter().copied())
    }

    /// The configured keyword list.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Compute the seven scalar signals for one document.
    pub fn extract(&self, text: &str) -> ScalarFeatures {
        ScalarFeatures {
            exclamation_mark_count: count_char(text, '!'),
            has_invoice_keyword: self.keywords.iter().any(|k| text.contains(k.as_str())),
            numeric_count: text.chars().filter(|c| c.is_ascii_digit()).count() as u32,
            percentage_sign_count: count_char(text, '%'),
            dollar_symbol_count: count_char(text, '$'),
            rupee_symbol_count: count_char(text, '₹'),
            emoji_count: count_emojis(text),
        }
    }

    /// Compute scalar signals for a batch of documents, preserving order.
    pub fn extract_all(&self, texts: &[String]) -> Vec<ScalarFeatures> {
        texts.par_iter().map(|text| self.extract(text)).collect()
    }
}

fn count_char(text: &str, target: char) -> u32 {
    text.chars().filter(|&c| c == target).count() as u32
}

/// Count emoji glyphs in the text.
pub fn count_emojis(text: &str) -> u32 {
    text.chars().filter(|&c| is_emoji(c)).count() as u32
}

/// Check whether a scalar value falls in one of the Unicode emoji blocks.
fn is_emoji(c: char) -> bool {
    matches!(c,
        '\u{1F300}'..='\u{1F5FF}' | // Misc Symbols and Pictographs
        '\u{1F600}'..='\u{1F64F}' | // Emoticons
        '\u{1F680}'..='\u{1F6FF}' | // Transport and Map Symbols
        '\u{1F900}'..='\u{1F9FF}' | // Supplemental Symbols and Pictographs
        '\u{1FA70}'..='\u{1FAFF}' | // Symbols and Pictographs Extended-A
        '\u{1F1E6}'..='\u{1F1FF}' | // Regional Indicators
        '\u{2600}'..='\u{26FF}'   | // Misc Symbols
        '\u{2700}'..='\u{27BF}'   | // Dingbats
        '\u{2B05}'..='\u{2B07}'   | // Arrows
        '\u{2B1B}'..='\u{2B1C}'   | // Squares
        '\u{2B50}' | '\u{2B55}'
    )
}
