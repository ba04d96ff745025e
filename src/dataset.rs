//! Dataset loading for the training pipeline.
//!
//! Datasets are CSV files carrying two required columns, `text` and `label`.
//! The legacy export path produces ISO-8859-1 encoded files, so bytes are
//! decoded as Latin-1 before parsing. Duplicate rows (full-row equality)
//! are dropped, keeping the first occurrence.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PigeonholeError, Result};

/// The fixed category set, in report order.
///
/// Labels outside this set are accepted without validation; they simply
/// never appear in the fixed-order confusion matrix.
pub const CATEGORIES: [&str; 4] = ["invoice", "spam", "promotion", "discount"];

/// A raw labeled email message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    /// Raw message text.
    pub text: String,
    /// Category label.
    pub label: String,
}

impl Document {
    /// Create a new document.
    pub fn new<S: Into<String>, L: Into<String>>(text: S, label: L) -> Self {
        Document {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// Load a labeled dataset from an ISO-8859-1 encoded CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        PigeonholeError::dataset(format!("cannot read dataset {}: {e}", path.display()))
    })?;
    parse_csv(&decode_latin1(&bytes))
}

/// Decode ISO-8859-1 bytes into a string.
///
/// Latin-1 maps each byte to the Unicode code point of the same value, so
/// the decode is a plain widening and cannot fail.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parse and deduplicate CSV content with `text` and `label` columns.
pub fn parse_csv(content: &str) -> Result<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let text_idx = column_index(&headers, "text")?;
    let label_idx = column_index(&headers, "label")?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut documents = Vec::new();

    for record in reader.records() {
        let record = record?;
        // Missing cells become empty strings rather than failing the run.
        let text = record.get(text_idx).unwrap_or_default().to_string();
        let label = record.get(label_idx).unwrap_or_default().to_string();

        if seen.insert((text.clone(), label.clone())) {
            documents.push(Document { text, label });
        }
    }

    Ok(documents)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| PigeonholeError::dataset(format!("missing required column `{name}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_basic() {
        let content = "text,label\nYour invoice is due,invoice\n50% OFF,discount\n";
        let docs = parse_csv(content).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "Your invoice is due");
        assert_eq!(docs[0].label, "invoice");
        assert_eq!(docs[1].label, "discount");
    }

    #[test]
    fn test_parse_csv_deduplicates_full_rows() {
        let content = "text,label\nhello,spam\nhello,spam\nhello,promotion\n";
        let docs = parse_csv(content).unwrap();

        // Same text under a different label is not a duplicate.
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].label, "spam");
        assert_eq!(docs[1].label, "promotion");
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let content = "text,category\nhello,spam\n";
        let err = parse_csv(content).unwrap_err();
        assert!(err.to_string().contains("label"));
    }

    #[test]
    fn test_missing_cells_become_empty() {
        let content = "text,label\nonly text\n";
        let docs = parse_csv(content).unwrap();
        assert_eq!(docs[0].text, "only text");
        assert_eq!(docs[0].label, "");
    }

    #[test]
    fn test_decode_latin1() {
        // 0xE9 is é in ISO-8859-1.
        let bytes = [b'c', b'a', b'f', 0xE9];
        assert_eq!(decode_latin1(&bytes), "café");
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv("/nonexistent/dataset.csv").unwrap_err();
        assert!(err.to_string().contains("cannot read dataset"));
    }

    #[test]
    fn test_category_order() {
        assert_eq!(CATEGORIES, ["invoice", "spam", "promotion", "discount"]);
    }
}
