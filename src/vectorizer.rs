//! TF-IDF vectorization over normalized text.
//!
//! The vectorizer fits a sparse lexical representation: unigrams and
//! bigrams, document-frequency filtered, capped at a fixed vocabulary
//! size, weighted by smoothed TF-IDF with L2-normalized rows. The fitted
//! vocabulary and IDF weights serialize alongside the classifier, since
//! inference requires the identical feature space.

use std::collections::HashMap;

use ahash::{AHashMap, AHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{PigeonholeError, Result};

/// A sparse feature row. Indices are strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// Column indices of non-zero entries, ascending.
    pub indices: Vec<u32>,
    /// Values matching `indices` pairwise.
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create an empty sparse vector.
    pub fn new() -> Self {
        SparseVector {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Append an entry. The caller keeps indices ascending.
    pub fn push(&mut self, index: u32, value: f64) {
        debug_assert!(self.indices.last().is_none_or(|&last| index > last));
        self.indices.push(index);
        self.values.push(value);
    }

    /// Dot product against a dense weight slice.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(&self.values)
            .map(|(&i, &v)| dense[i as usize] * v)
            .sum()
    }

    /// Squared L2 norm of the stored entries.
    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }
}

impl Default for SparseVector {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the TF-IDF vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Vocabulary cap: top terms by corpus frequency.
    pub max_features: usize,
    /// N-gram range, inclusive (1, 2) = unigrams and bigrams.
    pub ngram_range: (usize, usize),
    /// Drop terms appearing in more than this fraction of documents.
    pub max_df: f64,
    /// Drop terms appearing in fewer than this many documents.
    pub min_df: usize,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            max_features: 2000,
            ngram_range: (1, 2),
            max_df: 0.95,
            min_df: 2,
        }
    }
}

/// TF-IDF vectorizer for lexical feature extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Vocabulary: term -> column index (assigned in lexicographic order).
    vocabulary: HashMap<String, u32>,
    /// Smoothed inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer with the given configuration.
    pub fn new(config: VectorizerConfig) -> Self {
        TfIdfVectorizer {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    /// Create an unfitted vectorizer with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(VectorizerConfig::default())
    }

    /// Whether `fit` has been called.
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Realized vocabulary size (≤ `max_features`).
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vectorizer configuration.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Fit the vocabulary and IDF weights over a corpus of normalized
    /// documents.
    ///
    /// Terms are kept when `min_df <= df <= max_df * n`, then capped at
    /// `max_features` by total corpus count (ties broken lexicographically).
    /// Column indices are assigned in lexicographic term order, so fitting
    /// the same corpus always yields the same feature space.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(PigeonholeError::vectorizer(
                "cannot fit on an empty corpus",
            ));
        }

        let n = documents.len();
        let mut document_frequency: AHashMap<String, usize> = AHashMap::new();
        let mut corpus_count: AHashMap<String, u64> = AHashMap::new();

        for doc in documents {
            let terms = ngrams(doc, self.config.ngram_range);
            for term in &terms {
                *corpus_count.entry(term.clone()).or_insert(0) += 1;
            }
            let unique: AHashSet<&String> = terms.iter().collect();
            for term in unique {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.config.max_df * n as f64;
        let mut candidates: Vec<(String, u64)> = corpus_count
            .into_iter()
            .filter(|(term, _)| {
                let df = document_frequency.get(term).copied().unwrap_or(0);
                df >= self.config.min_df && (df as f64) <= max_doc_count
            })
            .collect();

        if candidates.is_empty() {
            return Err(PigeonholeError::vectorizer(
                "empty vocabulary: no term satisfies the document-frequency bounds",
            ));
        }

        // Cap by corpus frequency, ties broken by term order.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        candidates.truncate(self.config.max_features);

        // Deterministic column assignment: lexicographic term order.
        let mut terms: Vec<String> = candidates.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let mut vocabulary = HashMap::with_capacity(terms.len());
        let mut idf = Vec::with_capacity(terms.len());
        for (index, term) in terms.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0);
            // Smoothed IDF: ln((1 + n) / (1 + df)) + 1.
            idf.push(((1.0 + n as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index as u32);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n;

        Ok(())
    }

    /// Transform one normalized document into an L2-normalized sparse
    /// TF-IDF row.
    pub fn transform(&self, document: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(PigeonholeError::vectorizer(
                "transform called before fit",
            ));
        }

        let mut counts: AHashMap<u32, f64> = AHashMap::new();
        for term in ngrams(document, self.config.ngram_range) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index as usize]))
            .collect();
        entries.sort_by_key(|&(index, _)| index);

        let norm = entries
            .iter()
            .map(|&(_, v)| v * v)
            .sum::<f64>()
            .sqrt();

        let mut row = SparseVector::new();
        for (index, value) in entries {
            row.push(index, if norm > 0.0 { value / norm } else { value });
        }

        Ok(row)
    }

    /// Transform a batch of documents, preserving order.
    pub fn transform_all(&self, documents: &[String]) -> Result<Vec<SparseVector>> {
        documents
            .par_iter()
            .map(|doc| self.transform(doc))
            .collect()
    }

    /// Fit over the corpus and transform every document.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform_all(documents)
    }
}

/// Produce the n-grams of a whitespace-tokenized document.
fn ngrams(document: &str, (min_n, max_n): (usize, usize)) -> Vec<String> {
    let tokens: Vec<&str> = document.split_whitespace().collect();
    let mut terms = Vec::new();

    for n in min_n..=max_n {
        if n == 0 || tokens.len() < n {
            continue;
        }
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }

    terms
}
