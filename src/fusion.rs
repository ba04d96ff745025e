//! Feature fusion: lexical rows concatenated with scalar signals.
//!
//! Each combined row is the document's sparse TF-IDF row followed by its
//! seven scalar values at columns `vocab_len .. vocab_len + 7`. Row order
//! stays aligned with the label sequence throughout.

use serde::{Deserialize, Serialize};

use crate::error::{PigeonholeError, Result};
use crate::features::ScalarFeatures;
use crate::vectorizer::SparseVector;

/// The fused feature matrix consumed by the trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedMatrix {
    rows: Vec<SparseVector>,
    n_features: usize,
}

impl CombinedMatrix {
    /// Build a matrix directly from sparse rows.
    ///
    /// Fails if any row carries an index outside `0..n_features`.
    pub fn from_rows(rows: Vec<SparseVector>, n_features: usize) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.indices.iter().any(|&idx| idx as usize >= n_features) {
                return Err(PigeonholeError::fusion(format!(
                    "row {i} has a column index outside 0..{n_features}"
                )));
            }
        }
        Ok(CombinedMatrix { rows, n_features })
    }

    /// Number of rows (documents).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (lexical vocabulary + scalar signals).
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Borrow one row.
    pub fn row(&self, index: usize) -> &SparseVector {
        &self.rows[index]
    }

    /// All rows in order.
    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    /// A new matrix containing the given rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> CombinedMatrix {
        CombinedMatrix {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            n_features: self.n_features,
        }
    }
}

/// Concatenate lexical rows with scalar feature values.
///
/// `vocab_len` is the realized vocabulary size of the vectorizer that
/// produced `lexical`. Fails when the two sources disagree on row count.
/// Zero-valued scalars are not stored (the rows stay sparse); the dense
/// meaning is identical.
pub fn fuse(
    lexical: Vec<SparseVector>,
    scalars: &[ScalarFeatures],
    vocab_len: usize,
) -> Result<CombinedMatrix> {
    if lexical.len() != scalars.len() {
        return Err(PigeonholeError::fusion(format!(
            "lexical rows ({}) and scalar rows ({}) must match",
            lexical.len(),
            scalars.len()
        )));
    }

    let n_features = vocab_len + ScalarFeatures::LEN;
    let mut rows = Vec::with_capacity(lexical.len());

    for (mut row, scalar) in lexical.into_iter().zip(scalars) {
        for (offset, value) in scalar.to_dense().into_iter().enumerate() {
            if value != 0.0 {
                row.push((vocab_len + offset) as u32, value);
            }
        }
        rows.push(row);
    }

    Ok(CombinedMatrix { rows, n_features })
}
