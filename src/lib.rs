//! # Pigeonhole
//!
//! An offline training pipeline that sorts email messages into one of four
//! categories (invoice, spam, promotion, discount).
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Text normalization pipeline (stopword removal, lemmatization)
//! - Surface-statistic scalar features fused with TF-IDF lexical features
//! - One-vs-rest linear SVM with Platt probability calibration
//! - Deterministic, seeded train/test evaluation
//! - JSON-serialized model and vectorizer artifacts

pub mod analysis;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod features;
pub mod fusion;
pub mod metrics;
pub mod model_selection;
pub mod pipeline;
pub mod svm;
pub mod vectorizer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
