//! End-to-end training pipeline.
//!
//! One parameterized pipeline replaces the two legacy near-duplicate
//! training scripts: the configuration object selects the dataset path,
//! the artifact names, and the keyword list variant. Stages are explicit
//! methods with typed inputs and outputs so each can be exercised on its
//! own; `run` composes them in order.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::Normalizer;
use crate::dataset::{self, Document};
use crate::error::{PigeonholeError, Result};
use crate::features::{FeatureExtractor, KeywordVariant, ScalarFeatures};
use crate::fusion::{self, CombinedMatrix};
use crate::metrics::{self, ClassificationReport, ConfusionMatrix};
use crate::model_selection::{self, TrainTestSplit};
use crate::svm::{SvmClassifier, SvmConfig};
use crate::vectorizer::{SparseVector, TfIdfVectorizer, VectorizerConfig};

/// Configuration for one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Path to the labeled CSV dataset.
    pub dataset_path: PathBuf,
    /// Directory receiving the serialized artifacts.
    pub models_directory: PathBuf,
    /// Artifact slot for the fitted classifier (file stem, no extension).
    pub classifier_artifact: String,
    /// Artifact slot for the fitted vectorizer (file stem, no extension).
    pub vectorizer_artifact: String,
    /// Which invoice keyword list the feature extractor uses.
    pub keyword_variant: KeywordVariant,
    /// Held-out fraction for evaluation.
    pub test_size: f64,
    /// Seed driving the split shuffle and the SVM permutation.
    pub seed: u64,
    /// TF-IDF vectorizer settings.
    pub vectorizer: VectorizerConfig,
    /// SVM hyperparameters.
    pub svm: SvmConfig,
}

impl PipelineConfig {
    /// Configuration matching the legacy message-body training run.
    pub fn body_variant<P: Into<PathBuf>>(dataset_path: P) -> Self {
        PipelineConfig {
            dataset_path: dataset_path.into(),
            models_directory: PathBuf::from("models"),
            classifier_artifact: "svm_model_discount".to_string(),
            vectorizer_artifact: "tfidf_vectorizer_discount".to_string(),
            keyword_variant: KeywordVariant::Body,
            test_size: 0.2,
            seed: 42,
            vectorizer: VectorizerConfig::default(),
            svm: SvmConfig::default(),
        }
    }

    /// Configuration matching the legacy subject-line training run.
    pub fn subject_variant<P: Into<PathBuf>>(dataset_path: P) -> Self {
        PipelineConfig {
            classifier_artifact: "svm_model_subject_discount".to_string(),
            vectorizer_artifact: "tfidf_vectorizer_subject_discount".to_string(),
            keyword_variant: KeywordVariant::Subject,
            ..Self::body_variant(dataset_path)
        }
    }

    fn artifact_path(&self, stem: &str) -> PathBuf {
        self.models_directory.join(format!("{stem}.json"))
    }
}

/// Evaluation outputs for the held-out partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub report: ClassificationReport,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SVM Classifier Results:")?;
        writeln!(f, "{}", self.report)?;
        writeln!(f, "Accuracy: {}", self.accuracy)?;
        writeln!(f)?;
        writeln!(f, "Confusion Matrix on Testing dataset:")?;
        write!(f, "{}", self.confusion)
    }
}

/// Everything a finished training run produces.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub classifier: SvmClassifier,
    pub vectorizer: TfIdfVectorizer,
    pub evaluation: Evaluation,
    pub n_documents: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub classifier_path: PathBuf,
    pub vectorizer_path: PathBuf,
}

/// The parameterized training pipeline.
pub struct TrainingPipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
    extractor: FeatureExtractor,
}

impl TrainingPipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: PipelineConfig) -> Self {
        let extractor = FeatureExtractor::for_variant(config.keyword_variant);
        TrainingPipeline {
            config,
            normalizer: Normalizer::new(),
            extractor,
        }
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load and deduplicate the configured dataset.
    pub fn load(&self) -> Result<Vec<Document>> {
        dataset::load_csv(&self.config.dataset_path)
    }

    /// Normalize raw document text, preserving order.
    pub fn normalize(&self, documents: &[Document]) -> Vec<String> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        self.normalizer.normalize_all(&texts)
    }

    /// Derive per-document scalar signals from normalized text.
    pub fn extract_features(&self, normalized: &[String]) -> Vec<ScalarFeatures> {
        self.extractor.extract_all(normalized)
    }

    /// Fit the TF-IDF vectorizer over the full corpus and transform it.
    ///
    /// Fitting runs over every row, not just the train split; the
    /// vocabulary and IDF weights therefore see the test partition. This
    /// reproduces the legacy protocol for parity with its results.
    pub fn vectorize(&self, normalized: &[String]) -> Result<(TfIdfVectorizer, Vec<SparseVector>)> {
        let mut vectorizer = TfIdfVectorizer::new(self.config.vectorizer.clone());
        let rows = vectorizer.fit_transform(normalized)?;
        Ok((vectorizer, rows))
    }

    /// Concatenate lexical rows and scalar signals.
    pub fn fuse(
        &self,
        lexical: Vec<SparseVector>,
        scalars: &[ScalarFeatures],
        vocab_len: usize,
    ) -> Result<CombinedMatrix> {
        fusion::fuse(lexical, scalars, vocab_len)
    }

    /// Deterministic train/test partition of `n` rows.
    pub fn split(&self, n_samples: usize) -> Result<TrainTestSplit> {
        model_selection::train_test_split(n_samples, self.config.test_size, self.config.seed)
    }

    /// Fit the classifier on the training rows.
    pub fn fit(
        &self,
        matrix: &CombinedMatrix,
        labels: &[String],
        split: &TrainTestSplit,
    ) -> Result<SvmClassifier> {
        let x_train = matrix.select(&split.train_indices);
        let y_train: Vec<String> = split
            .train_indices
            .iter()
            .map(|&i| labels[i].clone())
            .collect();

        let mut classifier = SvmClassifier::new(self.config.svm.clone());
        classifier.fit(&x_train, &y_train)?;
        Ok(classifier)
    }

    /// Evaluate the classifier on the held-out rows.
    pub fn evaluate(
        &self,
        classifier: &SvmClassifier,
        matrix: &CombinedMatrix,
        labels: &[String],
        split: &TrainTestSplit,
    ) -> Result<Evaluation> {
        let x_test = matrix.select(&split.test_indices);
        let y_test: Vec<String> = split
            .test_indices
            .iter()
            .map(|&i| labels[i].clone())
            .collect();

        let predictions = classifier.predict(&x_test)?;

        Ok(Evaluation {
            report: metrics::classification_report(&y_test, &predictions),
            accuracy: metrics::accuracy(&y_test, &predictions),
            confusion: metrics::category_confusion_matrix(&y_test, &predictions),
        })
    }

    /// Persist classifier and vectorizer under their artifact slots.
    ///
    /// Writes are plain file writes, not atomic renames; a run that dies
    /// mid-dump leaves a partial artifact behind.
    pub fn persist(
        &self,
        classifier: &SvmClassifier,
        vectorizer: &TfIdfVectorizer,
    ) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.config.models_directory)?;

        let classifier_path = self.config.artifact_path(&self.config.classifier_artifact);
        let vectorizer_path = self.config.artifact_path(&self.config.vectorizer_artifact);

        classifier.save(&classifier_path)?;
        save_vectorizer(vectorizer, &vectorizer_path)?;

        Ok((classifier_path, vectorizer_path))
    }

    /// Run every stage in order: load, normalize, extract, vectorize,
    /// fuse, split, fit, persist, evaluate.
    pub fn run(&self) -> Result<TrainingOutcome> {
        let documents = self.load()?;
        let labels: Vec<String> = documents.iter().map(|d| d.label.clone()).collect();

        let normalized = self.normalize(&documents);
        let scalars = self.extract_features(&normalized);
        let (vectorizer, lexical) = self.vectorize(&normalized)?;
        let matrix = self.fuse(lexical, &scalars, vectorizer.vocabulary_size())?;

        let split = self.split(matrix.n_rows())?;
        let classifier = self.fit(&matrix, &labels, &split)?;
        let (classifier_path, vectorizer_path) = self.persist(&classifier, &vectorizer)?;
        let evaluation = self.evaluate(&classifier, &matrix, &labels, &split)?;

        Ok(TrainingOutcome {
            n_documents: documents.len(),
            n_train: split.train_indices.len(),
            n_test: split.test_indices.len(),
            classifier,
            vectorizer,
            evaluation,
            classifier_path,
            vectorizer_path,
        })
    }
}

/// Save a fitted vectorizer as a JSON artifact.
pub fn save_vectorizer(vectorizer: &TfIdfVectorizer, path: &Path) -> Result<()> {
    if !vectorizer.is_fitted() {
        return Err(PigeonholeError::vectorizer(
            "refusing to persist an unfitted vectorizer",
        ));
    }
    let json = serde_json::to_string_pretty(vectorizer)?;
    fs::write(path, json).map_err(|e| {
        PigeonholeError::vectorizer(format!(
            "cannot write vectorizer to {}: {e}",
            path.display()
        ))
    })?;
    Ok(())
}

/// Load a vectorizer artifact from disk.
pub fn load_vectorizer(path: &Path) -> Result<TfIdfVectorizer> {
    let content = fs::read_to_string(path).map_err(|e| {
        PigeonholeError::vectorizer(format!(
            "cannot read vectorizer from {}: {e}",
            path.display()
        ))
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_configurations() {
        let body = PipelineConfig::body_variant("data.csv");
        assert_eq!(body.classifier_artifact, "svm_model_discount");
        assert_eq!(body.vectorizer_artifact, "tfidf_vectorizer_discount");
        assert_eq!(body.keyword_variant, KeywordVariant::Body);
        assert_eq!(body.test_size, 0.2);
        assert_eq!(body.seed, 42);

        let subject = PipelineConfig::subject_variant("data.csv");
        assert_eq!(subject.classifier_artifact, "svm_model_subject_discount");
        assert_eq!(
            subject.vectorizer_artifact,
            "tfidf_vectorizer_subject_discount"
        );
        assert_eq!(subject.keyword_variant, KeywordVariant::Subject);
    }

    #[test]
    fn test_artifact_paths() {
        let config = PipelineConfig::body_variant("data.csv");
        assert_eq!(
            config.artifact_path(&config.classifier_artifact),
            PathBuf::from("models/svm_model_discount.json")
        );
    }

    #[test]
    fn test_unfitted_vectorizer_is_not_persisted() {
        let vectorizer = TfIdfVectorizer::with_defaults();
        let err = save_vectorizer(&vectorizer, Path::new("/tmp/nope.json")).unwrap_err();
        assert!(err.to_string().contains("unfitted"));
    }
}
