//! End-to-end scenarios for the training pipeline.

use std::fs;
use std::path::PathBuf;

use pigeonhole::dataset::CATEGORIES;
use pigeonhole::pipeline::{PipelineConfig, TrainingPipeline, load_vectorizer};
use pigeonhole::svm::SvmClassifier;

/// Write a small four-category dataset (20 minor variations per base
/// message) and return its path.
fn write_dataset(dir: &std::path::Path) -> PathBuf {
    let mut content = String::from("text,label\n");
    for i in 0..20 {
        content.push_str(&format!("Your invoice #12{i} is due,invoice\n"));
        content.push_str(&format!("50% OFF today!! deal {i},discount\n"));
        content.push_str(&format!("FREE $$$ now win {i},spam\n"));
        content.push_str(&format!("Special promo just for you friend {i},promotion\n"));
    }

    let path = dir.join("dataset.csv");
    fs::write(&path, content).unwrap();
    path
}

fn test_config(dir: &std::path::Path) -> PipelineConfig {
    let mut config = PipelineConfig::body_variant(write_dataset(dir));
    config.models_directory = dir.join("models");
    config
}

#[test]
fn full_pipeline_produces_report_and_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = TrainingPipeline::new(test_config(dir.path()));
    let outcome = pipeline.run().unwrap();

    // 80 unique rows, partitioned 80/20.
    assert_eq!(outcome.n_documents, 80);
    assert_eq!(outcome.n_train, 64);
    assert_eq!(outcome.n_test, 16);

    assert!(outcome.classifier_path.exists());
    assert!(outcome.vectorizer_path.exists());

    // Accuracy and every per-class metric stay in [0, 1].
    assert!((0.0..=1.0).contains(&outcome.evaluation.accuracy));
    assert!(!outcome.evaluation.report.per_class.is_empty());
    for metrics in outcome.evaluation.report.per_class.values() {
        assert!((0.0..=1.0).contains(&metrics.precision));
        assert!((0.0..=1.0).contains(&metrics.recall));
        assert!((0.0..=1.0).contains(&metrics.f1));
    }

    // The confusion matrix always carries the four fixed categories.
    assert_eq!(outcome.evaluation.confusion.labels, CATEGORIES);
    assert_eq!(outcome.evaluation.confusion.counts.len(), 4);

    // The rendered report names every category.
    let rendered = outcome.evaluation.to_string();
    for label in CATEGORIES {
        assert!(rendered.contains(label), "report missing label: {label}");
    }
    assert!(rendered.contains("Accuracy:"));
    assert!(rendered.contains("Actual invoice"));
    assert!(rendered.contains("Predicted discount"));
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let first = TrainingPipeline::new(config.clone()).run().unwrap();
    let second = TrainingPipeline::new(config).run().unwrap();

    assert_eq!(first.evaluation.accuracy, second.evaluation.accuracy);
    assert_eq!(
        first.evaluation.confusion.counts,
        second.evaluation.confusion.counts
    );
}

#[test]
fn persisted_artifacts_reproduce_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = TrainingPipeline::new(test_config(dir.path()));
    let outcome = pipeline.run().unwrap();

    let classifier = SvmClassifier::load(&outcome.classifier_path).unwrap();
    let vectorizer = load_vectorizer(&outcome.vectorizer_path).unwrap();

    // Rebuild the combined matrix from the reloaded vectorizer and
    // compare predictions on the same held-out partition.
    let documents = pipeline.load().unwrap();
    let normalized = pipeline.normalize(&documents);
    let scalars = pipeline.extract_features(&normalized);
    let lexical = vectorizer.transform_all(&normalized).unwrap();
    let matrix = pipeline
        .fuse(lexical, &scalars, vectorizer.vocabulary_size())
        .unwrap();
    let split = pipeline.split(matrix.n_rows()).unwrap();
    let x_test = matrix.select(&split.test_indices);

    assert_eq!(
        outcome.classifier.predict(&x_test).unwrap(),
        classifier.predict(&x_test).unwrap()
    );
}

#[test]
fn subject_variant_uses_its_own_artifact_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::subject_variant(write_dataset(dir.path()));
    config.models_directory = dir.path().join("models");

    let outcome = TrainingPipeline::new(config).run().unwrap();
    assert!(
        outcome
            .classifier_path
            .ends_with("svm_model_subject_discount.json")
    );
    assert!(
        outcome
            .vectorizer_path
            .ends_with("tfidf_vectorizer_subject_discount.json")
    );
}
