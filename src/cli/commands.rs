//! Command implementations for the Pigeonhole CLI.

use crate::cli::args::*;
use crate::error::Result;
use crate::pipeline::{PipelineConfig, TrainingPipeline};

/// Execute a CLI command.
pub fn execute_command(args: PigeonholeArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
    }
}

/// Run a full training pipeline and print the evaluation report.
fn train(args: TrainArgs, cli_args: &PigeonholeArgs) -> Result<()> {
    let config = build_config(&args);
    let pipeline = TrainingPipeline::new(config);
    let verbosity = cli_args.verbosity();

    if verbosity > 0 {
        println!("Training from: {}", args.dataset.display());
    }

    // Staged execution so progress is visible between the heavy steps.
    let documents = pipeline.load()?;
    if verbosity > 1 {
        println!("read dataset ({} unique rows)", documents.len());
    }

    let labels: Vec<String> = documents.iter().map(|d| d.label.clone()).collect();
    let normalized = pipeline.normalize(&documents);
    let scalars = pipeline.extract_features(&normalized);
    let (vectorizer, lexical) = pipeline.vectorize(&normalized)?;
    if verbosity > 1 {
        println!(
            "vectorization done ({} terms)",
            vectorizer.vocabulary_size()
        );
    }

    let matrix = pipeline.fuse(lexical, &scalars, vectorizer.vocabulary_size())?;
    let split = pipeline.split(matrix.n_rows())?;
    if verbosity > 1 {
        println!(
            "split done ({} train / {} test)",
            split.train_indices.len(),
            split.test_indices.len()
        );
    }

    let classifier = pipeline.fit(&matrix, &labels, &split)?;
    if verbosity > 1 {
        println!("classifier fitted");
    }

    let (classifier_path, vectorizer_path) = pipeline.persist(&classifier, &vectorizer)?;
    if verbosity > 0 {
        println!("model dumped to {}", classifier_path.display());
        println!("vectorizer dumped to {}", vectorizer_path.display());
    }

    let evaluation = pipeline.evaluate(&classifier, &matrix, &labels, &split)?;
    println!("{evaluation}");

    Ok(())
}

fn build_config(args: &TrainArgs) -> PipelineConfig {
    let mut config = match args.variant {
        Variant::Body => PipelineConfig::body_variant(&args.dataset),
        Variant::Subject => PipelineConfig::subject_variant(&args.dataset),
    };

    config.models_directory = args.models_dir.clone();
    config.seed = args.seed;
    config.svm.seed = args.seed;
    config.test_size = args.test_size;
    if let Some(name) = &args.classifier_name {
        config.classifier_artifact = name.clone();
    }
    if let Some(name) = &args.vectorizer_name {
        config.vectorizer_artifact = name.clone();
    }

    config
}
