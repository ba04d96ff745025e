//! Command line argument parsing for the Pigeonhole CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::features::KeywordVariant;

/// Pigeonhole - an offline email category training pipeline
#[derive(Parser, Debug, Clone)]
#[command(name = "pigeonhole")]
#[command(about = "Train an email category classifier from a labeled CSV dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PigeonholeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PigeonholeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a classifier and persist its artifacts
    Train(TrainArgs),
}

/// Arguments for a training run
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Path to the labeled CSV dataset (text,label columns, ISO-8859-1)
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Directory receiving the serialized artifacts
    #[arg(short, long, default_value = "models")]
    pub models_dir: PathBuf,

    /// Which built-in keyword list and artifact names to use
    #[arg(long, value_enum, default_value_t = Variant::Body)]
    pub variant: Variant,

    /// Override the classifier artifact name
    #[arg(long, value_name = "NAME")]
    pub classifier_name: Option<String>,

    /// Override the vectorizer artifact name
    #[arg(long, value_name = "NAME")]
    pub vectorizer_name: Option<String>,

    /// Seed for the train/test shuffle and the SVM permutation
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Held-out fraction for evaluation
    #[arg(long, default_value = "0.2")]
    pub test_size: f64,
}

/// Built-in pipeline variants
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Message-body pipeline (base keyword list)
    Body,
    /// Subject-line pipeline (keyword list plus `order`)
    Subject,
}

impl From<Variant> for KeywordVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Body => KeywordVariant::Body,
            Variant::Subject => KeywordVariant::Subject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let args = PigeonholeArgs::parse_from(["pigeonhole", "train", "data.csv"]);
        assert_eq!(args.verbosity(), 1);

        let args = PigeonholeArgs::parse_from(["pigeonhole", "-q", "train", "data.csv"]);
        assert_eq!(args.verbosity(), 0);

        let args = PigeonholeArgs::parse_from(["pigeonhole", "-vv", "train", "data.csv"]);
        assert_eq!(args.verbosity(), 2);
    }

    #[test]
    fn test_train_defaults() {
        let args = PigeonholeArgs::parse_from(["pigeonhole", "train", "data.csv"]);
        let Command::Train(train) = args.command;
        assert_eq!(train.dataset, PathBuf::from("data.csv"));
        assert_eq!(train.variant, Variant::Body);
        assert_eq!(train.seed, 42);
        assert_eq!(train.test_size, 0.2);
        assert!(train.classifier_name.is_none());
    }

    #[test]
    fn test_subject_variant_flag() {
        let args = PigeonholeArgs::parse_from(["pigeonhole", "train", "data.csv", "--variant", "subject"]);
        let Command::Train(train) = args.command;
        assert_eq!(train.variant, Variant::Subject);
    }
}
