//! Linear support-vector classification with probability calibration.
//!
//! Multi-class training is one-vs-rest: one L1-loss linear SVC per
//! class, solved by dual coordinate descent, with a Platt sigmoid fit on
//! the training decision values when probability estimation is enabled.
//! Training is deterministic under a fixed seed regardless of how many
//! rayon threads the surrounding pipeline uses, since each binary
//! problem is solved sequentially with its own seeded permutation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{PigeonholeError, Result};
use crate::fusion::CombinedMatrix;
use crate::vectorizer::SparseVector;

/// Hyperparameters for the linear SVM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmConfig {
    /// Regularization strength (upper bound on dual variables).
    pub c: f64,
    /// Convergence tolerance on the projected gradient.
    pub tolerance: f64,
    /// Maximum passes over the training rows per binary problem.
    pub max_iterations: usize,
    /// Fit Platt sigmoids so `predict_proba` is available.
    pub probability: bool,
    /// Seed for the coordinate permutation.
    pub seed: u64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        SvmConfig {
            c: 1.0,
            tolerance: 1e-4,
            max_iterations: 1000,
            probability: true,
            seed: 42,
        }
    }
}

/// Model metadata for tracking artifact provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier.
    pub name: String,
    /// Model version.
    pub version: String,
    /// Training timestamp.
    pub trained_at: chrono::DateTime<chrono::Utc>,
    /// Number of training examples used.
    pub training_examples: usize,
    /// Model hyperparameters.
    pub hyperparameters: HashMap<String, f64>,
}

impl ModelMetadata {
    fn untrained(name: &str) -> Self {
        ModelMetadata {
            name: name.to_string(),
            version: crate::VERSION.to_string(),
            trained_at: chrono::Utc::now(),
            training_examples: 0,
            hyperparameters: HashMap::new(),
        }
    }
}

/// Platt sigmoid mapping decision values to probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PlattScaler {
    a: f64,
    b: f64,
}

impl PlattScaler {
    /// Fit the sigmoid `P(y=1 | f) = 1 / (1 + exp(a*f + b))` by
    /// regularized maximum likelihood (Newton with backtracking).
    fn fit(decisions: &[f64], positives: &[bool]) -> Self {
        let prior1 = positives.iter().filter(|&&p| p).count() as f64;
        let prior0 = positives.len() as f64 - prior1;

        let hi = (prior1 + 1.0) / (prior1 + 2.0);
        let lo = 1.0 / (prior0 + 2.0);
        let targets: Vec<f64> = positives
            .iter()
            .map(|&p| if p { hi } else { lo })
            .collect();

        let mut a = 0.0;
        let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
        let mut fval = objective(decisions, &targets, a, b);

        const SIGMA: f64 = 1e-12;
        for _ in 0..100 {
            let mut h11 = SIGMA;
            let mut h22 = SIGMA;
            let mut h21 = 0.0;
            let mut g1 = 0.0;
            let mut g2 = 0.0;

            for (&f, &t) in decisions.iter().zip(&targets) {
                let f_ab = f * a + b;
                let (p, q) = if f_ab >= 0.0 {
                    let e = (-f_ab).exp();
                    (e / (1.0 + e), 1.0 / (1.0 + e))
                } else {
                    let e = f_ab.exp();
                    (1.0 / (1.0 + e), e / (1.0 + e))
                };
                let d2 = p * q;
                h11 += f * f * d2;
                h22 += d2;
                h21 += f * d2;
                let d1 = t - p;
                g1 += f * d1;
                g2 += d1;
            }

            if g1.abs() < 1e-5 && g2.abs() < 1e-5 {
                break;
            }

            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            let mut stepsize = 1.0;
            while stepsize >= 1e-10 {
                let new_a = a + stepsize * da;
                let new_b = b + stepsize * db;
                let new_f = objective(decisions, &targets, new_a, new_b);
                if new_f < fval + 1e-4 * stepsize * gd {
                    a = new_a;
                    b = new_b;
                    fval = new_f;
                    break;
                }
                stepsize /= 2.0;
            }
            if stepsize < 1e-10 {
                break;
            }
        }

        PlattScaler { a, b }
    }

    /// Calibrated probability for a decision value.
    fn probability(&self, decision: f64) -> f64 {
        let f_ab = decision * self.a + self.b;
        if f_ab >= 0.0 {
            let e = (-f_ab).exp();
            e / (1.0 + e)
        } else {
            1.0 / (1.0 + f_ab.exp())
        }
    }
}

/// Cross-entropy objective of the Platt sigmoid.
fn objective(decisions: &[f64], targets: &[f64], a: f64, b: f64) -> f64 {
    decisions
        .iter()
        .zip(targets)
        .map(|(&f, &t)| {
            let f_ab = f * a + b;
            if f_ab >= 0.0 {
                t * f_ab + (1.0 + (-f_ab).exp()).ln()
            } else {
                (t - 1.0) * f_ab + (1.0 + f_ab.exp()).ln()
            }
        })
        .sum()
}

/// One binary one-vs-rest classifier: dense weights plus folded bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinaryClassifier {
    weights: Vec<f64>,
    bias: f64,
    platt: Option<PlattScaler>,
}

impl BinaryClassifier {
    fn decision(&self, row: &SparseVector) -> f64 {
        row.dot(&self.weights) + self.bias
    }
}

/// Multi-class linear SVM classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmClassifier {
    config: SvmConfig,
    /// Class labels, sorted; classifier k separates class k from the rest.
    classes: Vec<String>,
    classifiers: Vec<BinaryClassifier>,
    n_features: usize,
    metadata: ModelMetadata,
}

impl SvmClassifier {
    /// Create an untrained classifier.
    pub fn new(config: SvmConfig) -> Self {
        SvmClassifier {
            config,
            classes: Vec::new(),
            classifiers: Vec::new(),
            n_features: 0,
            metadata: ModelMetadata::untrained("SvmClassifier"),
        }
    }

    /// Create an untrained classifier with default hyperparameters.
    pub fn with_defaults() -> Self {
        Self::new(SvmConfig::default())
    }

    /// Whether `fit` has completed.
    pub fn is_trained(&self) -> bool {
        !self.classifiers.is_empty()
    }

    /// Class labels in decision order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Training metadata.
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Train one-vs-rest on the combined feature matrix.
    pub fn fit(&mut self, x: &CombinedMatrix, y: &[String]) -> Result<()> {
        if x.n_rows() != y.len() {
            return Err(PigeonholeError::model(format!(
                "feature rows ({}) and labels ({}) must match",
                x.n_rows(),
                y.len()
            )));
        }
        if x.n_rows() == 0 {
            return Err(PigeonholeError::model("cannot train on an empty matrix"));
        }

        let mut classes: Vec<String> = y.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(PigeonholeError::model(
                "training data must contain at least two classes",
            ));
        }

        // Squared row norms with the folded bias feature included.
        let q: Vec<f64> = x.rows().iter().map(|row| row.squared_norm() + 1.0).collect();

        let mut classifiers = Vec::with_capacity(classes.len());
        for (k, class) in classes.iter().enumerate() {
            let signs: Vec<f64> = y
                .iter()
                .map(|label| if label == class { 1.0 } else { -1.0 })
                .collect();
            let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(k as u64));
            let mut clf = self.solve_binary(x, &signs, &q, &mut rng);

            if self.config.probability {
                let decisions: Vec<f64> = x.rows().iter().map(|row| clf.decision(row)).collect();
                let positives: Vec<bool> = signs.iter().map(|&s| s > 0.0).collect();
                clf.platt = Some(PlattScaler::fit(&decisions, &positives));
            }

            classifiers.push(clf);
        }

        self.classes = classes;
        self.classifiers = classifiers;
        self.n_features = x.n_features();
        self.metadata.trained_at = chrono::Utc::now();
        self.metadata.training_examples = x.n_rows();
        self.metadata
            .hyperparameters
            .insert("c".to_string(), self.config.c);
        self.metadata
            .hyperparameters
            .insert("tolerance".to_string(), self.config.tolerance);

        Ok(())
    }

    /// Solve one binary problem by dual coordinate descent on the L1-loss
    /// SVC dual (Hsieh et al., 2008). The bias is folded in as a constant
    /// unit feature.
    fn solve_binary(
        &self,
        x: &CombinedMatrix,
        signs: &[f64],
        q: &[f64],
        rng: &mut StdRng,
    ) -> BinaryClassifier {
        let n = x.n_rows();
        let c = self.config.c;

        let mut alpha = vec![0.0_f64; n];
        let mut weights = vec![0.0_f64; x.n_features()];
        let mut bias = 0.0_f64;
        let mut order: Vec<usize> = (0..n).collect();

        for _ in 0..self.config.max_iterations {
            order.shuffle(rng);
            let mut max_violation = 0.0_f64;

            for &i in &order {
                let row = x.row(i);
                let g = signs[i] * (row.dot(&weights) + bias) - 1.0;

                let pg = if alpha[i] <= 0.0 {
                    g.min(0.0)
                } else if alpha[i] >= c {
                    g.max(0.0)
                } else {
                    g
                };

                max_violation = max_violation.max(pg.abs());
                if pg.abs() < 1e-12 {
                    continue;
                }

                let old = alpha[i];
                alpha[i] = (old - g / q[i]).clamp(0.0, c);
                let delta = (alpha[i] - old) * signs[i];
                if delta != 0.0 {
                    for (&idx, &value) in row.indices.iter().zip(&row.values) {
                        weights[idx as usize] += delta * value;
                    }
                    bias += delta;
                }
            }

            if max_violation < self.config.tolerance {
                break;
            }
        }

        BinaryClassifier {
            weights,
            bias,
            platt: None,
        }
    }

    /// Per-class decision values for one row.
    pub fn decision_function(&self, row: &SparseVector) -> Result<Vec<f64>> {
        self.check_row(row)?;
        Ok(self.classifiers.iter().map(|clf| clf.decision(row)).collect())
    }

    /// Predict the hard label for one row.
    pub fn predict_row(&self, row: &SparseVector) -> Result<String> {
        let decisions = self.decision_function(row)?;
        let mut best = 0;
        for (k, &d) in decisions.iter().enumerate() {
            if d > decisions[best] {
                best = k;
            }
        }
        Ok(self.classes[best].clone())
    }

    /// Predict hard labels for every row of a matrix.
    pub fn predict(&self, x: &CombinedMatrix) -> Result<Vec<String>> {
        x.rows().iter().map(|row| self.predict_row(row)).collect()
    }

    /// Calibrated class probabilities for one row, in `classes()` order.
    ///
    /// Fails when the classifier was trained with `probability: false`.
    pub fn predict_proba(&self, row: &SparseVector) -> Result<Vec<f64>> {
        self.check_row(row)?;

        let mut probabilities = Vec::with_capacity(self.classifiers.len());
        for clf in &self.classifiers {
            let platt = clf.platt.as_ref().ok_or_else(|| {
                PigeonholeError::model("probability estimation was not enabled at training time")
            })?;
            probabilities.push(platt.probability(clf.decision(row)));
        }

        let total: f64 = probabilities.iter().sum();
        if total > 0.0 {
            for p in &mut probabilities {
                *p /= total;
            }
        } else {
            let uniform = 1.0 / probabilities.len() as f64;
            probabilities.fill(uniform);
        }

        Ok(probabilities)
    }

    fn check_row(&self, row: &SparseVector) -> Result<()> {
        if !self.is_trained() {
            return Err(PigeonholeError::model("classifier has not been trained"));
        }
        if row
            .indices
            .last()
            .is_some_and(|&last| last as usize >= self.n_features)
        {
            return Err(PigeonholeError::model(format!(
                "row has {} feature columns but the model expects {}",
                row.indices.last().map(|&i| i + 1).unwrap_or(0),
                self.n_features
            )));
        }
        Ok(())
    }

    /// Save the trained classifier as a JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| {
            PigeonholeError::model(format!("cannot write model to {}: {e}", path.display()))
        })?;
        Ok(())
    }

    /// Load a classifier artifact from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PigeonholeError::model(format!("cannot read model from {}: {e}", path.display()))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
