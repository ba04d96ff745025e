//! Evaluation metrics and console report formatting.
//!
//! The confusion matrix is always rendered over the fixed category order
//! `[invoice, spam, promotion, discount]`; labels absent from the test
//! partition appear as all-zero rows and columns. Labels outside the
//! four known categories are counted in per-class metrics but never
//! matched against the fixed matrix axes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::CATEGORIES;

/// Fraction of predictions matching the true labels.
pub fn accuracy(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Precision, recall, F1, and support for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class report with macro and weighted averages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Per-class metrics, keyed by label in sorted order.
    pub per_class: BTreeMap<String, ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    total_support: usize,
}

/// Build a classification report over the union of observed labels.
pub fn classification_report(y_true: &[String], y_pred: &[String]) -> ClassificationReport {
    let mut labels: Vec<&String> = y_true.iter().chain(y_pred).collect();
    labels.sort();
    labels.dedup();

    let mut per_class = BTreeMap::new();
    for label in labels {
        let true_positive = y_true
            .iter()
            .zip(y_pred)
            .filter(|(t, p)| *t == label && *p == label)
            .count() as f64;
        let predicted = y_pred.iter().filter(|p| *p == label).count() as f64;
        let support = y_true.iter().filter(|t| *t == label).count();

        let precision = if predicted > 0.0 {
            true_positive / predicted
        } else {
            0.0
        };
        let recall = if support > 0 {
            true_positive / support as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        per_class.insert(
            label.clone(),
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            },
        );
    }

    let n_classes = per_class.len().max(1) as f64;
    let total_support: usize = per_class.values().map(|m| m.support).sum();
    let support_norm = total_support.max(1) as f64;

    let mut macro_avg = ClassMetrics {
        precision: 0.0,
        recall: 0.0,
        f1: 0.0,
        support: total_support,
    };
    let mut weighted_avg = macro_avg;

    for metrics in per_class.values() {
        macro_avg.precision += metrics.precision / n_classes;
        macro_avg.recall += metrics.recall / n_classes;
        macro_avg.f1 += metrics.f1 / n_classes;

        let weight = metrics.support as f64 / support_norm;
        weighted_avg.precision += metrics.precision * weight;
        weighted_avg.recall += metrics.recall * weight;
        weighted_avg.f1 += metrics.f1 * weight;
    }

    ClassificationReport {
        per_class,
        accuracy: accuracy(y_true, y_pred),
        macro_avg,
        weighted_avg,
        total_support,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .keys()
            .map(|label| label.len())
            .chain(["weighted avg".len()].into_iter())
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$}  precision    recall  f1-score   support",
            ""
        )?;
        writeln!(f)?;

        for (label, m) in &self.per_class {
            writeln!(
                f,
                "{label:>width$}       {:.2}      {:.2}      {:.2}  {:>8}",
                m.precision, m.recall, m.f1, m.support
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}                           {:.2}  {:>8}",
            "accuracy", self.accuracy, self.total_support
        )?;
        for (name, m) in [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            writeln!(
                f,
                "{name:>width$}       {:.2}      {:.2}      {:.2}  {:>8}",
                m.precision, m.recall, m.f1, m.support
            )?;
        }

        Ok(())
    }
}

/// A confusion matrix over a fixed label ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Axis labels, shared by rows (actual) and columns (predicted).
    pub labels: Vec<String>,
    /// `counts[i][j]` = rows with actual `labels[i]` predicted as `labels[j]`.
    pub counts: Vec<Vec<usize>>,
}

/// Compute the confusion matrix over the fixed category ordering.
///
/// Pairs whose actual or predicted label falls outside `labels` are
/// simply not counted on the missing axis.
pub fn confusion_matrix(y_true: &[String], y_pred: &[String], labels: &[&str]) -> ConfusionMatrix {
    let index: BTreeMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, &label)| (label, i))
        .collect();

    let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
    for (t, p) in y_true.iter().zip(y_pred) {
        if let (Some(&row), Some(&col)) = (index.get(t.as_str()), index.get(p.as_str())) {
            counts[row][col] += 1;
        }
    }

    ConfusionMatrix {
        labels: labels.iter().map(|&l| l.to_string()).collect(),
        counts,
    }
}

/// Confusion matrix over the four fixed email categories.
pub fn category_confusion_matrix(y_true: &[String], y_pred: &[String]) -> ConfusionMatrix {
    confusion_matrix(y_true, y_pred, &CATEGORIES)
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row_width = self
            .labels
            .iter()
            .map(|l| l.len() + "Actual ".len())
            .max()
            .unwrap_or(0);
        let col_width = self
            .labels
            .iter()
            .map(|l| l.len() + "Predicted ".len())
            .max()
            .unwrap_or(0);

        write!(f, "{:>row_width$}", "")?;
        for label in &self.labels {
            write!(f, "  {:>col_width$}", format!("Predicted {label}"))?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{:>row_width$}", format!("Actual {label}"))?;
            for count in row {
                write!(f, "  {count:>col_width$}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_accuracy() {
        let y_true = labels(&["spam", "invoice", "spam", "discount"]);
        let y_pred = labels(&["spam", "invoice", "invoice", "discount"]);
        assert_eq!(accuracy(&y_true, &y_pred), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_classification_report_values() {
        let y_true = labels(&["spam", "spam", "invoice", "invoice"]);
        let y_pred = labels(&["spam", "invoice", "invoice", "invoice"]);
        let report = classification_report(&y_true, &y_pred);

        let spam = &report.per_class["spam"];
        assert_eq!(spam.precision, 1.0);
        assert_eq!(spam.recall, 0.5);
        assert_eq!(spam.support, 2);

        let invoice = &report.per_class["invoice"];
        assert!((invoice.precision - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(invoice.recall, 1.0);

        assert!(report.accuracy > 0.0 && report.accuracy <= 1.0);
        assert!(report.macro_avg.f1 > 0.0);
    }

    #[test]
    fn test_report_display_contains_labels() {
        let y_true = labels(&["spam", "invoice"]);
        let y_pred = labels(&["spam", "invoice"]);
        let rendered = classification_report(&y_true, &y_pred).to_string();

        assert!(rendered.contains("precision"));
        assert!(rendered.contains("spam"));
        assert!(rendered.contains("invoice"));
        assert!(rendered.contains("accuracy"));
        assert!(rendered.contains("weighted avg"));
    }

    #[test]
    fn test_confusion_matrix_fixed_shape() {
        // Only two of the four categories are present.
        let y_true = labels(&["spam", "invoice", "spam"]);
        let y_pred = labels(&["spam", "spam", "spam"]);
        let matrix = category_confusion_matrix(&y_true, &y_pred);

        assert_eq!(matrix.labels, CATEGORIES);
        assert_eq!(matrix.counts.len(), 4);
        assert!(matrix.counts.iter().all(|row| row.len() == 4));

        // invoice row: one misprediction as spam.
        assert_eq!(matrix.counts[0], vec![0, 1, 0, 0]);
        // spam row: both correct.
        assert_eq!(matrix.counts[1], vec![0, 2, 0, 0]);
        // promotion and discount rows all zero.
        assert_eq!(matrix.counts[2], vec![0, 0, 0, 0]);
        assert_eq!(matrix.counts[3], vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_unknown_labels_are_not_counted() {
        let y_true = labels(&["newsletter", "spam"]);
        let y_pred = labels(&["spam", "spam"]);
        let matrix = category_confusion_matrix(&y_true, &y_pred);

        let total: usize = matrix.counts.iter().flatten().sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn test_confusion_matrix_display_headers() {
        let y_true = labels(&["spam"]);
        let y_pred = labels(&["spam"]);
        let rendered = category_confusion_matrix(&y_true, &y_pred).to_string();

        assert!(rendered.contains("Actual invoice"));
        assert!(rendered.contains("Predicted discount"));
        let first_line = rendered.lines().next().unwrap();
        assert!(first_line.contains("Predicted invoice"));
    }
}
