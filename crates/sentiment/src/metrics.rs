//! Evaluation metrics for a trained model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::label::SentimentLabel;

/// Precision/recall/F1 for one label on the held-out partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: SentimentLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Held-out classification report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    /// Support-weighted averages over labels present in truth or prediction.
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub per_class: Vec<ClassMetrics>,
}

impl ClassificationReport {
    pub fn compute(truth: &[SentimentLabel], predicted: &[SentimentLabel]) -> Self {
        debug_assert_eq!(truth.len(), predicted.len());
        let total = truth.len();
        if total == 0 {
            return Self {
                accuracy: 0.0,
                precision: 0.0,
                recall: 0.0,
                f1: 0.0,
                per_class: Vec::new(),
            };
        }

        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
        let labels: BTreeSet<SentimentLabel> = truth.iter().chain(predicted).copied().collect();

        let mut per_class = Vec::with_capacity(labels.len());
        let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
        for label in labels {
            let tp = truth
                .iter()
                .zip(predicted)
                .filter(|(t, p)| **t == label && **p == label)
                .count();
            let predicted_n = predicted.iter().filter(|p| **p == label).count();
            let support = truth.iter().filter(|t| **t == label).count();

            let p = ratio(tp, predicted_n);
            let r = ratio(tp, support);
            let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };

            let w = support as f64 / total as f64;
            precision += w * p;
            recall += w * r;
            f1 += w * f;

            per_class.push(ClassMetrics {
                label,
                precision: p,
                recall: r,
                f1: f,
                support,
            });
        }

        Self {
            accuracy: correct as f64 / total as f64,
            precision,
            recall,
            f1,
            per_class,
        }
    }
}

/// Everything recorded about a training run's model quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Mean k-fold cross-validation accuracy over the full corpus.
    pub cv_mean: f64,
    /// Population standard deviation of the fold accuracies.
    pub cv_std: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub per_class: Vec<ClassMetrics>,
}

impl TrainingMetrics {
    pub fn new(report: ClassificationReport, cv_scores: &[f64], train_size: usize, test_size: usize) -> Self {
        let (cv_mean, cv_std) = mean_std(cv_scores);
        Self {
            accuracy: report.accuracy,
            precision: report.precision,
            recall: report.recall,
            f1: report.f1,
            cv_mean,
            cv_std,
            train_size,
            test_size,
            per_class: report.per_class,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Mean and population standard deviation.
pub fn mean_std(xs: &[f64]) -> (f64, f64) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::*;

    #[test]
    fn perfect_predictions_score_one() {
        let y = [Positive, Negative, Neutral, Positive];
        let r = ClassificationReport::compute(&y, &y);
        assert_eq!((r.accuracy, r.precision, r.recall, r.f1), (1.0, 1.0, 1.0, 1.0));
        assert_eq!(r.per_class.len(), 3);
    }

    #[test]
    fn weighted_averages_follow_support() {
        let truth = [Positive, Positive, Positive, Negative];
        let pred = [Positive, Positive, Negative, Negative];
        let r = ClassificationReport::compute(&truth, &pred);

        assert_eq!(r.accuracy, 0.75);
        // positive: p=1, r=2/3; negative: p=1/2, r=1.
        assert!((r.precision - (0.75 * 1.0 + 0.25 * 0.5)).abs() < 1e-12);
        assert!((r.recall - (0.75 * (2.0 / 3.0) + 0.25 * 1.0)).abs() < 1e-12);
        let f_pos = 2.0 * (2.0 / 3.0) / (1.0 + 2.0 / 3.0);
        let f_neg = 2.0 * 0.5 / 1.5;
        assert!((r.f1 - (0.75 * f_pos + 0.25 * f_neg)).abs() < 1e-12);
    }

    #[test]
    fn labels_only_predicted_get_zero_weight() {
        let truth = [Positive, Positive];
        let pred = [Positive, Neutral];
        let r = ClassificationReport::compute(&truth, &pred);
        let neutral = r.per_class.iter().find(|c| c.label == Neutral).unwrap();
        assert_eq!(neutral.support, 0);
        assert_eq!(neutral.precision, 0.0);
        assert_eq!(r.precision, 1.0);
        assert_eq!(r.recall, 0.5);
    }

    #[test]
    fn population_standard_deviation() {
        let (mean, std) = mean_std(&[1.0, 0.5, 1.0, 0.5]);
        assert_eq!(mean, 0.75);
        assert_eq!(std, 0.25);
        assert_eq!(mean_std(&[]), (0.0, 0.0));
    }
}
