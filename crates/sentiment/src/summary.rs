//! Aggregate sentiment statistics for a set of analysis results.

use serde::{Deserialize, Serialize};

use crate::label::SentimentLabel;
use crate::result::AnalysisResult;

/// Average signed confidence above which overall sentiment reads as positive
/// (and below whose negation it reads as negative).
pub const OVERALL_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPercentages {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Dashboard view over stored review sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub total: usize,
    pub counts: LabelCounts,
    /// Percent of `total`, rounded to one decimal.
    pub percentages: LabelPercentages,
    /// Mean of `+confidence` for positive, `-confidence` for negative and 0 for neutral.
    pub average_score: f64,
    pub overall: SentimentLabel,
    pub message: String,
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 1000.0).round() / 10.0
}

impl SentimentSummary {
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a AnalysisResult>,
    {
        let mut counts = LabelCounts {
            positive: 0,
            negative: 0,
            neutral: 0,
        };
        let mut signed_sum = 0.0;
        for r in results {
            match r.sentiment_label {
                SentimentLabel::Positive => {
                    counts.positive += 1;
                    signed_sum += r.confidence_score;
                }
                SentimentLabel::Negative => {
                    counts.negative += 1;
                    signed_sum -= r.confidence_score;
                }
                SentimentLabel::Neutral => counts.neutral += 1,
            }
        }

        let total = counts.positive + counts.negative + counts.neutral;
        let average_score = if total == 0 { 0.0 } else { signed_sum / total as f64 };
        let overall = if average_score > OVERALL_THRESHOLD {
            SentimentLabel::Positive
        } else if average_score < -OVERALL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };
        let message = match (total, overall) {
            (0, _) => "No reviews analyzed yet".to_string(),
            (_, SentimentLabel::Positive) => "Customers are mostly happy with your products".to_string(),
            (_, SentimentLabel::Negative) => "Customers report problems that need attention".to_string(),
            (_, SentimentLabel::Neutral) => "Customer feedback is mixed".to_string(),
        };

        Self {
            total,
            percentages: LabelPercentages {
                positive: percent(counts.positive, total),
                negative: percent(counts.negative, total),
                neutral: percent(counts.neutral, total),
            },
            counts,
            average_score,
            overall,
            message,
        }
    }
}
