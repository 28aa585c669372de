// src/roc/confusion.rs
//
// Confusion counts for a single speed threshold. Observations faster than
// the threshold are flagged; everything at or below it is not.

use serde::Serialize;

use crate::errors::SweepError;
use crate::types::Label;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounts {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_negatives: u64,
}

impl ConfusionCounts {
    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }

    /// TP + FN, constant across a sweep
    pub fn positives(&self) -> u64 {
        self.true_positives + self.false_negatives
    }

    /// FP + TN, constant across a sweep
    pub fn negatives(&self) -> u64 {
        self.false_positives + self.true_negatives
    }

    pub fn mistakes(&self) -> u64 {
        self.false_positives + self.false_negatives
    }

    /// TP / (TP + FN)
    pub fn true_positive_rate(&self) -> Result<f64, SweepError> {
        ratio(self.true_positives, self.positives()).ok_or(SweepError::DegenerateRate {
            missing: Label::Positive,
        })
    }

    /// FP / (FP + TN)
    pub fn false_alarm_rate(&self) -> Result<f64, SweepError> {
        ratio(self.false_positives, self.negatives()).ok_or(SweepError::DegenerateRate {
            missing: Label::Negative,
        })
    }

    /// Fraction of `observations` misclassified at this threshold.
    pub fn error_rate(&self, observations: u64) -> f64 {
        ratio(self.mistakes(), observations).unwrap_or(0.0)
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}
