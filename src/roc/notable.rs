// src/roc/notable.rs
//
// Running selection of the four operating points worth calling out on the
// curve. The tracker is a plain accumulator folded over the sweep in
// ascending threshold order:
//
//   closest-to-ideal  smallest distance to (FAR=0, TPR=1), strict `<`
//   first-zero-FAR    first threshold with no false alarms, then frozen
//   last-perfect-TPR  overwritten each time every positive is caught
//   min-total-error   smallest (FN + FP) / N, strict `<`
//
// Strict comparisons mean the earliest threshold wins ties.

use serde::Serialize;
use std::f64::consts::SQRT_2;

use super::sweep::OperatingPoint;

/// A notable point plus the score it was selected on
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredPoint {
    pub point: OperatingPoint,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotableKind {
    ClosestToIdeal,
    FirstZeroFalseAlarm,
    LastPerfectRecall,
    MinTotalError,
}

impl NotableKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClosestToIdeal => "Point Closest to Ideal",
            Self::FirstZeroFalseAlarm => "First Zero False Alarm",
            Self::LastPerfectRecall => "Last Perfect Recall",
            Self::MinTotalError => "Fewest Total Mistakes",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NotablePoints {
    /// Score is the Euclidean distance to (0, 1).
    pub closest_to_ideal: Option<ScoredPoint>,
    pub first_zero_far: Option<OperatingPoint>,
    pub last_perfect_tpr: Option<OperatingPoint>,
    /// Score is (FN + FP) / observation count.
    pub min_total_error: Option<ScoredPoint>,
}

impl NotablePoints {
    pub fn from_points(points: &[OperatingPoint], observations: u64) -> Self {
        points
            .iter()
            .fold(NotableTracker::new(observations), |tracker, point| {
                tracker.observe(point)
            })
            .finish()
    }

    /// The points that were found, in a fixed display order.
    pub fn entries(&self) -> Vec<(NotableKind, OperatingPoint)> {
        let mut entries = Vec::with_capacity(4);
        if let Some(p) = self.closest_to_ideal {
            entries.push((NotableKind::ClosestToIdeal, p.point));
        }
        if let Some(p) = self.first_zero_far {
            entries.push((NotableKind::FirstZeroFalseAlarm, p));
        }
        if let Some(p) = self.last_perfect_tpr {
            entries.push((NotableKind::LastPerfectRecall, p));
        }
        if let Some(p) = self.min_total_error {
            entries.push((NotableKind::MinTotalError, p.point));
        }
        entries
    }
}

/// Fold state for [`NotablePoints::from_points`].
#[derive(Debug, Clone, Copy)]
pub struct NotableTracker {
    observations: u64,
    best_distance: f64,
    best_error_rate: f64,
    found: NotablePoints,
}

impl NotableTracker {
    pub fn new(observations: u64) -> Self {
        Self {
            observations,
            // (FAR=1, TPR=0) is the farthest a point can be from ideal.
            best_distance: SQRT_2,
            best_error_rate: 1.0,
            found: NotablePoints::default(),
        }
    }

    pub fn observe(mut self, point: &OperatingPoint) -> Self {
        let distance = point.distance_to_ideal();
        if distance < self.best_distance {
            self.best_distance = distance;
            self.found.closest_to_ideal = Some(ScoredPoint {
                point: *point,
                score: distance,
            });
        }

        if self.found.first_zero_far.is_none() && point.counts.false_positives == 0 {
            self.found.first_zero_far = Some(*point);
        }

        if point.counts.false_negatives == 0 {
            self.found.last_perfect_tpr = Some(*point);
        }

        let error_rate = point.counts.error_rate(self.observations);
        if error_rate < self.best_error_rate {
            self.best_error_rate = error_rate;
            self.found.min_total_error = Some(ScoredPoint {
                point: *point,
                score: error_rate,
            });
        }

        self
    }

    pub fn finish(self) -> NotablePoints {
        self.found
    }
}
