// src/roc/sweep.rs
//
// Threshold sweep engine. Every integer speed from the slowest to the
// fastest observation is tried as a decision boundary ("flag anything
// faster than t"), yielding one ROC operating point per threshold.
//
// Counts come from a per-speed histogram with a running cumulative sum, so
// the sweep is O(N + range) instead of re-partitioning the dataset for
// every threshold. The tests check it against a direct partition.

use serde::Serialize;
use tracing::{debug, info};

use super::confusion::ConfusionCounts;
use super::notable::NotablePoints;
use crate::errors::SweepError;
use crate::types::{Label, Observation};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatingPoint {
    /// Speed in mph; observations strictly faster are flagged.
    pub threshold: u32,
    pub counts: ConfusionCounts,
    pub false_alarm_rate: f64,
    pub true_positive_rate: f64,
}

impl OperatingPoint {
    pub fn from_counts(threshold: u32, counts: ConfusionCounts) -> Result<Self, SweepError> {
        Ok(Self {
            threshold,
            counts,
            false_alarm_rate: counts.false_alarm_rate()?,
            true_positive_rate: counts.true_positive_rate()?,
        })
    }

    /// Euclidean distance to the ideal point (FAR=0, TPR=1).
    pub fn distance_to_ideal(&self) -> f64 {
        (self.false_alarm_rate.powi(2) + (self.true_positive_rate - 1.0).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub min_speed: u32,
    pub max_speed: u32,
    pub observations: u64,
    pub positives: u64,
    pub negatives: u64,
    /// One point per threshold, ascending.
    pub points: Vec<OperatingPoint>,
    pub notable: NotablePoints,
    pub auc: f64,
}

pub fn run_sweep(observations: &[Observation]) -> Result<SweepResult, SweepError> {
    let (min_speed, max_speed) = speed_range(observations).ok_or(SweepError::EmptyDataset)?;

    let positives = observations.iter().filter(|o| o.is_positive()).count() as u64;
    let total = observations.len() as u64;
    let negatives = total - positives;

    if positives == 0 {
        return Err(SweepError::DegenerateRate {
            missing: Label::Positive,
        });
    }
    if negatives == 0 {
        return Err(SweepError::DegenerateRate {
            missing: Label::Negative,
        });
    }

    info!(
        "Sweeping thresholds {}..={} mph over {} observations ({} positive, {} negative)",
        min_speed, max_speed, total, positives, negatives
    );

    // (positive, negative) counts per speed, indexed from min_speed
    let span = (max_speed - min_speed) as usize + 1;
    let mut histogram = vec![(0u64, 0u64); span];
    for obs in observations {
        let bucket = &mut histogram[(obs.speed - min_speed) as usize];
        match obs.label {
            Label::Positive => bucket.0 += 1,
            Label::Negative => bucket.1 += 1,
        }
    }

    let mut points = Vec::with_capacity(span);
    let mut below_positive = 0u64;
    let mut below_negative = 0u64;
    for (offset, (pos, neg)) in histogram.iter().enumerate() {
        below_positive += pos;
        below_negative += neg;

        let threshold = min_speed + offset as u32;
        let counts = ConfusionCounts {
            true_positives: positives - below_positive,
            false_positives: negatives - below_negative,
            false_negatives: below_positive,
            true_negatives: below_negative,
        };
        debug_assert_eq!(counts.total(), total);
        let point = OperatingPoint::from_counts(threshold, counts)?;
        debug!(
            "t={} FAR={:.4} TPR={:.4} {:?}",
            threshold, point.false_alarm_rate, point.true_positive_rate, counts
        );
        points.push(point);
    }

    let notable = NotablePoints::from_points(&points, total);
    let auc = area_under_curve(&points);

    Ok(SweepResult {
        min_speed,
        max_speed,
        observations: total,
        positives,
        negatives,
        points,
        notable,
        auc,
    })
}

fn speed_range(observations: &[Observation]) -> Option<(u32, u32)> {
    let min = observations.iter().map(|o| o.speed).min()?;
    let max = observations.iter().map(|o| o.speed).max()?;
    Some((min, max))
}

/// Trapezoidal area under the curve, anchored at (0,0) and (1,1).
pub fn area_under_curve(points: &[OperatingPoint]) -> f64 {
    let mut curve: Vec<(f64, f64)> = Vec::with_capacity(points.len() + 2);
    curve.push((0.0, 0.0));
    curve.extend(
        points
            .iter()
            .map(|p| (p.false_alarm_rate, p.true_positive_rate)),
    );
    curve.push((1.0, 1.0));
    curve.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    curve
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct partition of `observations` at `threshold`.
    fn counts_at(observations: &[Observation], threshold: u32) -> ConfusionCounts {
        observations
            .iter()
            .fold(ConfusionCounts::default(), |mut counts, obs| {
                match (obs.speed > threshold, obs.label) {
                    (true, Label::Positive) => counts.true_positives += 1,
                    (true, Label::Negative) => counts.false_positives += 1,
                    (false, Label::Positive) => counts.false_negatives += 1,
                    (false, Label::Negative) => counts.true_negatives += 1,
                }
                counts
            })
    }

    fn obs(speed: u32, intent: u8) -> Observation {
        Observation::new(speed, intent).unwrap()
    }

    /// Slow traffic is benign, fast traffic carries the target intent.
    fn separable() -> Vec<Observation> {
        [10, 20, 20, 30, 40, 50, 50, 60, 70, 80]
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                if s >= 50 {
                    obs(s, 2)
                } else {
                    obs(s, (i % 2) as u8)
                }
            })
            .collect()
    }

    /// Overlapping classes so rates move gradually.
    fn overlapping() -> Vec<Observation> {
        vec![
            obs(31, 0),
            obs(35, 1),
            obs(38, 0),
            obs(42, 2),
            obs(44, 1),
            obs(47, 0),
            obs(49, 2),
            obs(52, 1),
            obs(55, 2),
            obs(58, 2),
            obs(61, 0),
            obs(66, 2),
        ]
    }

    #[test]
    fn test_one_point_per_integer_threshold() {
        let result = run_sweep(&separable()).unwrap();
        assert_eq!(result.min_speed, 10);
        assert_eq!(result.max_speed, 80);
        assert_eq!(result.points.len(), 71);
        for (i, p) in result.points.iter().enumerate() {
            assert_eq!(p.threshold, 10 + i as u32);
        }
    }

    #[test]
    fn test_histogram_matches_direct_partition() {
        let data = overlapping();
        let result = run_sweep(&data).unwrap();
        for p in &result.points {
            assert_eq!(p.counts, counts_at(&data, p.threshold), "t={}", p.threshold);
        }
    }

    #[test]
    fn test_class_totals_constant_across_sweep() {
        let result = run_sweep(&overlapping()).unwrap();
        for p in &result.points {
            assert_eq!(p.counts.positives(), result.positives);
            assert_eq!(p.counts.negatives(), result.negatives);
            assert_eq!(p.counts.total(), result.observations);
        }
    }

    #[test]
    fn test_rates_non_increasing() {
        let result = run_sweep(&overlapping()).unwrap();
        for w in result.points.windows(2) {
            assert!(w[1].true_positive_rate <= w[0].true_positive_rate);
            assert!(w[1].false_alarm_rate <= w[0].false_alarm_rate);
        }
    }

    #[test]
    fn test_first_threshold_only_holds_min_speed_below() {
        let data = vec![obs(20, 0), obs(20, 2), obs(21, 1), obs(30, 2)];
        let result = run_sweep(&data).unwrap();
        let first = result.points[0].counts;
        assert_eq!(first.false_negatives + first.true_negatives, 2);
    }

    #[test]
    fn test_last_point_flags_nothing() {
        let result = run_sweep(&overlapping()).unwrap();
        let last = result.points.last().unwrap();
        assert_eq!(last.threshold, 66);
        assert_eq!(last.counts.true_positives, 0);
        assert_eq!(last.counts.false_positives, 0);
        assert_eq!(last.true_positive_rate, 0.0);
        assert_eq!(last.false_alarm_rate, 0.0);
    }

    #[test]
    fn test_separable_dataset_end_to_end() {
        let result = run_sweep(&separable()).unwrap();

        for p in &result.points {
            let perfect = (40..=49).contains(&p.threshold);
            assert_eq!(
                p.true_positive_rate == 1.0 && p.false_alarm_rate == 0.0,
                perfect,
                "t={}",
                p.threshold
            );
        }

        let notable = result.notable;
        assert_eq!(notable.first_zero_far.unwrap().threshold, 40);
        let closest = notable.closest_to_ideal.unwrap();
        assert_eq!(closest.point.threshold, 40);
        assert_eq!(closest.score, 0.0);
        assert_eq!(notable.last_perfect_tpr.unwrap().threshold, 49);
        let min_err = notable.min_total_error.unwrap();
        assert_eq!(min_err.point.threshold, 40);
        assert_eq!(min_err.score, 0.0);
        assert!((result.auc - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_total_error_is_global_minimum() {
        let result = run_sweep(&overlapping()).unwrap();
        let best = result.notable.min_total_error.unwrap();
        for p in &result.points {
            assert!(best.score <= p.counts.error_rate(result.observations));
        }
    }

    #[test]
    fn test_first_zero_far_is_smallest_such_threshold() {
        let result = run_sweep(&overlapping()).unwrap();
        let first = result.notable.first_zero_far.unwrap();
        // fastest negative is at 61
        assert_eq!(first.threshold, 61);
        assert!(result
            .points
            .iter()
            .filter(|p| p.threshold < first.threshold)
            .all(|p| p.false_alarm_rate > 0.0));
    }

    #[test]
    fn test_single_speed_dataset() {
        let result = run_sweep(&[obs(45, 2), obs(45, 0)]).unwrap();
        assert_eq!(result.points.len(), 1);
        assert_eq!(result.points[0].true_positive_rate, 0.0);
        assert!((result.auc - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_dataset_fails() {
        assert_eq!(run_sweep(&[]).unwrap_err(), SweepError::EmptyDataset);
    }

    #[test]
    fn test_single_class_dataset_is_degenerate() {
        let err = run_sweep(&[obs(40, 0), obs(50, 1)]).unwrap_err();
        assert_eq!(
            err,
            SweepError::DegenerateRate {
                missing: Label::Positive
            }
        );

        let err = run_sweep(&[obs(40, 2), obs(50, 2)]).unwrap_err();
        assert_eq!(
            err,
            SweepError::DegenerateRate {
                missing: Label::Negative
            }
        );
    }

    #[test]
    fn test_auc_of_chance_diagonal() {
        let points = [
            OperatingPoint::from_counts(
                1,
                ConfusionCounts {
                    true_positives: 1,
                    false_positives: 1,
                    false_negatives: 1,
                    true_negatives: 1,
                },
            )
            .unwrap(),
        ];
        assert!((area_under_curve(&points) - 0.5).abs() < 1e-12);
    }
}
