// src/report.rs
//
// Sweep outputs that sit next to the chart: a JSON summary of the run and
// the full per-threshold curve as CSV.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::roc::{NotableKind, OperatingPoint, SweepResult};
use crate::traffic_data::{StationFile, TrafficDataset};

#[derive(Debug, Clone, Serialize)]
pub struct NotableEntry {
    pub kind: NotableKind,
    pub threshold_mph: u32,
    pub false_alarm_rate: f64,
    pub true_positive_rate: f64,
    pub distance_to_ideal: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub generated_at: DateTime<Utc>,
    pub input_dir: String,
    pub files: Vec<StationFile>,
    pub observations: u64,
    /// Rows per raw intent code before mapping to positive/negative.
    pub intent_codes: BTreeMap<u8, u64>,
    pub positives: u64,
    pub negatives: u64,
    pub min_speed_mph: u32,
    pub max_speed_mph: u32,
    pub thresholds_evaluated: usize,
    pub auc: f64,
    pub notable: Vec<NotableEntry>,
}

impl SweepReport {
    pub fn new(input_dir: &str, dataset: &TrafficDataset, result: &SweepResult) -> Self {
        let notable = result
            .notable
            .entries()
            .into_iter()
            .map(|(kind, point)| NotableEntry {
                kind,
                threshold_mph: point.threshold,
                false_alarm_rate: point.false_alarm_rate,
                true_positive_rate: point.true_positive_rate,
                distance_to_ideal: point.distance_to_ideal(),
                error_rate: point.counts.error_rate(result.observations),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            input_dir: input_dir.to_string(),
            files: dataset.files.clone(),
            observations: result.observations,
            intent_codes: dataset.intent_code_counts(),
            positives: result.positives,
            negatives: result.negatives,
            min_speed_mph: result.min_speed,
            max_speed_mph: result.max_speed,
            thresholds_evaluated: result.points.len(),
            auc: result.auc,
            notable,
        }
    }
}

pub fn save_report(report: &SweepReport, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Report saved to {}", path.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct CurveRow {
    threshold: u32,
    tp: u64,
    fp: u64,
    #[serde(rename = "fn")]
    fn_: u64,
    tn: u64,
    far: f64,
    tpr: f64,
    error_rate: f64,
}

pub fn save_curve_csv(points: &[OperatingPoint], observations: u64, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for p in points {
        wtr.serialize(CurveRow {
            threshold: p.threshold,
            tp: p.counts.true_positives,
            fp: p.counts.false_positives,
            fn_: p.counts.false_negatives,
            tn: p.counts.true_negatives,
            far: p.false_alarm_rate,
            tpr: p.true_positive_rate,
            error_rate: p.counts.error_rate(observations),
        })?;
    }
    wtr.flush()?;
    info!("💾 Curve ({} thresholds) saved to {}", points.len(), path.display());
    Ok(())
}

pub fn log_summary(result: &SweepResult) {
    info!("\n========================================");
    info!("ROC sweep summary");
    info!("========================================");
    info!(
        "  Observations: {} ({} target intent, {} benign)",
        result.observations, result.positives, result.negatives
    );
    info!(
        "  Thresholds: {}..={} mph ({} points)",
        result.min_speed,
        result.max_speed,
        result.points.len()
    );
    info!("  AUC: {:.4}", result.auc);

    for (kind, point) in result.notable.entries() {
        info!(
            "  {}: {} mph (FAR={:.3}, TPR={:.3}, error={:.1}%)",
            kind.label(),
            point.threshold,
            point.false_alarm_rate,
            point.true_positive_rate,
            100.0 * point.counts.error_rate(result.observations)
        );
    }
    if result.notable.last_perfect_tpr.is_none() {
        warn!("  No threshold reaches a perfect true positive rate");
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
