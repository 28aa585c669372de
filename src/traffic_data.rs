// src/traffic_data.rs
//
// Station data loader. Walks the input directory for station CSV files,
// pulls the SPEED and INTENT columns out of each, and concatenates them
// into one dataset. Speeds are rounded to the nearest mph (ties to even,
// matching how the station exports were originally post-processed).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::DataError;
use crate::types::{DataConfig, Observation};

/// Per-file load statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StationFile {
    pub path: PathBuf,
    pub rows: usize,
}

/// All observations across every station file
#[derive(Debug, Clone, Default)]
pub struct TrafficDataset {
    pub observations: Vec<Observation>,
    pub files: Vec<StationFile>,
}

impl TrafficDataset {
    /// Row count per raw intent code.
    pub fn intent_code_counts(&self) -> BTreeMap<u8, u64> {
        let mut counts = BTreeMap::new();
        for obs in &self.observations {
            *counts.entry(obs.intent_code).or_insert(0) += 1;
        }
        counts
    }
}

pub struct TrafficLoader {
    config: DataConfig,
}

impl TrafficLoader {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    /// Recursively collects every file with the configured extension,
    /// sorted so the concatenation order is stable between runs.
    pub fn find_station_files(&self) -> Result<Vec<PathBuf>, DataError> {
        let root = Path::new(&self.config.input_dir);
        if !root.is_dir() {
            return Err(self.no_input_files());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = entry.map_err(|source| DataError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(&self.config.extension))
                .unwrap_or(false);
            if matches {
                files.push(path.to_path_buf());
            }
        }

        if files.is_empty() {
            return Err(self.no_input_files());
        }

        info!("Found {} station file(s) under {}", files.len(), root.display());
        Ok(files)
    }

    pub fn load(&self) -> Result<TrafficDataset, DataError> {
        let mut dataset = TrafficDataset::default();

        for path in self.find_station_files()? {
            let before = dataset.observations.len();
            self.read_station_file(&path, &mut dataset.observations)?;
            let rows = dataset.observations.len() - before;

            if rows == 0 {
                warn!("⚠️  {} has a header but no rows", path.display());
            } else {
                debug!("Loaded {} rows from {}", rows, path.display());
            }
            dataset.files.push(StationFile { path, rows });
        }

        info!(
            "✓ Loaded {} observations from {} file(s)",
            dataset.observations.len(),
            dataset.files.len()
        );
        Ok(dataset)
    }

    fn read_station_file(&self, path: &Path, out: &mut Vec<Observation>) -> Result<(), DataError> {
        let csv_err = |source: csv::Error| DataError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let file = std::fs::File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers().map_err(csv_err)?.clone();
        let speed_idx = self.column_index(&headers, &self.config.speed_column, path)?;
        let intent_idx = self.column_index(&headers, &self.config.intent_column, path)?;

        for (i, result) in reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            // Header is line 1, so data row i sits on line i + 2.
            let row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(i + 2);

            let raw_speed = record.get(speed_idx).unwrap_or("");
            let speed = parse_speed(raw_speed, self.config.max_speed).ok_or_else(|| {
                DataError::InvalidSpeed {
                    path: path.to_path_buf(),
                    row,
                    value: raw_speed.to_string(),
                }
            })?;

            let raw_intent = record.get(intent_idx).unwrap_or("");
            let observation = parse_intent(raw_intent)
                .and_then(|code| Observation::new(speed, code))
                .ok_or_else(|| DataError::InvalidIntent {
                    path: path.to_path_buf(),
                    row,
                    value: raw_intent.to_string(),
                })?;

            out.push(observation);
        }

        Ok(())
    }

    fn column_index(
        &self,
        headers: &csv::StringRecord,
        column: &str,
        path: &Path,
    ) -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })
    }

    fn no_input_files(&self) -> DataError {
        DataError::NoInputFiles {
            root: PathBuf::from(&self.config.input_dir),
            extension: self.config.extension.clone(),
        }
    }
}

/// Parses a raw speed and rounds it to whole mph, half to even.
/// Rejects empty, non-finite, negative and implausibly fast values.
fn parse_speed(raw: &str, max_speed: u32) -> Option<u32> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let rounded = value.round_ties_even();
    if rounded > max_speed as f64 {
        return None;
    }
    Some(rounded as u32)
}

/// Intent codes are integers but some exports write them as `2.0`.
fn parse_intent(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    if let Ok(code) = raw.parse::<u8>() {
        return Some(code);
    }
    let value: f64 = raw.parse().ok()?;
    if value.fract() == 0.0 && (0.0..=u8::MAX as f64).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}
