use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const MIN_CHART_SIDE_PX: u32 = 200;
const MAX_CHART_SIDE_PX: u32 = 8192;
const MAX_SPEED_LIMIT_MPH: u32 = 1000;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise falls back to the built-in
    /// defaults. `ROC_INPUT_DIR` overrides the data directory either way.
    pub fn load_or_default(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let config = Self::load(path)?;
            info!("✓ Configuration loaded from {}", path);
            config
        } else {
            info!("No config at {}, using defaults", path);
            Config::default()
        };

        if let Ok(dir) = std::env::var("ROC_INPUT_DIR") {
            info!("Input directory overridden by ROC_INPUT_DIR: {}", dir);
            config.data.input_dir = dir;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.speed_column.trim().is_empty() || self.data.intent_column.trim().is_empty() {
            anyhow::bail!("data.speed_column and data.intent_column must be non-empty");
        }
        if self.data.extension.trim().is_empty() {
            anyhow::bail!("data.extension must be non-empty");
        }
        if self.output.width < MIN_CHART_SIDE_PX || self.output.height < MIN_CHART_SIDE_PX {
            anyhow::bail!(
                "chart must be at least {}x{} px, got {}x{}",
                MIN_CHART_SIDE_PX,
                MIN_CHART_SIDE_PX,
                self.output.width,
                self.output.height
            );
        }
        if self.output.width > MAX_CHART_SIDE_PX || self.output.height > MAX_CHART_SIDE_PX {
            anyhow::bail!(
                "chart must be at most {}x{} px, got {}x{}",
                MAX_CHART_SIDE_PX,
                MAX_CHART_SIDE_PX,
                self.output.width,
                self.output.height
            );
        }
        if self.data.max_speed == 0 || self.data.max_speed > MAX_SPEED_LIMIT_MPH {
            anyhow::bail!(
                "data.max_speed must be in 1..={}, got {}",
                MAX_SPEED_LIMIT_MPH,
                self.data.max_speed
            );
        }
        Ok(())
    }

    pub fn chart_path(&self) -> PathBuf {
        Path::new(&self.output.output_dir).join(&self.output.chart_file)
    }

    pub fn report_path(&self) -> PathBuf {
        Path::new(&self.output.output_dir).join(&self.output.report_file)
    }

    pub fn curve_path(&self) -> PathBuf {
        Path::new(&self.output.output_dir).join(&self.output.curve_file)
    }
}
