use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub input_dir: String,
    pub extension: String,
    pub speed_column: String,
    pub intent_column: String,
    /// Rounded speeds above this are rejected as corrupt rows.
    pub max_speed: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input_dir: "./Traffic_Stations_for_HW_03".to_string(),
            extension: "csv".to_string(),
            speed_column: "SPEED".to_string(),
            intent_column: "INTENT".to_string(),
            max_speed: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: String,
    pub chart_file: String,
    pub report_file: String,
    pub curve_file: String,
    pub width: u32,
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            chart_file: "roc_curve.png".to_string(),
            report_file: "roc_report.json".to_string(),
            curve_file: "roc_curve.csv".to_string(),
            width: 900,
            height: 900,
        }
    }
}

/// Raw intent code recorded by the traffic stations.
///
/// Codes 0 and 1 are benign; code 2 is the target intent the sweep tries
/// to flag.
pub const TARGET_INTENT_CODE: u8 = 2;

/// Binary ground truth derived from the intent code at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    /// Maps a raw intent code to its label. Returns `None` for codes
    /// outside {0, 1, 2}.
    pub fn from_intent_code(code: u8) -> Option<Self> {
        match code {
            TARGET_INTENT_CODE => Some(Self::Positive),
            0 | 1 => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

/// One traffic record after loading: rounded speed plus its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub speed: u32,
    pub intent_code: u8,
    pub label: Label,
}

impl Observation {
    pub fn new(speed: u32, intent_code: u8) -> Option<Self> {
        let label = Label::from_intent_code(intent_code)?;
        Some(Self {
            speed,
            intent_code,
            label,
        })
    }

    pub fn is_positive(&self) -> bool {
        self.label == Label::Positive
    }
}
