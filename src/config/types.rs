use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub window: WindowConfig,
    pub termination: TerminationConfig,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub host: String,
    pub port: u16,
    /// Only used by `file` sources
    pub path: Option<PathBuf>,
    #[serde(with = "humantime_serde")]
    pub batch_interval: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source_type: SourceType::Socket,
            host: "localhost".to_string(),
            port: 9999,
            path: None,
            batch_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Socket,
    Stdin,
    File,
}

/// Both values are counted in batch intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub window_span: usize,
    pub slide_interval: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_span: 3,
            slide_interval: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationConfig {
    pub empty_batch_shutdown_threshold: u32,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            empty_batch_shutdown_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_path: PathBuf,
    pub text_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from("output/output_log.json"),
            text_path: PathBuf::from("output/output_log.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Batches queued between ingestion and windowing
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}
