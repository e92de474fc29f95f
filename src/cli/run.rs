use crate::config::parse::{load_config, validate_config, ConfigError};
use crate::config::types::{Config, SourceType};
use crate::ingest::{LineBatchSource, SourceError};
use crate::pipeline::{run_pipeline, PipelineError, RunSummary};
use crate::window::WindowEngine;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Command-line replacements for the `source` section
#[derive(Debug, Clone, Default)]
pub struct SourceOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub stdin: bool,
    pub file: Option<PathBuf>,
}

impl SourceOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.source.source_type = SourceType::Socket;
            config.source.host = host.clone();
        }
        if let Some(port) = self.port {
            config.source.source_type = SourceType::Socket;
            config.source.port = port;
        }
        if let Some(file) = &self.file {
            config.source.source_type = SourceType::File;
            config.source.path = Some(file.clone());
        }
        if self.stdin {
            config.source.source_type = SourceType::Stdin;
        }
    }
}

pub async fn run(
    config_path: Option<PathBuf>,
    overrides: SourceOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_effective_config(config_path.as_deref(), &overrides)?;
    let summary = execute(&config).await?;

    println!("JSON log file generated: {}", summary.flush.json_path.display());
    println!("Text log file generated: {}", summary.flush.text_path.display());
    Ok(())
}

/// Load the config file (or defaults), apply overrides and validate the result.
pub fn load_effective_config(
    config_path: Option<&Path>,
    overrides: &SourceOverrides,
) -> Result<Config, ConfigError> {
    let mut config = match config_path {
        Some(path) => {
            info!(config_path = %path.display(), "Loading configuration");
            load_config(path)?
        }
        None => {
            info!("No config file found, using defaults");
            Config::default()
        }
    };

    overrides.apply(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Open the configured source and run the pipeline until the stream goes quiet.
pub async fn execute(config: &Config) -> Result<RunSummary, RunError> {
    let engine = WindowEngine::from_config(config);
    let interval = config.source.batch_interval;
    let capacity = config.pipeline.channel_capacity;

    info!(
        source = ?config.source.source_type,
        window_span = config.window.window_span,
        slide_interval = config.window.slide_interval,
        threshold = config.termination.empty_batch_shutdown_threshold,
        "Starting window pipeline"
    );

    let summary = match config.source.source_type {
        SourceType::Socket => {
            let source =
                LineBatchSource::connect(&config.source.host, config.source.port, interval).await?;
            run_pipeline(source, engine, capacity).await?
        }
        SourceType::Stdin => {
            let source = LineBatchSource::stdin(interval)?;
            info!(source = source.name(), "Reading lines from standard input");
            run_pipeline(source, engine, capacity).await?
        }
        SourceType::File => {
            let path = config.source.path.as_deref().ok_or_else(|| {
                ConfigError::Validation("source.path is required for file sources".to_string())
            })?;
            let source = LineBatchSource::open_file(path, interval).await?;
            info!(source = source.name(), "Reading lines from file");
            run_pipeline(source, engine, capacity).await?
        }
    };

    Ok(summary)
}
