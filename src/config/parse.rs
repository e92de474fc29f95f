use super::types::*;
use crate::config::{expand_env_vars, expand_tilde, unexpanded_env_vars};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    load_config_str(&yaml_string)
}

/// Parse, expand and validate config from YAML text
pub fn load_config_str(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    // An empty document means every default
    let mut config: Config = if yaml_string.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&yaml_string)?
    };

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    // References inside full-line comments never reach a value
    let live: String = yaml_string
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let unexpanded = unexpanded_env_vars(&live);
    match unexpanded.as_slice() {
        [] => Ok(()),
        [single] => Err(ConfigError::Validation(format!(
            "environment variable $env{{{0}}} is not set; export {0} or replace it in the config file",
            single
        ))),
        many => Err(ConfigError::Validation(format!(
            "environment variables are not set: {}",
            many.join(", ")
        ))),
    }
}

fn expand_paths(config: &mut Config) {
    config.output.json_path = expand_tilde(&config.output.json_path);
    config.output.text_path = expand_tilde(&config.output.text_path);
    if let Some(path) = config.source.path.as_mut() {
        *path = expand_tilde(path);
    }
}

/// Check every constraint and report all violations together.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_source(&config.source, &mut errors);

    let window = &config.window;
    if window.window_span == 0 {
        errors.push("window.window_span must be at least 1".to_string());
    }
    if window.slide_interval == 0 {
        errors.push("window.slide_interval must be at least 1".to_string());
    }
    if window.slide_interval > window.window_span {
        errors.push(format!(
            "window.slide_interval ({}) must not exceed window.window_span ({}); batches between windows would be skipped",
            window.slide_interval, window.window_span
        ));
    }

    if config.termination.empty_batch_shutdown_threshold == 0 {
        errors.push("termination.empty_batch_shutdown_threshold must be at least 1".to_string());
    }

    if config.pipeline.channel_capacity == 0 {
        errors.push("pipeline.channel_capacity must be at least 1".to_string());
    }

    if config.output.json_path == config.output.text_path {
        errors.push(format!(
            "output.json_path and output.text_path must differ (both are '{}')",
            config.output.json_path.display()
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_source(source: &SourceConfig, errors: &mut Vec<String>) {
    if source.batch_interval.is_zero() {
        errors.push("source.batch_interval must be greater than zero".to_string());
    }

    match source.source_type {
        SourceType::Socket => {
            if source.host.trim().is_empty() {
                errors.push("source.host cannot be empty for socket sources".to_string());
            }
            if source.port == 0 {
                errors.push("source.port must be non-zero for socket sources".to_string());
            }
        }
        SourceType::File => {
            if source.path.is_none() {
                errors.push("source.path is required for file sources".to_string());
            }
        }
        SourceType::Stdin => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn validation_errors(yaml: &str) -> Vec<String> {
        match load_config_str(yaml) {
            Err(ConfigError::ValidationList(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = load_config_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.window.window_span, 3);
        assert_eq!(config.window.slide_interval, 2);
        assert_eq!(config.termination.empty_batch_shutdown_threshold, 3);
        assert_eq!(config.source.port, 9999);
        assert_eq!(config.source.batch_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = load_config_str(
            r#"
source:
  type: stdin
  batch_interval: 250ms
window:
  window_span: 4
"#,
        )
        .unwrap();

        assert_eq!(config.source.source_type, SourceType::Stdin);
        assert_eq!(config.source.batch_interval, Duration::from_millis(250));
        assert_eq!(config.window.window_span, 4);
        assert_eq!(config.window.slide_interval, 2);
        assert_eq!(config.output.json_path, PathBuf::from("output/output_log.json"));
    }

    #[test]
    fn test_slide_larger_than_span_rejected() {
        let errors = validation_errors(
            r#"
window:
  window_span: 2
  slide_interval: 3
"#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("slide_interval (3)"));
    }

    #[test]
    fn test_all_problems_reported_together() {
        let errors = validation_errors(
            r#"
source:
  type: file
  batch_interval: 0s
window:
  window_span: 0
  slide_interval: 0
termination:
  empty_batch_shutdown_threshold: 0
pipeline:
  channel_capacity: 0
output:
  json_path: same.log
  text_path: same.log
"#,
        );

        assert_eq!(errors.len(), 7);
        assert!(errors.iter().any(|e| e.contains("batch_interval")));
        assert!(errors.iter().any(|e| e.contains("source.path is required")));
        assert!(errors.iter().any(|e| e.contains("window_span must be at least 1")));
        assert!(errors.iter().any(|e| e.contains("slide_interval must be at least 1")));
        assert!(errors.iter().any(|e| e.contains("empty_batch_shutdown_threshold")));
        assert!(errors.iter().any(|e| e.contains("channel_capacity")));
        assert!(errors.iter().any(|e| e.contains("must differ")));
    }

    #[test]
    fn test_socket_port_zero_rejected() {
        let errors = validation_errors("source:\n  port: 0\n");
        assert!(errors[0].contains("source.port"));
    }

    #[test]
    fn test_unknown_source_type_is_parse_error() {
        let result = load_config_str("source:\n  type: kafka\n");
        assert!(matches!(result, Err(ConfigError::YamlParse(_))));
    }

    #[test]
    fn test_unset_env_var_reported() {
        let result = load_config_str("output:\n  json_path: $env{COOCCUR_UNSET_OUTPUT_DIR}/log.json\n");
        match result {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("COOCCUR_UNSET_OUTPUT_DIR")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_var_expanded_in_paths() {
        std::env::set_var("COOCCUR_TEST_OUT", "/var/tmp/cooccur");
        let config = load_config_str("output:\n  json_path: $env{COOCCUR_TEST_OUT}/log.json\n").unwrap();
        assert_eq!(config.output.json_path, PathBuf::from("/var/tmp/cooccur/log.json"));
        std::env::remove_var("COOCCUR_TEST_OUT");
    }

    #[test]
    fn test_env_reference_in_comment_ignored() {
        let yaml = "# set $env{COOCCUR_UNSET_IN_COMMENT} to move the logs\nwindow:\n  # $env{COOCCUR_UNSET_INDENTED}\n  window_span: 4\n";
        let config = load_config_str(yaml).unwrap();
        assert_eq!(config.window.window_span, 4);
    }

    #[test]
    fn test_starter_config_loads_without_env() {
        let config = load_config_str(&crate::config::generate::generate_starter_config()).unwrap();
        assert_eq!(config, Config::default());
    }
}
