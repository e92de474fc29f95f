pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# COOCCUR CONFIGURATION
# =============================================================================
# Every section and field is optional; omitted values take the defaults shown.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/cooccur/config.yml
#   3. /etc/cooccur/config.yml
#
# Paths may reference environment variables as $env{NAME} and may start with ~.

# =============================================================================
# SOURCE
# =============================================================================
# Where lines come from. Lines arriving during one batch_interval form a batch.
source:
  # 'socket' (connect to a line server), 'stdin', or 'file'
  type: socket
  host: localhost
  port: 9999
  # Required when type is 'file'
  # path: /var/log/sentences.txt
  batch_interval: 1s

# =============================================================================
# WINDOW
# =============================================================================
# Both values are counted in batches. A window covers the last window_span
# batches and a new window is composed every slide_interval batches.
# slide_interval must not exceed window_span.
window:
  window_span: 3
  slide_interval: 2

# =============================================================================
# TERMINATION
# =============================================================================
# The run ends after this many consecutive batches with only blank lines.
termination:
  empty_batch_shutdown_threshold: 3

# =============================================================================
# OUTPUT
# =============================================================================
# Written once when the run ends; existing files are replaced.
output:
  json_path: output/output_log.json
  text_path: output/output_log.txt

# =============================================================================
# PIPELINE
# =============================================================================
pipeline:
  # Batches queued between the reader and the window engine
  channel_capacity: 64
"#
    .to_string()
}
