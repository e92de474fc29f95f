use crate::analysis::LogSummary;
use std::path::Path;
use tracing::info;

pub fn analyze(log_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %log_path.display(), "Analyzing window log");
    let summary = LogSummary::from_path(log_path)?;
    print!("{}", summary.render());
    Ok(())
}
