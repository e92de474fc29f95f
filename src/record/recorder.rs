use crate::record::text::render_log;
use crate::record::window_record::{LogFile, WindowRecord};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FlushError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize log: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlushReport {
    pub windows: usize,
    pub json_path: PathBuf,
    pub text_path: PathBuf,
}

/// Owns the run's window records until the single flush at shutdown.
pub struct LogRecorder {
    json_path: PathBuf,
    text_path: PathBuf,
    records: Vec<WindowRecord>,
}

impl LogRecorder {
    pub fn new(json_path: impl Into<PathBuf>, text_path: impl Into<PathBuf>) -> Self {
        Self {
            json_path: json_path.into(),
            text_path: text_path.into(),
            records: Vec::new(),
        }
    }

    pub fn append(&mut self, record: WindowRecord) {
        debug_assert!(
            self.records
                .last()
                .map_or(true, |last| last.window_number < record.window_number),
            "window records must arrive in increasing order"
        );
        self.records.push(record);
    }

    pub fn records(&self) -> &[WindowRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write both log formats, replacing any previous files.
    ///
    /// Each file is staged next to its target and renamed into place only once
    /// both have been written. A previous JSON log is set aside until the text
    /// log is in place, so a failed flush leaves earlier files untouched.
    /// Consumes the recorder: the log cannot change or be flushed again.
    pub fn flush(self) -> Result<FlushReport, FlushError> {
        let log = LogFile {
            windows: self.records,
        };
        let json = serde_json::to_string_pretty(&log)?;
        let text = render_log(&log.windows);

        let json_tmp = staging_path(&self.json_path, "tmp");
        let text_tmp = staging_path(&self.text_path, "tmp");

        let staged = stage(&json_tmp, json.as_bytes())
            .and_then(|_| stage(&text_tmp, text.as_bytes()))
            .and_then(|_| commit_pair(&json_tmp, &self.json_path, &text_tmp, &self.text_path));

        if let Err(e) = staged {
            for tmp in [&json_tmp, &text_tmp] {
                if tmp.exists() {
                    if let Err(remove_err) = fs::remove_file(tmp) {
                        warn!(path = %tmp.display(), error = %remove_err, "Failed to remove staged log file");
                    }
                }
            }
            return Err(e);
        }

        info!(
            windows = log.windows.len(),
            json = %self.json_path.display(),
            text = %self.text_path.display(),
            "Log files written"
        );

        Ok(FlushReport {
            windows: log.windows.len(),
            json_path: self.json_path,
            text_path: self.text_path,
        })
    }
}

fn staging_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn stage(path: &Path, contents: &[u8]) -> Result<(), FlushError> {
    let io_err = |source| FlushError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, contents).map_err(io_err)
}

fn commit(staged: &Path, target: &Path) -> Result<(), FlushError> {
    fs::rename(staged, target).map_err(|source| FlushError::Io {
        path: target.to_path_buf(),
        source,
    })
}

/// Rename both staged files into place. If the text log cannot be committed,
/// the JSON log is rolled back to its previous contents (or removed when
/// there was none) so the pair always comes from the same run.
fn commit_pair(
    json_staged: &Path,
    json_target: &Path,
    text_staged: &Path,
    text_target: &Path,
) -> Result<(), FlushError> {
    let backup = staging_path(json_target, "bak");
    let had_previous = json_target.exists();
    if had_previous {
        commit(json_target, &backup)?;
    }

    if let Err(e) = commit(json_staged, json_target) {
        if had_previous {
            restore(&backup, json_target);
        }
        return Err(e);
    }

    if let Err(e) = commit(text_staged, text_target) {
        if had_previous {
            restore(&backup, json_target);
        } else if let Err(remove_err) = fs::remove_file(json_target) {
            warn!(path = %json_target.display(), error = %remove_err, "Failed to remove partial JSON log");
        }
        return Err(e);
    }

    if had_previous {
        if let Err(remove_err) = fs::remove_file(&backup) {
            warn!(path = %backup.display(), error = %remove_err, "Failed to remove JSON log backup");
        }
    }
    Ok(())
}

fn restore(backup: &Path, target: &Path) {
    if let Err(e) = fs::rename(backup, target) {
        warn!(
            backup = %backup.display(),
            path = %target.display(),
            error = %e,
            "Failed to restore previous JSON log"
        );
    }
}
