use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Monotonic arrival index
    /// Starts at 0, increments by 1 per batch
    pub sequence_index: u64,

    /// When the batch was cut
    pub received_at: DateTime<Utc>,

    /// Raw lines in arrival order (may be empty)
    pub lines: Vec<String>,
}

impl Batch {
    pub fn new(sequence_index: u64, received_at: DateTime<Utc>, lines: Vec<String>) -> Self {
        Self {
            sequence_index,
            received_at,
            lines,
        }
    }

    /// True when there are no lines, or every line is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
