use crate::ingest::batch::Batch;
use chrono::{DateTime, Utc};

/// Collects lines between cadence ticks and cuts them into numbered batches.
pub struct LineBatcher {
    pending: Vec<String>,
    sequence_counter: u64,
}

impl LineBatcher {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            sequence_counter: 0,
        }
    }

    /// Add a line to the batch being built
    pub fn push(&mut self, line: String) {
        self.pending.push(line);
    }

    pub fn push_all(&mut self, lines: impl IntoIterator<Item = String>) {
        self.pending.extend(lines);
    }

    /// Complete the current batch, even if it holds no lines
    pub fn cut(&mut self, received_at: DateTime<Utc>) -> Batch {
        let batch = Batch::new(
            self.sequence_counter,
            received_at,
            std::mem::take(&mut self.pending),
        );
        self.sequence_counter += 1;
        batch
    }

    /// Number of lines waiting for the next cut
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Sequence index the next batch will carry
    pub fn sequence_counter(&self) -> u64 {
        self.sequence_counter
    }
}

impl Default for LineBatcher {
    fn default() -> Self {
        Self::new()
    }
}
