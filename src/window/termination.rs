use crate::ingest::Batch;

/// Watches for a run of blank batches and fires once when it reaches the threshold.
pub struct TerminationDetector {
    threshold: u32,
    consecutive_empty_count: u32,
    signaled: bool,
}

impl TerminationDetector {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            consecutive_empty_count: 0,
            signaled: false,
        }
    }

    /// Observe one batch. Returns true exactly once, on the batch that
    /// completes the run of blank batches; later calls return false.
    pub fn observe(&mut self, batch: &Batch) -> bool {
        if self.signaled {
            return false;
        }

        if batch.is_blank() {
            self.consecutive_empty_count += 1;
        } else {
            self.consecutive_empty_count = 0;
        }

        if self.consecutive_empty_count >= self.threshold {
            self.signaled = true;
        }
        self.signaled
    }

    pub fn consecutive_empty_count(&self) -> u32 {
        self.consecutive_empty_count
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled
    }
}
