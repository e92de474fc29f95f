use crate::ingest::Batch;
use std::collections::VecDeque;

/// Holds the trailing `window_span` batches and tracks the slide cadence.
pub struct BatchBuffer {
    window_span: usize,
    slide_interval: usize,
    buffer: VecDeque<Batch>,
    arrivals: u64,
}

impl BatchBuffer {
    /// `slide_interval <= window_span` is a precondition enforced by config
    /// validation; a larger slide would skip batches between windows.
    pub fn new(window_span: usize, slide_interval: usize) -> Self {
        Self {
            window_span,
            slide_interval,
            buffer: VecDeque::with_capacity(window_span),
            arrivals: 0,
        }
    }

    /// Add a batch and evict anything that fell out of the window span.
    /// Returns true when this arrival lands on a slide boundary.
    ///
    /// Eviction counts arrivals, like the slide clock, so the window holds the
    /// last `window_span` batches whatever their sequence indices say.
    pub fn push(&mut self, batch: Batch) -> bool {
        debug_assert!(
            self.buffer
                .back()
                .map_or(true, |last| last.sequence_index < batch.sequence_index),
            "batches must arrive in increasing sequence order"
        );
        self.buffer.push_back(batch);
        self.arrivals += 1;

        while self.buffer.len() > self.window_span {
            self.buffer.pop_front();
        }

        self.is_slide_boundary()
    }

    pub fn is_slide_boundary(&self) -> bool {
        self.arrivals > 0 && self.arrivals % self.slide_interval as u64 == 0
    }

    /// Lines of every buffered batch, oldest batch first
    pub fn window_lines(&self) -> impl Iterator<Item = &str> {
        self.buffer
            .iter()
            .flat_map(|batch| batch.lines.iter().map(String::as_str))
    }

    pub fn stats(&self) -> BufferStats {
        BufferStats {
            buffered_batches: self.buffer.len(),
            window_span: self.window_span,
            oldest_sequence: self.buffer.front().map(|b| b.sequence_index),
            newest_sequence: self.buffer.back().map(|b| b.sequence_index),
            arrivals: self.arrivals,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferStats {
    pub buffered_batches: usize,
    pub window_span: usize,
    pub oldest_sequence: Option<u64>,
    pub newest_sequence: Option<u64>,
    pub arrivals: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_batch(sequence_index: u64, lines: &[&str]) -> Batch {
        Batch::new(
            sequence_index,
            Utc::now(),
            lines.iter().map(|l| l.to_string()).collect(),
        )
    }

    #[test]
    fn test_buffer_evicts_beyond_span() {
        let mut buffer = BatchBuffer::new(3, 2);

        for seq in 0..5 {
            buffer.push(make_batch(seq, &[]));
        }

        let stats = buffer.stats();
        assert_eq!(stats.buffered_batches, 3);
        assert_eq!(stats.oldest_sequence, Some(2));
        assert_eq!(stats.newest_sequence, Some(4));
        assert_eq!(stats.arrivals, 5);
    }

    #[test]
    fn test_slide_boundaries() {
        let mut buffer = BatchBuffer::new(3, 2);
        assert!(!buffer.is_slide_boundary());

        let ticks: Vec<bool> = (0..6).map(|seq| buffer.push(make_batch(seq, &[]))).collect();
        assert_eq!(ticks, vec![false, true, false, true, false, true]);
    }

    #[test]
    fn test_window_lines_in_arrival_order() {
        let mut buffer = BatchBuffer::new(3, 2);
        buffer.push(make_batch(0, &["a", "b"]));
        buffer.push(make_batch(1, &["c"]));
        buffer.push(make_batch(2, &[]));
        buffer.push(make_batch(3, &["d", "d"]));

        let lines: Vec<&str> = buffer.window_lines().collect();
        assert_eq!(lines, vec!["c", "d", "d"]);
    }

    #[test]
    fn test_partial_window_at_start() {
        let mut buffer = BatchBuffer::new(3, 2);
        buffer.push(make_batch(0, &["x"]));
        assert!(buffer.push(make_batch(1, &["y"])));

        let lines: Vec<&str> = buffer.window_lines().collect();
        assert_eq!(lines, vec!["x", "y"]);
        assert_eq!(buffer.stats().buffered_batches, 2);
    }

    #[test]
    fn test_tumbling_configuration() {
        let mut buffer = BatchBuffer::new(2, 2);
        buffer.push(make_batch(0, &["a"]));
        buffer.push(make_batch(1, &["b"]));
        buffer.push(make_batch(2, &["c"]));
        assert!(buffer.push(make_batch(3, &["d"])));

        let lines: Vec<&str> = buffer.window_lines().collect();
        assert_eq!(lines, vec!["c", "d"]);
    }

    #[test]
    fn test_gap_in_sequence_keeps_span_batches() {
        let mut buffer = BatchBuffer::new(3, 2);
        buffer.push(make_batch(0, &["a"]));
        buffer.push(make_batch(7, &["b"]));
        buffer.push(make_batch(8, &["c"]));
        buffer.push(make_batch(40, &["d"]));

        let lines: Vec<&str> = buffer.window_lines().collect();
        assert_eq!(lines, vec!["b", "c", "d"]);
        assert_eq!(buffer.stats().oldest_sequence, Some(7));
    }
}
