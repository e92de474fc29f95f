use crate::config::types::Config;
use crate::ingest::Batch;
use crate::record::{FlushError, FlushReport, LogRecorder, WindowRecord};
use crate::window::aggregator::WindowAggregator;
use crate::window::batch_buffer::BatchBuffer;
use crate::window::termination::TerminationDetector;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub window_span: usize,
    pub slide_interval: usize,
    pub empty_batch_shutdown_threshold: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            window_span: 3,
            slide_interval: 2,
            empty_batch_shutdown_threshold: 3,
        }
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            window_span: config.window.window_span,
            slide_interval: config.window.slide_interval,
            empty_batch_shutdown_threshold: config.termination.empty_batch_shutdown_threshold,
        }
    }
}

/// Outcome of feeding one batch to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Batch buffered, not on a slide boundary
    Buffered,
    /// Batch buffered and a window record appended to the log
    Emitted { window_number: u64 },
    /// Shutdown signaled; the batch was not buffered
    Shutdown,
}

/// Per-run state: termination check, buffer, aggregation and the log.
///
/// Each batch passes the termination detector first, then the buffer, and
/// on a slide boundary the aggregator composes a record for the recorder.
pub struct WindowEngine {
    detector: TerminationDetector,
    buffer: BatchBuffer,
    aggregator: WindowAggregator,
    recorder: LogRecorder,
    batches_ingested: u64,
}

impl WindowEngine {
    pub fn new(settings: EngineSettings, recorder: LogRecorder) -> Self {
        Self {
            detector: TerminationDetector::new(settings.empty_batch_shutdown_threshold),
            buffer: BatchBuffer::new(settings.window_span, settings.slide_interval),
            aggregator: WindowAggregator::new(),
            recorder,
            batches_ingested: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EngineSettings::from(config),
            LogRecorder::new(&config.output.json_path, &config.output.text_path),
        )
    }

    pub fn ingest(&mut self, batch: Batch) -> Step {
        if self.detector.is_signaled() {
            return Step::Shutdown;
        }

        self.batches_ingested += 1;
        debug!(
            sequence_index = batch.sequence_index,
            received_at = %batch.received_at,
            lines = batch.len(),
            "Received batch"
        );
        for line in &batch.lines {
            debug!(line = %line, "Batch line");
        }

        if self.detector.observe(&batch) {
            info!(
                sequence_index = batch.sequence_index,
                empty_batches = self.detector.consecutive_empty_count(),
                "Empty batch threshold reached, shutting down"
            );
            return Step::Shutdown;
        }

        if !self.buffer.push(batch) {
            return Step::Buffered;
        }

        let record = self.aggregator.aggregate(self.buffer.window_lines());
        let stats = self.buffer.stats();
        debug!(
            window_number = record.window_number,
            buffered_batches = stats.buffered_batches,
            oldest_sequence = ?stats.oldest_sequence,
            newest_sequence = ?stats.newest_sequence,
            arrivals = stats.arrivals,
            "Window span"
        );
        log_window(&record);

        let window_number = record.window_number;
        self.recorder.append(record);
        Step::Emitted { window_number }
    }

    pub fn is_shutdown(&self) -> bool {
        self.detector.is_signaled()
    }

    pub fn records(&self) -> &[WindowRecord] {
        self.recorder.records()
    }

    pub fn batches_ingested(&self) -> u64 {
        self.batches_ingested
    }

    pub fn windows_emitted(&self) -> u64 {
        self.aggregator.windows_emitted()
    }

    /// Flush the log. Consumes the engine, so no window can follow the flush.
    pub fn finish(self) -> Result<FlushReport, FlushError> {
        if self.recorder.is_empty() {
            info!(
                batches = self.batches_ingested,
                "No window was composed, writing empty logs"
            );
        }
        self.recorder.flush()
    }
}

fn log_window(record: &WindowRecord) {
    info!(
        window_number = record.window_number,
        sentences = record.sentence_count,
        distinct_bigrams = record.bigrams.len(),
        "Window composed"
    );
    for sentence in &record.sentences {
        debug!(window_number = record.window_number, sentence = %sentence, "Window sentence");
    }
    for entry in &record.bigrams {
        debug!(
            window_number = record.window_number,
            bigram = %entry.bigram,
            count = entry.count,
            "Window bigram"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> WindowEngine {
        WindowEngine::new(
            EngineSettings::default(),
            LogRecorder::new(dir.path().join("log.json"), dir.path().join("log.txt")),
        )
    }

    fn batch(sequence_index: u64, lines: &[&str]) -> Batch {
        Batch::new(
            sequence_index,
            Utc::now(),
            lines.iter().map(|l| l.to_string()).collect(),
        )
    }

    #[test]
    fn test_first_window_after_slide_interval() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        assert_eq!(engine.ingest(batch(0, &["the cat sat", "the dog ran"])), Step::Buffered);
        assert_eq!(
            engine.ingest(batch(1, &["the cat sat"])),
            Step::Emitted { window_number: 1 }
        );

        let record = &engine.records()[0];
        assert_eq!(record.sentence_count, 3);
        assert_eq!(record.count_of("the", "cat"), 2);
        assert_eq!(record.count_of("cat", "sat"), 2);
        assert_eq!(record.count_of("the", "dog"), 1);
        assert_eq!(record.count_of("dog", "ran"), 1);
    }

    #[test]
    fn test_overlapping_windows_share_one_batch() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        engine.ingest(batch(0, &["a b"]));
        engine.ingest(batch(1, &["c d"]));
        engine.ingest(batch(2, &["e f"]));
        engine.ingest(batch(3, &["g h"]));

        let records = engine.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sentences, vec!["c d", "e f", "g h"]);
        assert_eq!(records[1].count_of("a", "b"), 0);
        assert_eq!(records[1].count_of("c", "d"), 1);
    }

    #[test]
    fn test_threshold_batch_is_not_windowed() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        engine.ingest(batch(0, &["words here"]));
        engine.ingest(batch(1, &[]));
        engine.ingest(batch(2, &[""]));
        // Arrival 4 would be a slide boundary, but the detector fires first
        assert_eq!(engine.ingest(batch(3, &["  "])), Step::Shutdown);
        assert_eq!(engine.ingest(batch(4, &["after"])), Step::Shutdown);

        assert!(engine.is_shutdown());
        assert_eq!(engine.windows_emitted(), 1);
        assert_eq!(engine.batches_ingested(), 4);
    }

    #[test]
    fn test_finish_flushes_records() {
        let dir = TempDir::new().unwrap();
        let mut engine = engine(&dir);

        engine.ingest(batch(0, &["x y z"]));
        engine.ingest(batch(1, &[]));
        let report = engine.finish().unwrap();

        assert_eq!(report.windows, 1);
        assert!(report.json_path.exists());
        assert!(report.text_path.exists());
    }
}
