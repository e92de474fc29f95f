//! Summary statistics over a persisted window log.
//!
//! Reads the JSON log and reports sentence-count statistics per window, the
//! running average, a least-squares trend over window numbers, and bigram
//! totals summed across all windows.

use crate::record::LogFile;
use crate::text::Bigram;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read log: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse log: {0}")]
    Json(#[from] serde_json::Error),

    #[error("log contains no windows")]
    EmptyLog,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogSummary {
    pub total_windows: usize,
    pub total_sentences: usize,
    pub mean_sentences: f64,
    pub median_sentences: f64,
    pub min_sentences: usize,
    pub max_sentences: usize,
    /// Population standard deviation
    pub std_dev_sentences: f64,
    /// Mean of sentence counts up to and including each window
    pub running_average: Vec<f64>,
    /// None when fewer than two distinct window numbers exist
    pub trend: Option<Trend>,
    /// Summed across windows, highest count first
    pub bigram_totals: Vec<(Bigram, u64)>,
}

impl LogSummary {
    pub fn from_log(log: &LogFile) -> Result<Self, AnalysisError> {
        if log.windows.is_empty() {
            return Err(AnalysisError::EmptyLog);
        }

        let counts: Vec<usize> = log.windows.iter().map(|w| w.sentence_count).collect();
        let numbers: Vec<f64> = log.windows.iter().map(|w| w.window_number as f64).collect();
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();

        let n = values.len() as f64;
        let total_sentences: usize = counts.iter().sum();
        let mean = total_sentences as f64 / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut running_average = Vec::with_capacity(values.len());
        let mut running_sum = 0.0;
        for (i, value) in values.iter().enumerate() {
            running_sum += value;
            running_average.push(running_sum / (i + 1) as f64);
        }

        let mut totals: HashMap<&Bigram, u64> = HashMap::new();
        for window in &log.windows {
            for entry in &window.bigrams {
                *totals.entry(&entry.bigram).or_insert(0) += entry.count;
            }
        }
        let mut bigram_totals: Vec<(Bigram, u64)> = totals
            .into_iter()
            .map(|(bigram, count)| (bigram.clone(), count))
            .collect();
        bigram_totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            total_windows: counts.len(),
            total_sentences,
            mean_sentences: mean,
            median_sentences: median(&values),
            min_sentences: counts.iter().copied().min().unwrap_or(0),
            max_sentences: counts.iter().copied().max().unwrap_or(0),
            std_dev_sentences: variance.sqrt(),
            running_average,
            trend: linear_trend(&numbers, &values),
            bigram_totals,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_log(&LogFile::from_json(&text)?)
    }

    pub fn final_running_average(&self) -> f64 {
        self.running_average.last().copied().unwrap_or(0.0)
    }

    pub fn min_running_average(&self) -> f64 {
        self.running_average.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max_running_average(&self) -> f64 {
        self.running_average.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Plain-text report
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = writeln!(out, "Total Bigram Counts:");
        for (bigram, count) in &self.bigram_totals {
            let _ = writeln!(out, "  {}: {}", bigram, count);
        }

        let _ = writeln!(out, "\nMetrics:");
        let _ = writeln!(out, "Total number of windows: {}", self.total_windows);
        let _ = writeln!(out, "Total number of sentences: {}", self.total_sentences);
        let _ = writeln!(out, "Average sentences per window: {:.2}", self.mean_sentences);
        let _ = writeln!(out, "Median sentences per window: {:.2}", self.median_sentences);
        let _ = writeln!(out, "Minimum sentences in a window: {}", self.min_sentences);
        let _ = writeln!(out, "Maximum sentences in a window: {}", self.max_sentences);
        let _ = writeln!(
            out,
            "Standard deviation of sentences per window: {:.2}",
            self.std_dev_sentences
        );

        let _ = writeln!(out, "\nRunning Average Metrics:");
        let _ = writeln!(out, "Final running average: {:.2}", self.final_running_average());
        let _ = writeln!(out, "Minimum running average: {:.2}", self.min_running_average());
        let _ = writeln!(out, "Maximum running average: {:.2}", self.max_running_average());

        let _ = writeln!(out, "\nTrend Line:");
        match self.trend {
            Some(trend) => {
                let _ = writeln!(out, "Slope: {:.4}", trend.slope);
                let _ = writeln!(out, "Y-intercept: {:.4}", trend.intercept);
                let _ = writeln!(out, "Equation: y = {:.4}x + {:.4}", trend.slope, trend.intercept);
            }
            None => {
                let _ = writeln!(out, "Not enough windows for a trend line");
            }
        }
        out
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.is_empty() {
        0.0
    } else if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Ordinary least squares fit of `ys` against `xs`
fn linear_trend(xs: &[f64], ys: &[f64]) -> Option<Trend> {
    let n = xs.len() as f64;
    if xs.len() < 2 {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = sxy / sxx;
    Some(Trend {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}
