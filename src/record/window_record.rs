use crate::text::Bigram;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramCount {
    pub bigram: Bigram,
    pub count: u64,
}

/// Statistics of one window. Created once per slide tick, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// 1-based, one per slide tick
    pub window_number: u64,

    /// Lines in the window, blank lines included
    pub sentence_count: usize,

    /// Raw lines in arrival order
    pub sentences: Vec<String>,

    /// Per-window counts; order carries no meaning
    pub bigrams: Vec<BigramCount>,
}

impl WindowRecord {
    pub fn count_of(&self, first: &str, second: &str) -> u64 {
        self.bigrams
            .iter()
            .find(|entry| entry.bigram.first() == first && entry.bigram.second() == second)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    /// Sum of all bigram counts in this window
    pub fn total_bigrams(&self) -> u64 {
        self.bigrams.iter().map(|entry| entry.count).sum()
    }
}

/// Top-level shape of the persisted JSON log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFile {
    pub windows: Vec<WindowRecord>,
}

impl LogFile {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
