use crate::record::{BigramCount, WindowRecord};
use crate::text::{bigrams, tokenize, Bigram};
use std::collections::HashMap;

/// Builds one record per slide tick. Counts start fresh for every window.
pub struct WindowAggregator {
    next_window_number: u64,
}

impl WindowAggregator {
    pub fn new() -> Self {
        Self {
            next_window_number: 1,
        }
    }

    pub fn windows_emitted(&self) -> u64 {
        self.next_window_number - 1
    }

    pub fn aggregate<'a, I>(&mut self, lines: I) -> WindowRecord
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sentences = Vec::new();
        let mut counts: HashMap<Bigram, u64> = HashMap::new();

        for line in lines {
            // Pairs never span two lines
            for bigram in bigrams(&tokenize(line)) {
                *counts.entry(bigram).or_insert(0) += 1;
            }
            sentences.push(line.to_string());
        }

        let mut bigram_counts: Vec<BigramCount> = counts
            .into_iter()
            .map(|(bigram, count)| BigramCount { bigram, count })
            .collect();
        bigram_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.bigram.cmp(&b.bigram)));

        let window_number = self.next_window_number;
        self.next_window_number += 1;

        WindowRecord {
            window_number,
            sentence_count: sentences.len(),
            sentences,
            bigrams: bigram_counts,
        }
    }
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self::new()
    }
}
