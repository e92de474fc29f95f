use crate::record::window_record::WindowRecord;
use std::fmt::Write;

/// Human-readable rendering of one window, terminated by a blank line.
pub fn render_window(record: &WindowRecord) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "Window {}:", record.window_number);
    let _ = writeln!(out, "Number of sentences: {}", record.sentence_count);
    let _ = writeln!(out, "Sentences:");
    for sentence in &record.sentences {
        let _ = writeln!(out, "  {}", sentence);
    }
    let _ = writeln!(out, "Bigrams and their co-occurrences count:");
    for entry in &record.bigrams {
        let _ = writeln!(out, "  {}: {}", entry.bigram, entry.count);
    }
    out.push('\n');
    out
}

pub fn render_log(records: &[WindowRecord]) -> String {
    records.iter().map(render_window).collect()
}
