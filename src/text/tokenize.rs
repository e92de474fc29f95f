use regex::Regex;
use std::sync::OnceLock;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+").expect("word pattern compiles"))
}

/// Split one line into lower-cased word tokens.
///
/// A token is a maximal run of word characters (letters, digits, underscore);
/// everything else, including U+FFFD left behind by lossy decoding, separates
/// tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    let lowered = line.to_lowercase();
    word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}
