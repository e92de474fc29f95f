use serde::{Deserialize, Serialize};
use std::fmt;

/// Two adjacent tokens from the same line. Serializes as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Bigram(pub String, pub String);

impl Bigram {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self(first.into(), second.into())
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

impl fmt::Display for Bigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', '{}')", self.0, self.1)
    }
}

/// Pair every token with its successor. Fewer than two tokens yield nothing.
pub fn bigrams(tokens: &[String]) -> Vec<Bigram> {
    tokens
        .windows(2)
        .map(|pair| Bigram(pair[0].clone(), pair[1].clone()))
        .collect()
}
