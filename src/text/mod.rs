pub mod bigram;
pub mod tokenize;

pub use bigram::{bigrams, Bigram};
pub use tokenize::tokenize;
