pub mod batch;
pub mod batcher;
pub mod source;

pub use batch::Batch;
pub use batcher::LineBatcher;
pub use source::{BatchSource, LineBatchSource, ReplaySource, SourceError};
