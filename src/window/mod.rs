pub mod aggregator;
pub mod batch_buffer;
pub mod engine;
pub mod termination;

pub use aggregator::WindowAggregator;
pub use batch_buffer::{BatchBuffer, BufferStats};
pub use engine::{EngineSettings, Step, WindowEngine};
pub use termination::TerminationDetector;
