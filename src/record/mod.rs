pub mod recorder;
pub mod text;
pub mod window_record;

pub use recorder::{FlushError, FlushReport, LogRecorder};
pub use window_record::{BigramCount, LogFile, WindowRecord};
