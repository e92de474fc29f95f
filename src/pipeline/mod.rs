pub mod channel;
pub mod runner;

pub use channel::{create_channel, Receiver, Sender};
pub use runner::{run_ingest, run_pipeline, PipelineError, RunSummary};
