pub mod analysis;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod pipeline;
pub mod record;
pub mod text;
pub mod window;
