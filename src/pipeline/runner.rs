use crate::ingest::{BatchSource, SourceError};
use crate::pipeline::channel::{create_channel, Sender};
use crate::record::{FlushError, FlushReport};
use crate::window::{Step, WindowEngine};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Errors that can occur during pipeline operation
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("flush error: {0}")]
    Flush(#[from] FlushError),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub batches_ingested: u64,
    pub windows_emitted: u64,
    pub flush: FlushReport,
}

/// Run the ingestion task.
///
/// Pulls batches from the source and queues them in arrival order until the
/// shutdown signal fires or the engine side of the queue goes away.
pub async fn run_ingest<S>(
    mut source: S,
    output: Sender,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), SourceError>
where
    S: BatchSource,
{
    info!("Ingestion started");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                debug!("Shutdown signal received by ingestion");
                break;
            }

            result = source.next_batch() => {
                let batch = result?;
                if output.send(batch).await.is_err() {
                    debug!("Batch channel closed");
                    break;
                }
            }
        }
    }

    info!("Ingestion stopped");
    Ok(())
}

/// Drive one run: ingest on a spawned task, window on this one, flush once.
///
/// Batches are applied to the engine one at a time in queue order, so window
/// compositions never overlap and records reach the log in window order. The
/// log is flushed only after the engine signals shutdown; if the source fails
/// first, its error is returned and nothing is written.
pub async fn run_pipeline<S>(
    source: S,
    mut engine: WindowEngine,
    channel_capacity: usize,
) -> Result<RunSummary, PipelineError>
where
    S: BatchSource + 'static,
{
    let (batch_tx, mut batch_rx) = create_channel(channel_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ingest_handle = tokio::spawn(run_ingest(source, batch_tx, shutdown_rx));

    info!("Window engine started");

    let mut shutdown = false;
    while let Some(batch) = batch_rx.recv().await {
        if engine.ingest(batch) == Step::Shutdown {
            shutdown = true;
            break;
        }
    }

    if !shutdown {
        // Queue closed without a shutdown signal: ingestion ended on its own
        ingest_handle.await??;
        return Err(SourceError::Closed.into());
    }

    let _ = shutdown_tx.send(true);
    drop(batch_rx);

    match ingest_handle.await {
        Ok(Ok(())) => debug!("Ingestion task completed"),
        Ok(Err(e)) => warn!(error = %e, "Source error after shutdown"),
        Err(e) => warn!(error = %e, "Ingestion task join error"),
    }

    let batches_ingested = engine.batches_ingested();
    let windows_emitted = engine.windows_emitted();
    let flush = tokio::task::spawn_blocking(move || engine.finish()).await??;

    info!(
        batches = batches_ingested,
        windows = windows_emitted,
        "Pipeline shutdown complete"
    );

    Ok(RunSummary {
        batches_ingested,
        windows_emitted,
        flush,
    })
}
