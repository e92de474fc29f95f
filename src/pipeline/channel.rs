use crate::ingest::Batch;
use tokio::sync::mpsc;

pub type Sender = mpsc::Sender<Batch>;
pub type Receiver = mpsc::Receiver<Batch>;

/// Bounded batch queue; arrival order is preserved end to end
pub fn create_channel(capacity: usize) -> (Sender, Receiver) {
    mpsc::channel(capacity)
}
