use crate::ingest::batch::Batch;
use crate::ingest::batcher::LineBatcher;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use std::io::Read;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::net::TcpStream;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

const PIPE_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source {target} unavailable: {source}")]
    Unavailable {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("batch source closed")]
    Closed,
}

/// Delivers batches in arrival order, one per call.
#[async_trait]
pub trait BatchSource: Send {
    async fn next_batch(&mut self) -> Result<Batch, SourceError>;
}

/// Reads newline-delimited text and cuts a batch every `batch_interval`.
///
/// Once the input is exhausted the source keeps producing empty batches at
/// the same cadence, so a quiet stream and a finished one look alike to the
/// consumer.
pub struct LineBatchSource<R> {
    name: String,
    reader: R,
    batcher: LineBatcher,
    ticker: Interval,
    // Partial line carried across cancelled reads
    buf: Vec<u8>,
    eof: bool,
}

enum SourceEvent {
    Tick,
    Read(std::io::Result<usize>),
}

impl<R> LineBatchSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(name: impl Into<String>, reader: R, batch_interval: Duration) -> Self {
        let mut ticker = interval_at(Instant::now() + batch_interval, batch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            name: name.into(),
            reader,
            batcher: LineBatcher::new(),
            ticker,
            buf: Vec::new(),
            eof: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the underlying reader has reported end of input
    pub fn is_drained(&self) -> bool {
        self.eof
    }

    fn take_line(&mut self) {
        let mut bytes = std::mem::take(&mut self.buf);
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        // Non-text bytes become U+FFFD and tokenize to nothing
        let line = String::from_utf8_lossy(&bytes).into_owned();
        self.batcher.push(line);
    }
}

impl LineBatchSource<BufReader<TcpStream>> {
    /// Connect as a client to a line server.
    pub async fn connect(
        host: &str,
        port: u16,
        batch_interval: Duration,
    ) -> Result<Self, SourceError> {
        let target = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&target)
            .await
            .map_err(|source| SourceError::Unavailable {
                target: target.clone(),
                source,
            })?;

        info!(addr = %target, "Connected to line source");
        Ok(Self::new(target, BufReader::new(stream), batch_interval))
    }
}

impl LineBatchSource<BufReader<DuplexStream>> {
    /// Read standard input on a detached thread. A read still blocked on a
    /// terminal when the run ends does not hold up runtime shutdown.
    pub fn stdin(batch_interval: Duration) -> Result<Self, SourceError> {
        Self::from_blocking_reader("stdin", std::io::stdin(), batch_interval)
    }

    /// Pump a blocking reader through an in-memory pipe from its own thread.
    /// Must be called from within a tokio runtime.
    pub fn from_blocking_reader<T>(
        name: impl Into<String>,
        mut reader: T,
        batch_interval: Duration,
    ) -> Result<Self, SourceError>
    where
        T: Read + Send + 'static,
    {
        let name = name.into();
        let (pipe_reader, mut pipe_writer) = tokio::io::duplex(PIPE_CAPACITY);
        let handle = tokio::runtime::Handle::current();
        let thread_name = name.clone();

        std::thread::Builder::new()
            .name(format!("cooccur-{}", name))
            .spawn(move || {
                let mut chunk = vec![0u8; 8192];
                loop {
                    let n = match reader.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            warn!(source = %thread_name, error = %e, "Blocking read failed");
                            break;
                        }
                    };
                    // The pipe's read half is gone once the run has ended
                    if handle.block_on(pipe_writer.write_all(&chunk[..n])).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self::new(name, BufReader::new(pipe_reader), batch_interval))
    }
}

impl LineBatchSource<BufReader<tokio::fs::File>> {
    pub async fn open_file(path: &Path, batch_interval: Duration) -> Result<Self, SourceError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|source| SourceError::Unavailable {
                target: path.display().to_string(),
                source,
            })?;

        Ok(Self::new(
            path.display().to_string(),
            BufReader::new(file),
            batch_interval,
        ))
    }
}

#[async_trait]
impl<R> BatchSource for LineBatchSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_batch(&mut self) -> Result<Batch, SourceError> {
        loop {
            let event = tokio::select! {
                biased;
                _ = self.ticker.tick() => SourceEvent::Tick,
                read = self.reader.read_until(b'\n', &mut self.buf), if !self.eof => {
                    SourceEvent::Read(read)
                }
            };

            match event {
                SourceEvent::Tick => {
                    let batch = self.batcher.cut(Utc::now());
                    debug!(
                        source = %self.name,
                        sequence_index = batch.sequence_index,
                        lines = batch.len(),
                        "Cut batch"
                    );
                    return Ok(batch);
                }
                SourceEvent::Read(read) => {
                    let bytes_read = read?;
                    if bytes_read == 0 {
                        self.eof = true;
                        if !self.buf.is_empty() {
                            self.take_line();
                        }
                        info!(source = %self.name, "Line source reached end of input");
                    } else if self.buf.last() == Some(&b'\n') {
                        self.take_line();
                    }
                }
            }
        }
    }
}

/// Replays pre-recorded batches, then idles with empty batches (or closes).
pub struct ReplaySource {
    batcher: LineBatcher,
    remaining: VecDeque<Vec<String>>,
    close_when_drained: bool,
}

impl ReplaySource {
    pub fn new<I, B, S>(batches: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            batcher: LineBatcher::new(),
            remaining: batches
                .into_iter()
                .map(|batch| batch.into_iter().map(Into::into).collect())
                .collect(),
            close_when_drained: false,
        }
    }

    /// Report `SourceError::Closed` instead of idling once drained
    pub fn closing(mut self) -> Self {
        self.close_when_drained = true;
        self
    }
}

#[async_trait]
impl BatchSource for ReplaySource {
    async fn next_batch(&mut self) -> Result<Batch, SourceError> {
        tokio::task::yield_now().await;

        let lines = match self.remaining.pop_front() {
            Some(lines) => lines,
            None if self.close_when_drained => return Err(SourceError::Closed),
            None => Vec::new(),
        };

        self.batcher.push_all(lines);
        Ok(self.batcher.cut(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_line_source_batches_then_idles() {
        let input: &[u8] = b"the cat sat\r\nthe dog ran\n\nno newline";
        let mut source = LineBatchSource::new("memory", input, Duration::from_millis(20));

        let first = source.next_batch().await.unwrap();
        assert_eq!(first.sequence_index, 0);
        assert_eq!(first.lines, vec!["the cat sat", "the dog ran", "", "no newline"]);
        assert!(source.is_drained());

        let second = source.next_batch().await.unwrap();
        assert_eq!(second.sequence_index, 1);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_line_source_decodes_lossily() {
        let input: &[u8] = b"caf\xe9 ok\n";
        let mut source = LineBatchSource::new("memory", input, Duration::from_millis(10));

        let batch = source.next_batch().await.unwrap();
        assert_eq!(batch.lines, vec!["caf\u{fffd} ok"]);
    }

    #[tokio::test]
    async fn test_connect_reads_from_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"hello world\nbye world\n").await.unwrap();
        });

        let mut source = LineBatchSource::connect("127.0.0.1", port, Duration::from_millis(100))
            .await
            .unwrap();
        server.await.unwrap();

        let mut lines = Vec::new();
        while lines.len() < 2 {
            lines.extend(source.next_batch().await.unwrap().lines);
        }
        assert_eq!(lines, vec!["hello world", "bye world"]);
    }

    #[tokio::test]
    async fn test_connect_refused_is_unavailable() {
        // Bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = LineBatchSource::connect("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_replay_source_idles_after_script() {
        let mut source = ReplaySource::new(vec![vec!["a b"], vec![]]);

        assert_eq!(source.next_batch().await.unwrap().lines, vec!["a b"]);
        assert!(source.next_batch().await.unwrap().is_empty());
        let idle = source.next_batch().await.unwrap();
        assert!(idle.is_empty());
        assert_eq!(idle.sequence_index, 2);
    }

    #[tokio::test]
    async fn test_closing_replay_source_reports_closed() {
        let mut source = ReplaySource::new(vec![vec!["only"]]).closing();

        assert!(source.next_batch().await.is_ok());
        assert!(matches!(source.next_batch().await, Err(SourceError::Closed)));
    }

    /// Blocks until the paired sender is dropped
    struct HeldOpen(std::sync::mpsc::Receiver<()>);

    impl Read for HeldOpen {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_blocking_reader_delivers_lines_while_still_open() {
        let (hold, held) = std::sync::mpsc::channel();
        let input = std::io::Cursor::new(b"from a pipe\nsecond line\n".to_vec()).chain(HeldOpen(held));
        let mut source =
            LineBatchSource::from_blocking_reader("pipe", input, Duration::from_millis(50)).unwrap();

        let mut lines = Vec::new();
        while lines.len() < 2 {
            lines.extend(source.next_batch().await.unwrap().lines);
        }
        assert_eq!(lines, vec!["from a pipe", "second line"]);
        assert!(!source.is_drained());

        drop(hold);
        while !source.is_drained() {
            assert!(source.next_batch().await.unwrap().is_empty());
        }
    }

    #[test]
    fn test_blocked_reader_does_not_hold_runtime_shutdown() {
        let (_hold, held) = std::sync::mpsc::channel::<()>();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let started = std::time::Instant::now();
        runtime.block_on(async {
            let mut source =
                LineBatchSource::from_blocking_reader("held", HeldOpen(held), Duration::from_millis(10))
                    .unwrap();
            assert!(source.next_batch().await.unwrap().is_empty());
        });
        drop(runtime);

        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
