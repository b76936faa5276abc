//! Console input
//!
//! Reads terminal lines on a background task and turns them into events.
//! End of input and Ctrl-C both end the stream with a single `Close`.

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Line(String),
    Close,
}

pub struct ConsoleInput {
    events: mpsc::UnboundedReceiver<ConsoleEvent>,
    closed: bool,
}

impl ConsoleInput {
    /// Input from the process stdin, closed on EOF or Ctrl-C.
    pub fn stdin() -> Self {
        let (tx, events) = mpsc::unbounded_channel();

        spawn_reader(tokio::io::stdin(), tx.clone());

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    debug!("Interrupt received");
                    let _ = tx.send(ConsoleEvent::Close);
                }
                Err(e) => warn!("Failed to listen for interrupt: {}", e),
            }
        });

        Self {
            events,
            closed: false,
        }
    }

    /// Input from any async reader, closed on EOF.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, events) = mpsc::unbounded_channel();
        spawn_reader(reader, tx);
        Self {
            events,
            closed: false,
        }
    }

    /// Next line in arrival order. `Close` is returned exactly once; after
    /// that the future never resolves.
    pub async fn next_event(&mut self) -> ConsoleEvent {
        if self.closed {
            return std::future::pending().await;
        }

        match self.events.recv().await {
            Some(ConsoleEvent::Line(line)) => ConsoleEvent::Line(line),
            Some(ConsoleEvent::Close) | None => {
                self.closed = true;
                ConsoleEvent::Close
            }
        }
    }
}

fn spawn_reader<R>(reader: R, tx: mpsc::UnboundedSender<ConsoleEvent>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    debug!("Console input reached end of stream");
                    let _ = tx.send(ConsoleEvent::Close);
                    break;
                }
                Ok(_) => {
                    // invalid UTF-8 is replaced, not fatal
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches('\n')
                        .trim_end_matches('\r')
                        .to_string();
                    if tx.send(ConsoleEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read console input: {}", e);
                    let _ = tx.send(ConsoleEvent::Close);
                    break;
                }
            }
        }
    });
}
