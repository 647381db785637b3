//! Line-oriented transports for JSON-RPC messages.

use crate::error::{McpError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Sends and receives newline-delimited JSON messages.
#[async_trait]
pub trait McpTransport: Send {
    /// Read the next message line. Returns `None` when the peer closed.
    async fn receive(&mut self) -> Result<Option<String>>;

    /// Write one message line.
    async fn send(&mut self, message: &str) -> Result<()>;
}

/// Serves over the current process's stdin/stdout.
pub struct StdioTransport {
    reader: BufReader<tokio::io::Stdin>,
    writer: tokio::io::Stdout,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            writer: tokio::io::stdout(),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn receive(&mut self) -> Result<Option<String>> {
        read_message(&mut self.reader).await
    }

    async fn send(&mut self, message: &str) -> Result<()> {
        write_message(&mut self.writer, message).await
    }
}

/// Talks to a spawned child process over its stdin/stdout.
pub struct ProcessTransport {
    // Owned so the server dies with the transport
    _child: Child,
    reader: BufReader<ChildStdout>,
    writer: ChildStdin,
}

impl ProcessTransport {
    /// Spawn `program` with piped stdio. The child is killed when dropped.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        tracing::info!(program = %program, ?args, "spawning tool server");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| McpError::ServerUnavailable(format!("{}: {}", program, e)))?;

        let writer = child.stdin.take().ok_or_else(|| {
            McpError::ServerUnavailable("Failed to capture server stdin".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            McpError::ServerUnavailable("Failed to capture server stdout".to_string())
        })?;

        Ok(Self {
            _child: child,
            reader: BufReader::new(stdout),
            writer,
        })
    }
}

#[async_trait]
impl McpTransport for ProcessTransport {
    async fn receive(&mut self) -> Result<Option<String>> {
        read_message(&mut self.reader).await
    }

    async fn send(&mut self, message: &str) -> Result<()> {
        write_message(&mut self.writer, message).await
    }
}

/// In-memory transport backed by channel pairs.
pub struct ChannelTransport {
    rx: tokio::sync::mpsc::Receiver<String>,
    tx: tokio::sync::mpsc::Sender<String>,
}

impl ChannelTransport {
    /// Create a pair of connected transports.
    ///
    /// Messages sent on one transport are received by the other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = tokio::sync::mpsc::channel(32);
        let (tx_b, rx_a) = tokio::sync::mpsc::channel(32);
        (Self { rx: rx_a, tx: tx_a }, Self { rx: rx_b, tx: tx_b })
    }
}

#[async_trait]
impl McpTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<String>> {
        Ok(self.rx.recv().await)
    }

    async fn send(&mut self, message: &str) -> Result<()> {
        self.tx
            .send(message.to_string())
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;
        Ok(())
    }
}

async fn read_message<R>(reader: &mut R) -> Result<Option<String>>
where
    R: tokio::io::AsyncBufRead + Unpin + Send,
{
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}

async fn write_message<W>(writer: &mut W, message: &str) -> Result<()>
where
    W: tokio::io::AsyncWrite + Unpin + Send,
{
    writer.write_all(message.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_transport_pair() {
        let (mut a, mut b) = ChannelTransport::pair();

        a.send("hello from a").await.unwrap();
        assert_eq!(b.receive().await.unwrap(), Some("hello from a".to_string()));

        b.send("hello from b").await.unwrap();
        assert_eq!(a.receive().await.unwrap(), Some("hello from b".to_string()));
    }

    #[tokio::test]
    async fn test_channel_transport_closed() {
        let (mut a, b) = ChannelTransport::pair();
        drop(b);
        assert_eq!(a.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_message_skips_blank_lines() {
        let mut input: &[u8] = b"\n  \n{\"a\":1}\n";
        assert_eq!(
            read_message(&mut input).await.unwrap(),
            Some("{\"a\":1}".to_string())
        );
        assert_eq!(read_message(&mut input).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let result = ProcessTransport::spawn("paperchat-definitely-not-a-program", &[]);
        assert!(result.is_err());
    }
}
