//! MCP transport layer.
//!
//! Messages are newline-delimited JSON. `receive` must be cancellation safe:
//! the server polls it inside `tokio::select!` alongside running tool calls.

use crate::error::McpError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, Stdin, Stdout};
use tokio::sync::mpsc;
use tokio_util::bytes::{Bytes, BytesMut};
use tokio_util::codec::{
    AnyDelimiterCodec, AnyDelimiterCodecError, Decoder, FramedRead, FramedWrite, LinesCodec,
};

/// Upper bound on a single inbound message.
const MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// One line read from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(String),
    /// A line that cannot be a message at all (not UTF-8, or over the length
    /// limit). The reader has already skipped past it.
    Malformed(String),
}

#[async_trait]
pub trait McpTransport: Send {
    /// Next line, or `None` once the peer has closed the transport.
    async fn receive(&mut self) -> Result<Option<Inbound>, McpError>;

    /// Write one message.
    async fn send(&mut self, message: &str) -> Result<(), McpError>;
}

/// Splits input on `\n` without ever failing on content: undecodable or
/// oversized lines come out as [`Inbound::Malformed`] and reading resumes at
/// the next line.
struct MessageCodec {
    inner: AnyDelimiterCodec,
    max_length: usize,
}

impl MessageCodec {
    fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), b"\n".to_vec(), max_length),
            max_length,
        }
    }

    fn frame(
        &self,
        decoded: Result<Option<Bytes>, AnyDelimiterCodecError>,
    ) -> Result<Option<Inbound>, McpError> {
        match decoded {
            Ok(Some(line)) => Ok(Some(match String::from_utf8(line.to_vec()) {
                Ok(text) => Inbound::Message(text),
                Err(_) => Inbound::Malformed("line is not valid UTF-8".to_string()),
            })),
            Ok(None) => Ok(None),
            Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Inbound::Malformed(
                format!("line exceeds {} bytes", self.max_length),
            ))),
            Err(AnyDelimiterCodecError::Io(e)) => Err(e.into()),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Inbound;
    type Error = McpError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, McpError> {
        let decoded = self.inner.decode(buf);
        self.frame(decoded)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Inbound>, McpError> {
        let decoded = self.inner.decode_eof(buf);
        self.frame(decoded)
    }
}

/// Newline-delimited transport over any byte stream pair.
pub struct LineTransport<R, W> {
    reader: FramedRead<R, MessageCodec>,
    writer: FramedWrite<W, LinesCodec>,
}

/// Transport over the process's stdin/stdout.
pub type StdioTransport = LineTransport<Stdin, Stdout>;

impl LineTransport<Stdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_max_line_length(reader, writer, MAX_LINE_LENGTH)
    }

    fn with_max_line_length(reader: R, writer: W, max_length: usize) -> Self {
        Self {
            reader: FramedRead::new(reader, MessageCodec::new(max_length)),
            writer: FramedWrite::new(writer, LinesCodec::new()),
        }
    }
}

#[async_trait]
impl<R, W> McpTransport for LineTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<Inbound>, McpError> {
        while let Some(frame) = self.reader.next().await {
            match frame? {
                Inbound::Message(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        return Ok(Some(Inbound::Message(trimmed.to_string())));
                    }
                }
                malformed => return Ok(Some(malformed)),
            }
        }
        Ok(None)
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.writer.send(message).await?;
        Ok(())
    }
}

/// In-memory transport for tests, backed by a pair of channels.
pub struct ChannelTransport {
    rx: mpsc::Receiver<String>,
    tx: mpsc::Sender<String>,
}

impl ChannelTransport {
    /// Create two connected ends; what one sends the other receives.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::channel(32);
        let (tx_b, rx_a) = mpsc::channel(32);
        (Self { rx: rx_a, tx: tx_a }, Self { rx: rx_b, tx: tx_b })
    }
}

#[async_trait]
impl McpTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<Inbound>, McpError> {
        Ok(self.rx.recv().await.map(Inbound::Message))
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.tx
            .send(message.to_string())
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer closed").into())
    }
}
