//! Peer Link
//!
//! Length-prefixed TCP transport between the two signing parties. Each
//! frame is a 4-byte big-endian length followed by the JSON-encoded
//! message.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use topcoat_core::transport::{async_trait, decode_message, encode_message};
use topcoat_core::{Error, Message, Result, Transport};
use tracing::{debug, info, instrument};

/// Default upper bound on a single frame
pub const DEFAULT_MAX_FRAME: usize = 16 * 1024 * 1024;

const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(100);

fn io_error(e: std::io::Error) -> Error {
    Error::Transport(e.to_string())
}

/// TCP connection to the peer
pub struct TcpTransport {
    reader: Mutex<OwnedReadHalf>,
    writer: Mutex<OwnedWriteHalf>,
    peer: SocketAddr,
    /// Receive timeout
    timeout: Option<Duration>,
    max_frame: usize,
}

impl TcpTransport {
    /// Wrap an established stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true).map_err(io_error)?;
        let peer = stream.peer_addr().map_err(io_error)?;
        let (reader, writer) = stream.into_split();

        Ok(Self {
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            peer,
            timeout: None,
            max_frame: DEFAULT_MAX_FRAME,
        })
    }

    /// Connect to a listening peer
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await.map_err(io_error)?;
        let transport = Self::from_stream(stream)?;
        info!(peer = %transport.peer, "Connected to peer");
        Ok(transport)
    }

    /// Connect, retrying while the peer is not listening yet
    pub async fn connect_with_retry(addr: &str, max_attempts: usize) -> Result<Self> {
        let mut attempts = 0;
        loop {
            match Self::connect(addr).await {
                Ok(transport) => return Ok(transport),
                Err(e) if attempts + 1 < max_attempts => {
                    debug!(attempts, error = %e, "Peer not reachable yet");
                    attempts += 1;
                    tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                }
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "connection to {} after {} attempts",
                        addr, max_attempts
                    )))
                }
            }
        }
    }

    /// Accept a single peer on `listener`
    pub async fn accept(listener: &TcpListener) -> Result<Self> {
        let (stream, _) = listener.accept().await.map_err(io_error)?;
        let transport = Self::from_stream(stream)?;
        info!(peer = %transport.peer, "Accepted peer");
        Ok(transport)
    }

    /// Set receive timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_frame(mut self, max_frame: usize) -> Self {
        self.max_frame = max_frame;
        self
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    async fn read_frame(&self) -> Result<Vec<u8>> {
        let mut reader = self.reader.lock().await;
        let len = reader.read_u32().await.map_err(io_error)? as usize;
        if len > self.max_frame {
            return Err(Error::Transport(format!(
                "frame of {} bytes exceeds limit of {}",
                len, self.max_frame
            )));
        }

        let mut frame = vec![0u8; len];
        reader.read_exact(&mut frame).await.map_err(io_error)?;
        Ok(frame)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    #[instrument(skip_all, fields(kind = message.kind()))]
    async fn send(&self, message: &Message) -> Result<()> {
        let frame = encode_message(message)?;
        if frame.len() > self.max_frame {
            return Err(Error::Transport(format!(
                "frame of {} bytes exceeds limit of {}",
                frame.len(),
                self.max_frame
            )));
        }
        let len = u32::try_from(frame.len())
            .map_err(|_| Error::Transport("frame length overflows u32".into()))?;

        let mut writer = self.writer.lock().await;
        writer.write_u32(len).await.map_err(io_error)?;
        writer.write_all(&frame).await.map_err(io_error)?;
        writer.flush().await.map_err(io_error)?;

        debug!(bytes = frame.len(), "Frame sent");
        Ok(())
    }

    async fn receive(&self) -> Result<Message> {
        let frame = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.read_frame())
                .await
                .map_err(|_| Error::Timeout(format!("message from {}", self.peer)))??,
            None => self.read_frame().await?,
        };
        decode_message(&frame)
    }
}
