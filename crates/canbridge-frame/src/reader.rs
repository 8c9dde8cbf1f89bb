use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use canbridge_transport::BridgeStream;

use crate::codec::decode_frame;
use crate::error::{FrameError, Result};
use crate::frame::CanFrame;
use crate::line::{DatagramConfig, LineSplitter};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 1024;

/// Reads complete datagrams from any `Read` stream.
///
/// Handles partial reads and multiple datagrams per read internally. A
/// datagram that fails to decode consumes only its own line; the next call
/// continues with the following datagram.
pub struct DatagramReader<T> {
    inner: T,
    buf: BytesMut,
    lines: LineSplitter,
    config: DatagramConfig,
}

impl<T: Read> DatagramReader<T> {
    /// Create a new datagram reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, DatagramConfig::default())
    }

    /// Create a new datagram reader with explicit configuration.
    pub fn with_config(inner: T, config: DatagramConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            lines: LineSplitter::new(config.max_datagram_len),
            config,
        }
    }

    /// Read the next complete line, terminator included (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_datagram(&mut self) -> Result<Bytes> {
        loop {
            if let Some(line) = self.lines.next_line(&mut self.buf)? {
                return Ok(line);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if !self.buf.is_empty() {
                    tracing::debug!(pending = self.buf.len(), "stream closed mid-datagram");
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read and decode the next received-frame datagram (blocking).
    pub fn read_frame(&mut self) -> Result<CanFrame> {
        let line = self.read_datagram()?;
        decode_frame(&line).inspect_err(|err| {
            tracing::debug!(
                error = %err,
                datagram = %String::from_utf8_lossy(&line).trim_end(),
                "failed to decode datagram"
            );
        })
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum datagram length for subsequent reads.
    pub fn set_max_datagram_len(&mut self, max_datagram_len: usize) {
        self.config.max_datagram_len = max_datagram_len;
        self.lines.set_max_len(max_datagram_len);
    }

    /// Current datagram reader configuration.
    pub fn config(&self) -> &DatagramConfig {
        &self.config
    }
}

impl<T: Read> Iterator for DatagramReader<T> {
    type Item = Result<CanFrame>;

    /// Yields decoded frames and per-datagram errors; ends at EOF.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}

impl DatagramReader<BridgeStream> {
    /// Create a datagram reader for `BridgeStream` and apply read timeout from config.
    pub fn with_config_bridge(inner: BridgeStream, config: DatagramConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: canbridge_transport::TransportError) -> FrameError {
    match err {
        canbridge_transport::TransportError::Io(io)
        | canbridge_transport::TransportError::Resolve { source: io, .. }
        | canbridge_transport::TransportError::Connect { source: io, .. } => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
