use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use canbridge_transport::BridgeStream;

use crate::codec::{encode_command, encode_frame, MAX_FRAME_DATAGRAM_LEN};
use crate::command::Command;
use crate::error::{FrameError, Result};
use crate::frame::CanFrame;
use crate::line::DatagramConfig;
use crate::reader::transport_to_frame_error;

/// Writes complete datagrams to any `Write` stream.
///
/// Only `Interrupted` is retried. An expired write timeout (`WouldBlock` or
/// `TimedOut`) is returned as [`FrameError::Io`].
pub struct DatagramWriter<T> {
    inner: T,
    buf: BytesMut,
    config: DatagramConfig,
}

impl<T: Write> DatagramWriter<T> {
    /// Create a new datagram writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, DatagramConfig::default())
    }

    /// Create a new datagram writer with explicit configuration.
    pub fn with_config(inner: T, config: DatagramConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_FRAME_DATAGRAM_LEN),
            config,
        }
    }

    /// Send a frame for transmission on the bus (blocking).
    pub fn write_frame(&mut self, frame: &CanFrame) -> Result<()> {
        self.buf.clear();
        encode_frame(frame, &mut self.buf);
        tracing::trace!(%frame, "sending frame");
        self.write_buffered()
    }

    /// Send a bridge command (blocking).
    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        self.buf.clear();
        command.encode(&mut self.buf);
        tracing::trace!(?command, "sending command");
        self.write_buffered()
    }

    /// Wrap `body` as `$<body>\n` and send it (blocking).
    pub fn send_raw(&mut self, body: &str) -> Result<()> {
        self.buf.clear();
        encode_command(body, &mut self.buf);
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        if self.buf.len() > self.config.max_datagram_len {
            return Err(FrameError::DatagramTooLong {
                size: self.buf.len(),
                max: self.config.max_datagram_len,
            });
        }

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current datagram writer configuration.
    pub fn config(&self) -> &DatagramConfig {
        &self.config
    }
}

impl DatagramWriter<BridgeStream> {
    /// Create a datagram writer for `BridgeStream` and apply write timeout from config.
    pub fn with_config_bridge(inner: BridgeStream, config: DatagramConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
