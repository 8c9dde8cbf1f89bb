//! Newline splitting shared by the blocking reader and the async codec.

use bytes::{Bytes, BytesMut};

use crate::codec::TERMINATOR;
use crate::error::{FrameError, Result};

/// Default maximum datagram length, terminator included.
pub const DEFAULT_MAX_DATAGRAM_LEN: usize = 256;

/// Configuration for datagram readers and writers.
#[derive(Debug, Clone)]
pub struct DatagramConfig {
    /// Longest accepted line in bytes. Default: 256.
    pub max_datagram_len: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for DatagramConfig {
    fn default() -> Self {
        Self {
            max_datagram_len: DEFAULT_MAX_DATAGRAM_LEN,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

/// Splits a byte buffer into complete `\n`-terminated lines.
///
/// Blank lines are skipped. A line exceeding the limit is reported once with
/// [`FrameError::DatagramTooLong`] and the rest of it is discarded up to the
/// next terminator.
#[derive(Debug, Clone)]
pub(crate) struct LineSplitter {
    max_len: usize,
    discarding: bool,
}

impl LineSplitter {
    pub(crate) fn new(max_len: usize) -> Self {
        Self {
            max_len,
            discarding: false,
        }
    }

    pub(crate) fn set_max_len(&mut self, max_len: usize) {
        self.max_len = max_len;
    }

    /// Take the next complete line from `buf`, or `None` if more data is needed.
    pub(crate) fn next_line(&mut self, buf: &mut BytesMut) -> Result<Option<Bytes>> {
        loop {
            let Some(pos) = buf.iter().position(|&b| b == TERMINATOR) else {
                if self.discarding {
                    buf.clear();
                } else if buf.len() > self.max_len {
                    let size = buf.len();
                    buf.clear();
                    self.discarding = true;
                    return Err(FrameError::DatagramTooLong {
                        size,
                        max: self.max_len,
                    });
                }
                return Ok(None);
            };

            let line = buf.split_to(pos + 1).freeze();
            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                return Err(FrameError::DatagramTooLong {
                    size: line.len(),
                    max: self.max_len,
                });
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            return Ok(Some(line));
        }
    }
}
