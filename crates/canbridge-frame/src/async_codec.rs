//! `tokio_util::codec` adapter for bridge datagrams.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame};
use crate::command::Command;
use crate::error::FrameError;
use crate::frame::CanFrame;
use crate::line::{LineSplitter, DEFAULT_MAX_DATAGRAM_LEN};

/// Decodes received-frame datagrams and encodes frames and commands.
///
/// Datagrams that fail to decode are logged and skipped so a single bad line
/// does not terminate a `FramedRead` stream. Only I/O errors are surfaced.
#[derive(Debug, Clone)]
pub struct CanBridgeCodec {
    lines: LineSplitter,
}

impl CanBridgeCodec {
    pub fn new() -> Self {
        Self::with_max_datagram_len(DEFAULT_MAX_DATAGRAM_LEN)
    }

    pub fn with_max_datagram_len(max_datagram_len: usize) -> Self {
        Self {
            lines: LineSplitter::new(max_datagram_len),
        }
    }
}

impl Default for CanBridgeCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for CanBridgeCodec {
    type Item = CanFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<CanFrame>, FrameError> {
        loop {
            let line = match self.lines.next_line(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping datagram");
                    continue;
                }
            };

            match decode_frame(&line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(err) => {
                    tracing::debug!(
                        error = %err,
                        datagram = %String::from_utf8_lossy(&line).trim_end(),
                        "skipping undecodable datagram"
                    );
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<CanFrame>, FrameError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => {
                tracing::debug!(pending = src.len(), "stream closed mid-datagram");
                src.clear();
                Err(FrameError::ConnectionClosed)
            }
        }
    }
}

impl Encoder<CanFrame> for CanBridgeCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: CanFrame, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(&frame, dst);
        Ok(())
    }
}

impl Encoder<Command> for CanBridgeCodec {
    type Error = FrameError;

    fn encode(&mut self, command: Command, dst: &mut BytesMut) -> Result<(), FrameError> {
        command.encode(dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::frame::CanId;

    #[test]
    fn decode_skips_bad_lines() {
        let mut codec = CanBridgeCodec::new();
        let mut buf = BytesMut::from(&b"junk\n$rf,12a,3\n$rf,12a,3,1a2b3c\n$rf,1"[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.id(), 0x12a);
        assert_eq!(frame.dlc(), 3);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"$rf,1");
    }

    #[test]
    fn decode_eof_with_partial_datagram() {
        let mut codec = CanBridgeCodec::new();
        let mut buf = BytesMut::from(&b"$rf,1"[..]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn framed_read_yields_frames() {
        let wire: &[u8] = b"$rf,12a,3,1a2b3c\n$rf,bogus\n$rf,12a,c3,\n";
        let mut stream = FramedRead::new(wire, CanBridgeCodec::new());

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.data(), &[0x1a, 0x2b, 0x3c]);

        let second = stream.next().await.unwrap().unwrap();
        assert!(second.is_remote());
        assert!(second.is_extended());

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn framed_write_encodes_frames_and_commands() {
        let mut sink = FramedWrite::new(Vec::new(), CanBridgeCodec::new());
        let frame = CanFrame::new(CanId::standard(0x12a).unwrap(), &[0x1a]).unwrap();

        sink.send(Command::ClearFilters).await.unwrap();
        sink.send(frame).await.unwrap();

        assert_eq!(sink.get_ref().as_slice(), b"$clearfilt\n$fts,12a,1,1a\n");
    }
}
