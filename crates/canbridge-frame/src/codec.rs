use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::frame::{CanFrame, CanId};
use crate::hex::{parse_hex_bytes, parse_hex_u32, put_hex_bytes, put_hex_u32};

/// Datagram start marker.
pub const START_MARKER: u8 = b'$';

/// Datagram terminator.
pub const TERMINATOR: u8 = b'\n';

/// Field separator inside a datagram.
pub const FIELD_SEPARATOR: u8 = b',';

/// Tag of frames sent to the bridge for transmission on the bus.
pub const SEND_FRAME_TAG: &str = "fts";

/// Tag of frames the bridge received from the bus.
pub const RECEIVED_FRAME_TAG: &str = "rf";

/// Longest frame datagram: `$fts,` + 8 id digits + `,` + 2 info digits + `,` + 16 data digits + `\n`.
pub const MAX_FRAME_DATAGRAM_LEN: usize = 34;

const INFO_EXTENDED: u8 = 0x80;
const INFO_REMOTE: u8 = 0x40;
const INFO_DLC_MASK: u8 = 0x0f;

/// Pack the info byte: bit 7 extended, bit 6 remote, bits 3-0 dlc.
pub fn info_byte(frame: &CanFrame) -> u8 {
    let mut info = frame.dlc() & INFO_DLC_MASK;
    if frame.is_extended() {
        info |= INFO_EXTENDED;
    }
    if frame.is_remote() {
        info |= INFO_REMOTE;
    }
    info
}

/// Encode a frame as a send-frame datagram.
///
/// Wire format:
/// ```text
/// $fts,<id hex>,<info hex>,<data hex>\n
/// ```
/// e.g. `$fts,12a,3,1a2b3c\n` for a standard data frame with three bytes.
pub fn encode_frame(frame: &CanFrame, dst: &mut BytesMut) {
    encode_tagged_frame(SEND_FRAME_TAG, frame, dst);
}

/// Encode a frame under an arbitrary command tag.
///
/// Bridge simulators use this with [`RECEIVED_FRAME_TAG`] to produce the
/// datagrams [`decode_frame`] accepts.
pub fn encode_tagged_frame(tag: &str, frame: &CanFrame, dst: &mut BytesMut) {
    dst.reserve(MAX_FRAME_DATAGRAM_LEN + tag.len());
    dst.put_u8(START_MARKER);
    dst.put_slice(tag.as_bytes());
    dst.put_u8(FIELD_SEPARATOR);
    put_hex_u32(dst, frame.id());
    dst.put_u8(FIELD_SEPARATOR);
    put_hex_u32(dst, u32::from(info_byte(frame)));
    dst.put_u8(FIELD_SEPARATOR);
    put_hex_bytes(dst, frame.data());
    dst.put_u8(TERMINATOR);
}

/// Wrap a command body as `$<body>\n`.
///
/// The body is not inspected; embedding `$` or `\n` breaks framing.
pub fn encode_command(body: &str, dst: &mut BytesMut) {
    dst.reserve(body.len() + 2);
    dst.put_u8(START_MARKER);
    dst.put_slice(body.as_bytes());
    dst.put_u8(TERMINATOR);
}

/// Owned form of [`encode_command`].
pub fn make_command(body: &str) -> Bytes {
    let mut buf = BytesMut::new();
    encode_command(body, &mut buf);
    buf.freeze()
}

/// Locate the first `$...\n` span and return the bytes between the markers.
///
/// A `\r` directly before the terminator is dropped.
pub fn datagram_body(src: &[u8]) -> Result<&[u8]> {
    let start = src
        .iter()
        .position(|&b| b == START_MARKER)
        .ok_or(FrameError::NoStartMarker)?;
    let rest = &src[start + 1..];
    let end = rest
        .iter()
        .position(|&b| b == TERMINATOR)
        .ok_or(FrameError::NoTerminator)?;

    let body = &rest[..end];
    Ok(body.strip_suffix(b"\r").unwrap_or(body))
}

/// Decode a received-frame datagram (`$rf,<id>,<info>,<data>\n`).
///
/// Bytes before the first `$` and after the following `\n` are ignored.
pub fn decode_frame(src: &[u8]) -> Result<CanFrame> {
    let body = datagram_body(src)?;

    let fields: Vec<&[u8]> = body.split(|&b| b == FIELD_SEPARATOR).collect();
    let [tag, id, info, data] = fields.as_slice() else {
        return Err(FrameError::MalformedDatagram(format!(
            "expected 4 fields, found {}",
            fields.len()
        )));
    };

    if *tag != RECEIVED_FRAME_TAG.as_bytes() {
        return Err(FrameError::MalformedDatagram(format!(
            "expected tag {RECEIVED_FRAME_TAG:?}, found {:?}",
            String::from_utf8_lossy(tag)
        )));
    }

    let id = parse_hex_u32(id).ok_or(FrameError::InvalidHex { field: "id" })?;
    let info = parse_hex_u32(info)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or(FrameError::InvalidHex { field: "info" })?;
    let data = parse_hex_bytes(data).ok_or(FrameError::InvalidHex { field: "data" })?;

    let extended = info & INFO_EXTENDED != 0;
    let remote = info & INFO_REMOTE != 0;
    let dlc = info & INFO_DLC_MASK;

    CanFrame::from_parts(CanId::new(id, extended)?, remote, dlc, &data)
}

/// Parse a payload in data-field notation (`1a2b3c`, case-insensitive).
pub fn parse_payload(hex: &str) -> Result<Vec<u8>> {
    parse_hex_bytes(hex.as_bytes()).ok_or(FrameError::InvalidHex { field: "data" })
}

impl CanFrame {
    /// Encode this frame as an owned send-frame datagram.
    pub fn to_datagram(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MAX_FRAME_DATAGRAM_LEN);
        encode_frame(self, &mut buf);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn std_id(raw: u32) -> CanId {
        CanId::standard(raw).unwrap()
    }

    fn ext_id(raw: u32) -> CanId {
        CanId::extended(raw).unwrap()
    }

    #[test]
    fn encode_data_frame() {
        let frame = CanFrame::new(std_id(0x12a), &[0x1a, 0x2b, 0x3c]).unwrap();
        assert_eq!(frame.to_datagram().as_ref(), b"$fts,12a,3,1a2b3c\n");
    }

    #[test]
    fn encode_extended_data_frame() {
        let frame = CanFrame::new(ext_id(0x12a), &[0x1a, 0x2b, 0x3c]).unwrap();
        assert_eq!(frame.to_datagram().as_ref(), b"$fts,12a,83,1a2b3c\n");
    }

    #[test]
    fn encode_remote_frames() {
        let frame = CanFrame::new_remote(std_id(0x12a), 5).unwrap();
        assert_eq!(frame.to_datagram().as_ref(), b"$fts,12a,45,\n");

        let frame = CanFrame::new_remote(ext_id(0x12a), 5).unwrap();
        assert_eq!(frame.to_datagram().as_ref(), b"$fts,12a,c5,\n");
    }

    #[test]
    fn encode_empty_data_frame_with_zero_id() {
        let frame = CanFrame::new(std_id(0), &[]).unwrap();
        assert_eq!(frame.to_datagram().as_ref(), b"$fts,0,0,\n");
    }

    #[test]
    fn encode_appends_to_buffer() {
        let mut buf = BytesMut::from(&b"prefix"[..]);
        encode_frame(&CanFrame::new(std_id(1), &[0xff]).unwrap(), &mut buf);
        assert_eq!(&buf[..], b"prefix$fts,1,1,ff\n");
    }

    #[test]
    fn longest_datagram_fits_constant() {
        let frame = CanFrame::new(ext_id(0x1fff_ffff), &[0xff; 8]).unwrap();
        assert_eq!(frame.to_datagram().len(), MAX_FRAME_DATAGRAM_LEN);
    }

    #[test]
    fn command_framing() {
        assert_eq!(
            make_command("pfilt,5000,***_****_****").as_ref(),
            b"$pfilt,5000,***_****_****\n"
        );
        assert_eq!(make_command("").as_ref(), b"$\n");
    }

    #[test]
    fn decode_data_frame() {
        let frame = decode_frame(b"$rf,12a,3,1a2b3c\n").unwrap();
        assert_eq!(frame.id(), 0x12a);
        assert_eq!(frame.data(), &[0x1a, 0x2b, 0x3c]);
        assert!(!frame.is_extended());
        assert!(!frame.is_remote());
        assert_eq!(frame.dlc(), 3);
    }

    #[test]
    fn decode_extended_remote_frame() {
        let frame = decode_frame(b"$rf,12a,c3,\n").unwrap();
        assert_eq!(frame.id(), 0x12a);
        assert!(frame.data().is_empty());
        assert!(frame.is_extended());
        assert!(frame.is_remote());
        assert_eq!(frame.dlc(), 3);
    }

    #[test]
    fn decode_standard_remote_frame() {
        let frame = decode_frame(b"$rf,12a,43,\n").unwrap();
        assert!(frame.is_remote());
        assert!(!frame.is_extended());
        assert_eq!(frame.dlc(), 3);
    }

    #[test]
    fn decode_ignores_reserved_info_bits() {
        let frame = decode_frame(b"$rf,12a,b3,1a2b3c\n").unwrap();
        assert!(frame.is_extended());
        assert!(!frame.is_remote());
        assert_eq!(frame.dlc(), 3);
    }

    #[test]
    fn data_frame_dlc_is_payload_length_not_info_nibble() {
        let frame = decode_frame(b"$rf,12a,8,1a\n").unwrap();
        assert_eq!(frame.dlc(), 1);
    }

    #[test]
    fn decode_ignores_noise_around_span() {
        let clean = decode_frame(b"$rf,12a,3,1a2b3c\n").unwrap();
        let noisy = decode_frame(b"garbage,,\x00$rf,12a,3,1a2b3c\n$rf,1,1,ff\ntrailing").unwrap();
        assert_eq!(clean, noisy);
    }

    #[test]
    fn decode_tolerates_crlf() {
        let frame = decode_frame(b"$rf,12a,3,1a2b3c\r\n").unwrap();
        assert_eq!(frame.data(), &[0x1a, 0x2b, 0x3c]);
    }

    #[test]
    fn decode_without_start_marker() {
        assert!(matches!(
            decode_frame(b"rf,12a,3,1a2b3c\n"),
            Err(FrameError::NoStartMarker)
        ));
        assert!(matches!(decode_frame(b""), Err(FrameError::NoStartMarker)));
    }

    #[test]
    fn decode_without_terminator() {
        assert!(matches!(
            decode_frame(b"$rf,12a,3,1a2b3c"),
            Err(FrameError::NoTerminator)
        ));
        // A newline before the marker does not terminate the datagram.
        assert!(matches!(
            decode_frame(b"\n$rf,12a,3,1a2b3c"),
            Err(FrameError::NoTerminator)
        ));
    }

    #[test]
    fn decode_wrong_field_count() {
        assert!(matches!(
            decode_frame(b"$rf,12a,3\n"),
            Err(FrameError::MalformedDatagram(_))
        ));
        assert!(matches!(
            decode_frame(b"$rf,12a,3,1a,ff\n"),
            Err(FrameError::MalformedDatagram(_))
        ));
    }

    #[test]
    fn decode_wrong_tag() {
        let err = decode_frame(b"$fts,12a,3,1a2b3c\n").unwrap_err();
        match err {
            FrameError::MalformedDatagram(msg) => assert!(msg.contains("fts")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn decode_invalid_hex_fields() {
        assert!(matches!(
            decode_frame(b"$rf,zz,3,\n"),
            Err(FrameError::InvalidHex { field: "id" })
        ));
        assert!(matches!(
            decode_frame(b"$rf,,3,\n"),
            Err(FrameError::InvalidHex { field: "id" })
        ));
        assert!(matches!(
            decode_frame(b"$rf,12a,g,\n"),
            Err(FrameError::InvalidHex { field: "info" })
        ));
        assert!(matches!(
            decode_frame(b"$rf,12a,100,\n"),
            Err(FrameError::InvalidHex { field: "info" })
        ));
        assert!(matches!(
            decode_frame(b"$rf,12a,3,1a2\n"),
            Err(FrameError::InvalidHex { field: "data" })
        ));
        assert!(matches!(
            decode_frame(b"$rf,12a,3,xyz0\n"),
            Err(FrameError::InvalidHex { field: "data" })
        ));
    }

    #[test]
    fn decode_rejects_out_of_range_values() {
        assert!(matches!(
            decode_frame(b"$rf,800,0,\n"),
            Err(FrameError::InvalidId {
                id: 0x800,
                extended: false
            })
        ));
        assert!(decode_frame(b"$rf,800,80,\n").is_ok());
        assert!(matches!(
            decode_frame(b"$rf,1,9,000102030405060708\n"),
            Err(FrameError::InvalidDlc { dlc: 9 })
        ));
    }

    #[test]
    fn parse_payload_notation() {
        assert_eq!(parse_payload("1A2b").unwrap(), vec![0x1a, 0x2b]);
        assert!(parse_payload("").unwrap().is_empty());
        assert!(matches!(
            parse_payload("abc"),
            Err(FrameError::InvalidHex { field: "data" })
        ));
    }

    #[test]
    fn decode_remote_frame_keeps_payload() {
        let frame = decode_frame(b"$rf,12a,42,beef\n").unwrap();
        assert!(frame.is_remote());
        assert_eq!(frame.data(), &[0xbe, 0xef]);
        assert_eq!(frame.dlc(), 2);
    }

    fn received(frame: &CanFrame) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_tagged_frame(RECEIVED_FRAME_TAG, frame, &mut buf);
        buf
    }

    prop_compose! {
        fn arb_frame()(
            extended in any::<bool>(),
            raw in any::<u32>(),
            remote in any::<bool>(),
            dlc in 0u8..=15,
            data in prop::collection::vec(any::<u8>(), 0..=8),
        ) -> CanFrame {
            let id = if extended {
                CanId::extended(raw & 0x1fff_ffff).unwrap()
            } else {
                CanId::standard(raw & 0x7ff).unwrap()
            };
            if remote {
                CanFrame::new_remote(id, dlc).unwrap()
            } else {
                CanFrame::new(id, &data).unwrap()
            }
        }
    }

    proptest! {
        #[test]
        fn prop_received_datagram_roundtrip(frame in arb_frame()) {
            let decoded = decode_frame(&received(&frame)).unwrap();
            prop_assert_eq!(decoded.id(), frame.id());
            prop_assert_eq!(decoded.is_extended(), frame.is_extended());
            prop_assert_eq!(decoded.is_remote(), frame.is_remote());
            prop_assert_eq!(decoded.data(), frame.data());
            prop_assert_eq!(decoded.dlc(), frame.dlc());
        }

        #[test]
        fn prop_noise_outside_span_is_ignored(
            frame in arb_frame(),
            prefix in "[^$]{0,16}",
            suffix in "[ -~\n]{0,16}",
        ) {
            let mut wire = BytesMut::from(prefix.as_bytes());
            wire.extend_from_slice(&received(&frame));
            wire.extend_from_slice(suffix.as_bytes());
            prop_assert_eq!(decode_frame(&wire).unwrap(), frame);
        }
    }
}
