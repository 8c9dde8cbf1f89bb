//! ASCII datagram codec for CAN frames exchanged with a CAN-to-network bridge.
//!
//! Every datagram is a single ASCII line:
//! - `$fts,<id>,<info>,<data>\n` sends a frame to the bus
//! - `$rf,<id>,<info>,<data>\n` reports a frame received from the bus
//! - `$<command>\n` carries any other bridge command
//!
//! `<info>` packs the extended flag (bit 7), remote flag (bit 6) and DLC
//! (bits 3-0). All numbers are lowercase hex.
//!
//! [`encode_frame`] and [`decode_frame`] are pure; [`DatagramReader`] and
//! [`DatagramWriter`] layer them onto blocking streams.

pub mod codec;
pub mod command;
pub mod error;
pub mod frame;
pub mod line;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

mod hex;

#[cfg(feature = "embedded-can")]
mod interop;

pub use codec::{
    datagram_body, decode_frame, encode_command, encode_frame, encode_tagged_frame, info_byte,
    make_command, parse_payload, MAX_FRAME_DATAGRAM_LEN, RECEIVED_FRAME_TAG, SEND_FRAME_TAG,
};
pub use command::{Command, CLEAR_FILTERS_TAG, PERIODIC_FILTER_TAG};
pub use error::{FrameError, Result};
pub use frame::{CanFrame, CanId, EXTENDED_ID_MAX, MAX_DATA_LEN, MAX_DLC, STANDARD_ID_MAX};
pub use line::{DatagramConfig, DEFAULT_MAX_DATAGRAM_LEN};
pub use reader::DatagramReader;
pub use writer::DatagramWriter;

#[cfg(feature = "async")]
pub use async_codec::CanBridgeCodec;
