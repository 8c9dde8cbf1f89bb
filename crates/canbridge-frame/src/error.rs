/// Errors that can occur while building, encoding or decoding CAN frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No `$` start marker in the buffer.
    #[error("datagram start marker '$' not found")]
    NoStartMarker,

    /// No `\n` after the start marker.
    #[error("datagram terminator '\\n' not found")]
    NoTerminator,

    /// Wrong field count or an unexpected command tag.
    #[error("malformed datagram: {0}")]
    MalformedDatagram(String),

    /// A datagram field is not valid hexadecimal.
    #[error("invalid hex in {field} field")]
    InvalidHex { field: &'static str },

    /// The identifier does not fit the declared identifier kind.
    #[error("identifier {id:#x} out of range for {} frame", id_kind(.extended))]
    InvalidId { id: u32, extended: bool },

    /// Payload longer than 8 bytes, or remote request length above 15.
    #[error("invalid data length code {dlc}")]
    InvalidDlc { dlc: usize },

    /// A line on the stream exceeded the configured maximum datagram length.
    #[error("datagram too long ({size} bytes, max {max})")]
    DatagramTooLong { size: usize, max: usize },

    /// An I/O error occurred while reading or writing datagrams.
    #[error("datagram I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete datagram was received.
    #[error("connection closed (incomplete datagram)")]
    ConnectionClosed,
}

impl FrameError {
    /// True for failures confined to a single datagram.
    ///
    /// The stream is still usable after a recoverable error; the next read
    /// starts at the following line.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FrameError::Io(_) | FrameError::ConnectionClosed)
    }
}

fn id_kind(extended: &bool) -> &'static str {
    if *extended {
        "extended"
    } else {
        "standard"
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
