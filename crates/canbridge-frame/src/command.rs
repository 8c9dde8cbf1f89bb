//! Commands understood by the bridge.

use std::time::Duration;

use bytes::{Bytes, BytesMut};

use crate::codec::{encode_command, encode_frame};
use crate::frame::CanFrame;

/// Periodic filter command tag.
pub const PERIODIC_FILTER_TAG: &str = "pfilt";

/// Clear-all-filters command tag.
pub const CLEAR_FILTERS_TAG: &str = "clearfilt";

/// A command datagram sent to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Transmit a frame on the bus (`fts`).
    SendFrame(CanFrame),
    /// Forward frames whose identifier matches `pattern`, at most once per
    /// `period` per identifier (`pfilt,<ms>,<pattern>`). A zero period
    /// forwards every matching frame.
    PeriodicFilter { period: Duration, pattern: String },
    /// Remove all filters (`clearfilt`).
    ClearFilters,
    /// Any other command body, sent verbatim.
    Raw(String),
}

impl Command {
    pub fn periodic_filter(period: Duration, pattern: impl Into<String>) -> Self {
        Command::PeriodicFilter {
            period,
            pattern: pattern.into(),
        }
    }

    /// Append the `$...\n` datagram for this command to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Command::SendFrame(frame) => encode_frame(frame, dst),
            Command::PeriodicFilter { period, pattern } => {
                let body = format!("{PERIODIC_FILTER_TAG},{},{pattern}", period.as_millis());
                encode_command(&body, dst);
            }
            Command::ClearFilters => encode_command(CLEAR_FILTERS_TAG, dst),
            Command::Raw(body) => encode_command(body, dst),
        }
    }

    /// Owned datagram for this command.
    pub fn to_datagram(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}

impl From<CanFrame> for Command {
    fn from(frame: CanFrame) -> Self {
        Command::SendFrame(frame)
    }
}
