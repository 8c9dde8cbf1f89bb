use std::fmt;

use crate::error::{FrameError, Result};
use crate::hex::HexBytes;

/// Largest 11-bit identifier.
pub const STANDARD_ID_MAX: u32 = 0x7ff;

/// Largest 29-bit identifier.
pub const EXTENDED_ID_MAX: u32 = 0x1fff_ffff;

/// Classic CAN payload limit.
pub const MAX_DATA_LEN: usize = 8;

/// Largest value the 4-bit DLC field can carry.
pub const MAX_DLC: u8 = 15;

/// A range-checked CAN identifier.
///
/// The only ways to obtain one are the checked constructors (and the
/// `embedded-can` conversion), so the raw value always fits its kind.
///
/// ```compile_fail
/// let id = canbridge_frame::CanId { raw: 0xffff, extended: false };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanId {
    raw: u32,
    extended: bool,
}

impl CanId {
    /// Create an 11-bit identifier.
    pub fn standard(raw: u32) -> Result<Self> {
        if raw > STANDARD_ID_MAX {
            return Err(FrameError::InvalidId {
                id: raw,
                extended: false,
            });
        }
        Ok(Self::new_unchecked(raw, false))
    }

    /// Create a 29-bit identifier.
    pub fn extended(raw: u32) -> Result<Self> {
        if raw > EXTENDED_ID_MAX {
            return Err(FrameError::InvalidId {
                id: raw,
                extended: true,
            });
        }
        Ok(Self::new_unchecked(raw, true))
    }

    /// Create an identifier of the given kind.
    pub fn new(raw: u32, extended: bool) -> Result<Self> {
        if extended {
            Self::extended(raw)
        } else {
            Self::standard(raw)
        }
    }

    /// Caller guarantees `raw` fits the kind.
    pub(crate) fn new_unchecked(raw: u32, extended: bool) -> Self {
        Self { raw, extended }
    }

    /// The raw identifier value.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }
}

/// A classic CAN data or remote frame.
///
/// Frames are immutable values. The data length code is derived: for data
/// frames it is the payload length, for remote frames it is the requested
/// length given at construction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanFrame {
    id: CanId,
    remote: bool,
    requested_dlc: u8,
    data: [u8; MAX_DATA_LEN],
    len: u8,
}

impl CanFrame {
    /// Create a data frame.
    ///
    /// Fails with [`FrameError::InvalidDlc`] if `data` exceeds 8 bytes.
    pub fn new(id: CanId, data: &[u8]) -> Result<Self> {
        Self::from_parts(id, false, 0, data)
    }

    /// Create a remote frame requesting `dlc` bytes.
    ///
    /// Fails with [`FrameError::InvalidDlc`] if `dlc` exceeds 15.
    pub fn new_remote(id: CanId, dlc: u8) -> Result<Self> {
        Self::from_parts(id, true, dlc, &[])
    }

    /// Build a frame exactly as it appeared on the wire.
    ///
    /// Remote frames keep whatever payload bytes were present; the stored
    /// `dlc` is only consulted for remote frames.
    pub(crate) fn from_parts(id: CanId, remote: bool, dlc: u8, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_DATA_LEN {
            return Err(FrameError::InvalidDlc { dlc: data.len() });
        }
        if remote && dlc > MAX_DLC {
            return Err(FrameError::InvalidDlc {
                dlc: usize::from(dlc),
            });
        }

        let mut buf = [0u8; MAX_DATA_LEN];
        buf[..data.len()].copy_from_slice(data);

        Ok(Self {
            id,
            remote,
            requested_dlc: if remote { dlc } else { 0 },
            data: buf,
            len: data.len() as u8,
        })
    }

    /// The raw identifier value.
    pub fn id(&self) -> u32 {
        self.id.raw()
    }

    pub fn can_id(&self) -> CanId {
        self.id
    }

    pub fn is_extended(&self) -> bool {
        self.id.is_extended()
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Payload bytes. Empty for remote frames built with [`CanFrame::new_remote`].
    pub fn data(&self) -> &[u8] {
        &self.data[..usize::from(self.len)]
    }

    /// Data length code: requested length for remote frames, payload length otherwise.
    pub fn dlc(&self) -> u8 {
        if self.remote {
            self.requested_dlc
        } else {
            self.len
        }
    }
}

impl fmt::Debug for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanFrame")
            .field("id", &format_args!("{:#x}", self.id()))
            .field("extended", &self.is_extended())
            .field("remote", &self.remote)
            .field("dlc", &self.dlc())
            .field("data", &format_args!("{}", HexBytes(self.data())))
            .finish()
    }
}

impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.remote {
            write!(
                f,
                "remote frame id={:#x} dlc={} extended={}",
                self.id(),
                self.dlc(),
                self.is_extended()
            )
        } else {
            write!(
                f,
                "data frame id={:#x} data={} extended={}",
                self.id(),
                HexBytes(self.data()),
                self.is_extended()
            )
        }
    }
}
