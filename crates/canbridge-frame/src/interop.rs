//! `embedded-can` interop, for HAL drivers that speak `embedded_can::Frame`.

use embedded_can::{ExtendedId, Id, StandardId};

use crate::frame::{CanFrame, CanId};

impl From<Id> for CanId {
    fn from(id: Id) -> Self {
        match id {
            Id::Standard(id) => CanId::new_unchecked(u32::from(id.as_raw()), false),
            Id::Extended(id) => CanId::new_unchecked(id.as_raw(), true),
        }
    }
}

impl From<CanId> for Id {
    fn from(id: CanId) -> Self {
        // CanId is always in range for its kind; the fallbacks are unreachable.
        if id.is_extended() {
            Id::Extended(ExtendedId::new(id.raw()).unwrap_or(ExtendedId::MAX))
        } else {
            let raw = u16::try_from(id.raw()).unwrap_or(u16::MAX);
            Id::Standard(StandardId::new(raw).unwrap_or(StandardId::MAX))
        }
    }
}

impl embedded_can::Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        CanFrame::new(CanId::from(id.into()), data).ok()
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        let dlc = u8::try_from(dlc).ok()?;
        CanFrame::new_remote(CanId::from(id.into()), dlc).ok()
    }

    fn is_extended(&self) -> bool {
        CanFrame::is_extended(self)
    }

    fn is_remote_frame(&self) -> bool {
        self.is_remote()
    }

    fn id(&self) -> Id {
        self.can_id().into()
    }

    fn dlc(&self) -> usize {
        usize::from(CanFrame::dlc(self))
    }

    fn data(&self) -> &[u8] {
        CanFrame::data(self)
    }
}
