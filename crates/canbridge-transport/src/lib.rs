//! TCP transport to a CAN-to-network bridge.
//!
//! This is the lowest layer of canbridge. It only establishes and configures
//! the byte stream; datagram framing lives in `canbridge-frame`.

pub mod error;
pub mod tcp;

pub use error::{Result, TransportError};
pub use tcp::{BridgeStream, TransportConfig, DEFAULT_BRIDGE_ADDR, DEFAULT_CONNECT_TIMEOUT};
