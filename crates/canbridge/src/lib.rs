//! CAN frames over a line-oriented TCP bridge protocol.
//!
//! canbridge talks to CAN-to-network bridges that exchange ASCII datagrams
//! such as `$fts,12a,3,1a2b3c\n` over a TCP socket.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP stream to the bridge
//! - [`frame`]: `CanFrame` values, datagram codec, bridge commands, stream reader/writer
//! - [`filter`]: Ternary identifier filter (`"101x"` style patterns)

/// Re-export transport types.
pub mod transport {
    pub use canbridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use canbridge_frame::*;
}

/// Re-export filter types.
pub mod filter {
    pub use canbridge_filter::*;
}
