//! Blocking monitor: connect to a bridge, install a periodic filter and
//! print every matching frame until the bridge disconnects.
//!
//! Run with:
//!   cargo run --example bridge-monitor -- 192.168.178.170:1234 '***_****_****'

use std::time::Duration;

use canbridge::filter::FilterPattern;
use canbridge::frame::{Command, DatagramConfig, DatagramReader, DatagramWriter, FrameError};
use canbridge::transport::{BridgeStream, TransportConfig, DEFAULT_BRIDGE_ADDR};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| DEFAULT_BRIDGE_ADDR.to_string());
    let pattern = args.next().unwrap_or_else(|| "***_****_****".to_string());

    let stream = BridgeStream::connect(&addr, &TransportConfig::default())?;
    eprintln!("Connected to {}", stream.peer_addr());

    let mut writer = DatagramWriter::new(stream.try_clone()?);
    writer.send_command(&Command::ClearFilters)?;
    writer.send_command(&Command::periodic_filter(Duration::ZERO, pattern.as_str()))?;

    // Older bridge firmware ignores pfilt and forwards everything.
    let local = FilterPattern::compile(&pattern);
    eprintln!("Filtering on {local}");

    let reader = DatagramReader::with_config(stream, DatagramConfig::default());
    for result in reader {
        match result {
            Ok(frame) if local.matches(frame.id()) => println!("{frame}"),
            Ok(_) => {}
            Err(err @ FrameError::Io(_)) => return Err(err.into()),
            Err(err) => eprintln!("Skipping datagram: {err}"),
        }
    }

    eprintln!("Bridge disconnected");
    Ok(())
}
