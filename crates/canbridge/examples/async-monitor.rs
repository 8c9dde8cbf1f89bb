//! Async monitor built on `tokio_util::codec::Framed`.
//!
//! Sends a single frame, then prints received frames for ten seconds.
//!
//! Run with:
//!   cargo run --example async-monitor --features async -- 192.168.178.170:1234

use std::time::Duration;

use canbridge::frame::{CanBridgeCodec, CanFrame, CanId, Command};
use canbridge::transport::DEFAULT_BRIDGE_ADDR;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BRIDGE_ADDR.to_string());

    let stream = TcpStream::connect(&addr).await?;
    eprintln!("Connected to {addr}");

    let mut framed = Framed::new(stream, CanBridgeCodec::new());
    framed.send(Command::ClearFilters).await?;
    framed
        .send(CanFrame::new(CanId::standard(0x12a)?, &[0x1a, 0x2b, 0x3c])?)
        .await?;

    let deadline = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            next = framed.next() => match next {
                Some(Ok(frame)) => println!("{frame}"),
                Some(Err(err)) => {
                    eprintln!("Stream error: {err}");
                    break;
                }
                None => {
                    eprintln!("Bridge disconnected");
                    break;
                }
            },
        }
    }

    Ok(())
}
