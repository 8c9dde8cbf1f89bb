use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, TransportError};

/// Address the bridge firmware listens on out of the box.
pub const DEFAULT_BRIDGE_ADDR: &str = "192.168.178.170:1234";

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`BridgeStream::connect`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-address connect timeout. `None` blocks until the OS gives up.
    pub connect_timeout: Option<Duration>,
    /// Disable Nagle's algorithm. Datagrams are small and latency matters.
    pub nodelay: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            nodelay: true,
        }
    }
}

/// A connected bridge stream implementing `Read` and `Write`.
pub struct BridgeStream {
    inner: TcpStream,
    peer: SocketAddr,
}

impl BridgeStream {
    /// Connect to a bridge at `addr` (`host:port`).
    ///
    /// Every resolved address is tried in order; the last connect error is
    /// reported if none succeeds.
    pub fn connect(addr: &str, config: &TransportConfig) -> Result<Self> {
        let candidates: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                addr: addr.to_string(),
                source,
            })?
            .collect();

        let mut last_err = None;
        for candidate in candidates {
            tracing::debug!(%candidate, "connecting to bridge");
            let attempt = match config.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => {
                    stream.set_nodelay(config.nodelay)?;
                    tracing::debug!(peer = %candidate, "bridge connected");
                    return Ok(Self::from_tcp(stream, candidate));
                }
                Err(err) => {
                    tracing::debug!(%candidate, error = %err, "bridge connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        match last_err {
            Some(source) => Err(TransportError::Connect {
                addr: addr.to_string(),
                source,
            }),
            None => Err(TransportError::NoAddress {
                addr: addr.to_string(),
            }),
        }
    }

    /// Wrap an already connected TCP stream.
    pub fn from_std(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr()?;
        Ok(Self::from_tcp(stream, peer))
    }

    fn from_tcp(inner: TcpStream, peer: SocketAddr) -> Self {
        Self { inner, peer }
    }

    /// Address of the connected bridge.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_read_timeout(timeout).map_err(Into::into)
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.inner.set_write_timeout(timeout).map_err(Into::into)
    }

    /// Try to clone this stream, e.g. to split reading and writing across threads.
    pub fn try_clone(&self) -> Result<Self> {
        let cloned = self.inner.try_clone()?;
        Ok(Self::from_tcp(cloned, self.peer))
    }

    /// Shut down both halves of the connection.
    pub fn shutdown(&self) -> Result<()> {
        self.inner.shutdown(Shutdown::Both).map_err(Into::into)
    }
}

impl Read for BridgeStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for BridgeStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for BridgeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeStream")
            .field("peer", &self.peer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn connect_and_exchange_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut conn, _) = listener.accept().unwrap();
            let mut buf = [0u8; 5];
            conn.read_exact(&mut buf).unwrap();
            conn.write_all(&buf).unwrap();
        });

        let mut stream =
            BridgeStream::connect(&addr.to_string(), &TransportConfig::default()).unwrap();
        assert_eq!(stream.peer_addr(), addr);

        stream.write_all(b"$rf\n!").unwrap();
        let mut echoed = [0u8; 5];
        stream.read_exact(&mut echoed).unwrap();
        assert_eq!(&echoed, b"$rf\n!");

        server.join().unwrap();
    }

    #[test]
    fn connect_refused_reports_address() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let err = BridgeStream::connect(&addr.to_string(), &TransportConfig::default())
            .unwrap_err();
        match err {
            TransportError::Connect { addr: reported, .. } => {
                assert_eq!(reported, addr.to_string())
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unresolvable_address() {
        let err = BridgeStream::connect("not-an-address", &TransportConfig::default())
            .unwrap_err();
        assert!(matches!(err, TransportError::Resolve { .. }));
        assert!(err.io_source().is_some());
    }

    #[test]
    fn timeouts_and_clone() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = std::thread::spawn(move || TcpStream::connect(addr).unwrap());
        let (accepted, _) = listener.accept().unwrap();
        let _client = client.join().unwrap();

        let stream = BridgeStream::from_std(accepted).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_millis(10)))
            .unwrap();
        stream
            .set_write_timeout(Some(Duration::from_millis(10)))
            .unwrap();

        let cloned = stream.try_clone().unwrap();
        assert_eq!(cloned.peer_addr(), stream.peer_addr());
        stream.shutdown().unwrap();
    }
}
