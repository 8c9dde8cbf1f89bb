/// Errors that can occur while talking to a bridge over TCP.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The bridge address could not be resolved.
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        source: std::io::Error,
    },

    /// The bridge address resolved to nothing.
    #[error("no socket address found for {addr}")]
    NoAddress { addr: String },

    /// Failed to connect to the bridge.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the established stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// The underlying I/O error, if any.
    pub fn io_source(&self) -> Option<&std::io::Error> {
        match self {
            TransportError::Resolve { source, .. } | TransportError::Connect { source, .. } => {
                Some(source)
            }
            TransportError::Io(err) => Some(err),
            TransportError::NoAddress { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
