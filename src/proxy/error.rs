use std::fmt;
use std::io;

use thiserror::Error;

/// Which peer of the relay an I/O failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Client,
    Origin,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Client => f.write_str("client"),
            Side::Origin => f.write_str("origin"),
        }
    }
}

/// Per-request failures. None of these escape the connection task; the
/// request is dropped and the error logged.
#[derive(Debug, Error)]
pub(crate) enum RequestError {
    #[error("failed to read from {side}")]
    Read {
        side: Side,
        #[source]
        source: io::Error,
    },

    #[error("{side} closed the connection before a line terminator")]
    EndOfStream { side: Side },

    #[error("line from {side} exceeds the {limit}-byte limit")]
    LineTooLong { side: Side, limit: usize },

    #[error("failed to write to {side} after {written} bytes")]
    Write {
        side: Side,
        written: usize,
        #[source]
        source: io::Error,
    },

    #[error("malformed request: {reason}")]
    Malformed { reason: String },

    #[error("unable to connect to {host}:{port}")]
    Connect {
        host: String,
        port: String,
        #[source]
        source: io::Error,
    },
}

impl RequestError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        RequestError::Malformed {
            reason: reason.into(),
        }
    }
}
