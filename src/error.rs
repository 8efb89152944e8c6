//! Session errors.
//!
//! Nothing here escapes the connection lifecycle: a [`SessionError`] is
//! logged and turned into an [`Outcome`](crate::network::Outcome) by the
//! caller.

use slirc_wire::ProtocolError;
use std::time::Duration;
use thiserror::Error;

/// Failures that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unable to connect to {server}:{port}: {source}")]
    Connect {
        server: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("connecting to {server}:{port} timed out after {timeout:?}")]
    ConnectTimeout {
        server: String,
        port: u16,
        timeout: Duration,
    },

    #[error("transport error: {0}")]
    Transport(#[from] ProtocolError),
}

impl SessionError {
    /// Static label for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect_failed",
            Self::ConnectTimeout { .. } => "connect_timeout",
            Self::Transport(_) => "transport",
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        Self::Transport(ProtocolError::Io(e))
    }
}
