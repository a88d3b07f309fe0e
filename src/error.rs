//! Errors reported by [`crate::session::SensorSession`].
//!
//! They fall into three groups a caller usually renders differently:
//! usage errors (wrong connection state), protocol violations by the device
//! and failures of the serial transport.
use crate::{protocol as proto, transport::TransportError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operation needs an open connection.
    #[error("Not connected to a sensor")]
    NotConnected,

    /// `connect` was called on an open session.
    #[error("Already connected to a sensor")]
    AlreadyConnected,

    /// Wraps `proto::Error`.
    #[error(transparent)]
    Protocol(#[from] proto::Error),

    /// Wraps `TransportError`.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl Error {
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::NotConnected | Self::AlreadyConnected)
    }

    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// The result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
