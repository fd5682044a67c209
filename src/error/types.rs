//! Error types
//!
//! Defines domain-specific error types for each module of the relay server.

use std::fmt;
use std::io;

use tokio_tungstenite::tungstenite::error::{Error as WsError, ProtocolError};

use crate::connection::ConnectionId;

/// Failure delivering one payload to one recipient during a broadcast.
#[derive(Debug)]
pub enum SendError {
    /// The recipient's session is gone and its outbound queue is closed.
    Closed(ConnectionId),
    /// The recipient's outbound queue is saturated (slow or stalled consumer).
    QueueFull(ConnectionId),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Closed(id) => write!(f, "Recipient {} is gone", id),
            SendError::QueueFull(id) => write!(f, "Outbound queue full for recipient {}", id),
        }
    }
}

impl std::error::Error for SendError {}

/// Session module errors
#[derive(Debug)]
pub enum SessionError {
    /// WebSocket handshake with the peer failed.
    Handshake(WsError),
    /// The peer closed the connection; expected and non-fatal.
    ConnectionClosed,
    /// Unexpected transport or protocol failure.
    Transport(WsError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Handshake(e) => write!(f, "WebSocket handshake failed: {}", e),
            SessionError::ConnectionClosed => write!(f, "Connection closed by peer"),
            SessionError::Transport(e) => write!(f, "Transport error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<WsError> for SessionError {
    fn from(error: WsError) -> Self {
        match error {
            // The transport's ways of reporting a peer disconnect, as opposed
            // to an unexpected failure
            WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
                SessionError::ConnectionClosed
            }
            other => SessionError::Transport(other),
        }
    }
}

/// General relay server error that encompasses all error types
#[derive(Debug)]
pub enum RelayServerError {
    Session(SessionError),
    Send(SendError),
    Config(config::ConfigError),
    IoError(io::Error),
}

impl fmt::Display for RelayServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayServerError::Session(e) => write!(f, "Session error: {}", e),
            RelayServerError::Send(e) => write!(f, "Send error: {}", e),
            RelayServerError::Config(e) => write!(f, "Configuration error: {}", e),
            RelayServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for RelayServerError {}

// Implement conversions from specific errors to RelayServerError
impl From<SessionError> for RelayServerError {
    fn from(error: SessionError) -> Self {
        RelayServerError::Session(error)
    }
}

impl From<SendError> for RelayServerError {
    fn from(error: SendError) -> Self {
        RelayServerError::Send(error)
    }
}

impl From<config::ConfigError> for RelayServerError {
    fn from(error: config::ConfigError) -> Self {
        RelayServerError::Config(error)
    }
}

impl From<io::Error> for RelayServerError {
    fn from(error: io::Error) -> Self {
        RelayServerError::IoError(error)
    }
}
