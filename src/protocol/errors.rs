//! Protocol error types
//!
//! [`ProtocolError`] covers malformed host input and commands that do not fit
//! the target session's state. Runtime failures of the program itself are
//! wrapped as [`ProtocolError::Runtime`].

use super::session::SessionId;
use crate::interpreter::errors::RuntimeError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Not implemented interpreter mode: {0}")]
    UnknownMode(String),

    /// Not valid JSON, or does not fit the message schema
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// The handle does not name the current session
    #[error("Unknown session {0}")]
    UnknownSession(SessionId),

    /// A session command arrived before any `start`
    #[error("No active session")]
    NoSession,

    #[error("Session {0} has already finished")]
    SessionFinished(SessionId),

    /// `stop` on a session that is not stepping
    #[error("Session {0} is not stepping")]
    InactiveSession(SessionId),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(e: serde_json::Error) -> Self {
        ProtocolError::Malformed(e.to_string())
    }
}
