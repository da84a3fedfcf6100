use crate::PlayerId;
use thiserror::Error;

/// Reasons a single protocol message is rejected.
///
/// None of these are fatal: the message is logged and dropped, and the
/// connection keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("no player registered for connection {0}")]
    UnknownPlayer(PlayerId),

    #[error("unrecognized action type {0:?}")]
    InvalidActionType(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::MalformedPayload(err.to_string())
    }
}
