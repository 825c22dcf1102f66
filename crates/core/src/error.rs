use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport already open")]
    AlreadyOpen,
    #[error("transport not open")]
    NotOpen,
    #[error("transport closed")]
    Closed,
    #[error("transport failed: {0}")]
    Failed(String),
}

/// Local validation failures. Nothing is sent when one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("choose a table first")]
    MissingTable,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
    #[error("not joined to a room")]
    NotJoined,
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("encode error: {0}")]
    Encode(String),
}

impl From<serde_json::Error> for SessionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value.to_string())
    }
}
