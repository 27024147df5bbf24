//! Error types for sample intake.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors from opening or reading a sample source.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The input is not audio this grabber can analyze.
    #[error("unsupported input: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The receiver could not be reached.
    #[error("cannot connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// The receiver answered but refused to serve us.
    #[error("receiver refused the session: {0}")]
    Rejected(String),

    /// A frame from the receiver could not be decoded.
    #[error("malformed {tag} frame: {reason}")]
    Protocol { tag: String, reason: String },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

impl IntakeError {
    pub(crate) fn protocol(tag: &str, reason: impl Into<String>) -> Self {
        IntakeError::Protocol {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<hound::Error> for IntakeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => IntakeError::Io(e),
            other => IntakeError::Format(other.to_string()),
        }
    }
}
