use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`ConfigClient`](crate::ConfigClient).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-200 status.
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The response body is not valid JSON for the requested type.
    #[error("failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Raw response body, kept for diagnosis.
        body: String,
    },

    #[error("failed to encode config: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ClientError {
    /// HTTP status of a [`ClientError::Status`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Request(e) => e.status(),
            _ => None,
        }
    }

    /// The `error` field of a server `{"error": ...}` body, if present.
    pub fn server_message(&self) -> Option<String> {
        let ClientError::Status { body, .. } = self else {
            return None;
        };
        serde_json::from_str::<ErrorBody>(body).ok().map(|b| b.error)
    }
}
