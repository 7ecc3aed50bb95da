//! Error types for request execution.
//!
//! # Design
//! A GET with a body is not an error here: the executor answers it with a 412
//! outcome. Everything below is an execution failure, which the controller
//! collapses into a 500 state carrying the display text.

/// Errors returned while building, sending or decoding a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The transport failed before a response arrived.
    #[error("{0}")]
    Transport(String),

    /// The response body could not be decoded as the expected type.
    #[error("deserialization failed: {0}")]
    Decode(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// reqwest refused to build the request, e.g. an unparsable URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_builder() {
            Self::InvalidRequest(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_displays_message_verbatim() {
        assert_eq!(FetchError::Transport("timeout".to_string()).to_string(), "timeout");
    }

    #[test]
    fn decode_error_is_prefixed() {
        let error = FetchError::Decode("expected value at line 1 column 1".to_string());
        assert_eq!(
            error.to_string(),
            "deserialization failed: expected value at line 1 column 1"
        );
    }
}
