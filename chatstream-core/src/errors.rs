//! Error types for request construction.

use thiserror::Error;

/// A request that cannot be sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The request carries no messages.
    #[error("Request has no messages")]
    NoMessages,

    /// The model name is empty.
    #[error("Request has an empty model name")]
    EmptyModel,
}

/// Result type alias using RequestError.
pub type Result<T> = std::result::Result<T, RequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(RequestError::NoMessages.to_string(), "Request has no messages");
        assert_eq!(
            RequestError::EmptyModel.to_string(),
            "Request has an empty model name"
        );
    }
}
