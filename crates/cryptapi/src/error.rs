use thiserror::Error;

/// Errors returned by CryptAPI operations. Any of them aborts the current call.
#[derive(Debug, Error)]
pub enum CryptApiError {
    /// A required argument was missing or out of range. No request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request never produced a readable response.
    #[error("http error: {0}")]
    Http(String),

    /// The gateway answered, but reported a failure.
    #[error("api error: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("session is closed")]
    Closed,
}

impl CryptApiError {
    /// The carried message, without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::Http(m) | Self::Decode(m) | Self::Config(m) => m,
            Self::Api { message, .. } => message,
            Self::Closed => "session is closed",
        }
    }

    /// True when the gateway itself reported the failure.
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

impl From<serde_json::Error> for CryptApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CryptApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_strips_prefix() {
        let err = CryptApiError::Api {
            status: Some(400),
            message: "The provided address is not valid".to_string(),
        };
        assert_eq!(err.message(), "The provided address is not valid");
        assert_eq!(err.to_string(), "api error: The provided address is not valid");
        assert!(err.is_api());
    }

    #[test]
    fn test_serde_error_becomes_decode() {
        let err: CryptApiError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, CryptApiError::Decode(_)));
        assert!(!err.is_api());
    }
}
