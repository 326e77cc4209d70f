//! Stream resolution error types.

/// Errors from redirect resolution and the stream cache.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The stream page answered with a redirect but no Location header
    #[error("redirect status {status} without a Location header")]
    MissingLocation { status: u16 },

    /// The stream page did not redirect at all
    #[error("expected a redirect, got status {status}")]
    UnexpectedStatus { status: u16 },

    /// Cache store operation failed
    #[error("cache error: {message}")]
    Cache { message: String },

    /// Cache namespace cannot be chosen (empty version token, bad id)
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ResolveError::UnexpectedStatus { status: 200 };
        assert_eq!(err.to_string(), "expected a redirect, got status 200");

        let err = ResolveError::MissingLocation { status: 302 };
        assert_eq!(
            err.to_string(),
            "redirect status 302 without a Location header"
        );
    }
}
