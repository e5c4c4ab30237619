//! Error types shared by the upstream HTTP clients.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`ApiError`] failures.
pub type ApiResult<T> = Result<T, ApiError>;

/// Longest body excerpt kept on [`ApiError::Status`].
pub const BODY_EXCERPT_LEN: usize = 200;

/// Failures that can occur while calling an upstream API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The upstream kept answering `429 Too Many Requests` after every retry.
    #[error("rate limited by `{url}` after {attempts} attempts")]
    RateLimited {
        /// Request URL.
        url: String,
        /// Requests sent, including retries.
        attempts: u32,
    },
    /// The upstream answered with a non-success status.
    #[error("unexpected response status {status} for `{url}`: {body}")]
    Status {
        /// Request URL.
        url: String,
        /// Status returned.
        status: StatusCode,
        /// Start of the response body.
        body: String,
    },
    /// A configured base URL cannot carry request paths.
    #[error("invalid upstream base URL `{url}`")]
    InvalidUrl {
        /// Base URL as configured.
        url: String,
    },
    /// The request could not be sent or the connection dropped.
    #[error("failed to send request to `{url}`")]
    Network {
        /// Request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Response payload could not be parsed into the expected model.
    #[error("failed to decode response from `{url}`")]
    Decode {
        /// Request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Status code for [`ApiError::Status`] failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Cut a response body down to a short single-line excerpt.
pub fn body_excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= BODY_EXCERPT_LEN {
        flat
    } else {
        let mut cut: String = flat.chars().take(BODY_EXCERPT_LEN).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_flattens_and_truncates() {
        assert_eq!(body_excerpt("  not\n found "), "not found");

        let long = "x".repeat(BODY_EXCERPT_LEN + 50);
        let excerpt = body_excerpt(&long);
        assert_eq!(excerpt.chars().count(), BODY_EXCERPT_LEN + 1);
        assert!(excerpt.ends_with('…'));
    }
}
