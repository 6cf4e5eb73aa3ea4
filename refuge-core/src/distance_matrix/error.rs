use thiserror::Error;

/// Coarse status of a distance matrix call as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    /// The call succeeded; individual elements may still be unreachable.
    Ok,
    /// The call exceeded a provider capacity limit.
    OverQuota,
    /// Any other failure.
    OtherError,
}

/// Errors from [`crate::DistanceMatrixProvider::query`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceMatrixError {
    /// No destinations were provided.
    #[error("at least one destination is required")]
    EmptyInput,

    /// The request exceeded the provider's capacity.
    ///
    /// Raised locally when the destination count is above the configured
    /// cap, or when the remote service reports a size or rate limit.
    #[error("{requested} destinations exceed the provider limit of {limit}")]
    OverQuota {
        /// Number of destinations in the request.
        requested: usize,
        /// Maximum accepted by the provider.
        limit: usize,
    },

    /// The provider returned a row that does not match the request.
    #[error("expected {expected} row elements but received {actual}")]
    MalformedRow {
        /// Number of destinations requested.
        expected: usize,
        /// Number of elements returned.
        actual: usize,
    },

    /// The request timed out.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The URL that was requested.
        url: String,
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },

    /// A network error prevented the request from reaching the service.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Description of the failure.
        message: String,
    },

    /// The service answered with an application-level error code.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Provider-specific status code.
        code: String,
        /// Human-readable message supplied by the service.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
}

impl DistanceMatrixError {
    /// Classify the error for the resolver's fallback protocol.
    ///
    /// # Examples
    /// ```
    /// use refuge_core::{CallStatus, DistanceMatrixError};
    ///
    /// let err = DistanceMatrixError::OverQuota { requested: 30, limit: 25 };
    /// assert_eq!(err.status(), CallStatus::OverQuota);
    /// assert_eq!(DistanceMatrixError::EmptyInput.status(), CallStatus::OtherError);
    /// ```
    #[must_use]
    pub const fn status(&self) -> CallStatus {
        match self {
            Self::OverQuota { .. } => CallStatus::OverQuota,
            _ => CallStatus::OtherError,
        }
    }
}
