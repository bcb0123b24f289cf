//! Error types for the pool and the Solr wire protocol.
//!
//! Errors are split by where they surface: [`PoolError`] is returned
//! synchronously from lifecycle calls, [`SolrError`] travels inside a
//! [`SolrResponse`](crate::response::SolrResponse) back to the submitter, and
//! [`TransportError`] is what the HTTP layer reports to the client before it
//! is folded into a response.

use thiserror::Error;

/// Errors returned synchronously by pool lifecycle operations.
///
/// These indicate caller mis-sequencing, never a failure of an individual
/// job. Jobs report failure through the error embedded in their response.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Submit was called before Run, or after Stop.
    #[error("pool is not running")]
    NotRunning,

    /// Run was called while the pool was already running.
    #[error("pool is already running")]
    Running,

    /// Run was called with a configuration that yields zero workers.
    #[error("pool has no active workers")]
    NoActiveWorkers,
}

/// Errors carried inside a [`SolrResponse`](crate::response::SolrResponse).
///
/// A response either reflects what the server said (error unset) or carries
/// exactly one of these explaining why it could not (error set, remaining
/// fields zero-valued).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolrError {
    /// The endpoint timed out or failed transiently; the worker that served
    /// this job has quarantined itself.
    #[error("host timeout")]
    HostTimeout,

    /// The request never produced a usable HTTP exchange.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON.
    #[error("malformed response body: {0}")]
    Malformed(String),

    /// The envelope had no `responseHeader` object.
    #[error("missing response header")]
    MissingResponseHeader,

    /// The `responseHeader` lacked `status` or `QTime`.
    #[error("invalid response header")]
    InvalidHeader,

    /// The `response` element was not an object.
    #[error("response element has unexpected type")]
    UnexpectedResponseType,

    /// The `response` element carried no `docs` array.
    #[error("response element has no docs")]
    MissingDocs,

    /// The `docs` element was not an array.
    #[error("docs element has unexpected type")]
    UnexpectedDocsType,
}

/// Errors reported by an [`HttpTransport`](crate::client::HttpTransport).
///
/// The variant decides whether the client asks its worker to quarantine:
/// timeouts and connect-level failures are transport-temporary, everything
/// else is permanent and stays with the job alone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request exceeded the client's deadline.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport failure (DNS, protocol, body read).
    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether retrying against the same endpoint later is worthwhile.
    pub fn is_temporary(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Connect(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_error_display() {
        assert_eq!(PoolError::NotRunning.to_string(), "pool is not running");
        assert_eq!(PoolError::Running.to_string(), "pool is already running");
        assert_eq!(
            PoolError::NoActiveWorkers.to_string(),
            "pool has no active workers"
        );
    }

    #[test]
    fn test_transport_error_classification() {
        assert!(TransportError::Timeout("deadline".into()).is_temporary());
        assert!(TransportError::Connect("refused".into()).is_temporary());
        assert!(!TransportError::Other("dns".into()).is_temporary());
    }

    #[test]
    fn test_solr_error_equality() {
        assert_eq!(SolrError::HostTimeout, SolrError::HostTimeout);
        assert_ne!(SolrError::HostTimeout, SolrError::InvalidHeader);
    }
}
