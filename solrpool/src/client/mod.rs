//! Client capability consumed by the worker pool.
//!
//! A client is bound to one endpoint (host + core) and is shared by every
//! worker assigned to that endpoint, so implementations must be internally
//! thread-safe. The pool neither creates nor destroys clients; their
//! lifecycle belongs to the caller.

mod http;
mod mock;

pub use http::{Credentials, HttpSolrClient, HttpTransport, ReqwestTransport};
pub use mock::MockSolrClient;

use crate::job::SolrJob;
use crate::response::SolrResponse;
use std::future::Future;
use std::pin::Pin;

/// Endpoint-bound job executor.
///
/// `execute` must always produce a response: on failure the error is embedded
/// in the response and the second element reports whether the fault looked
/// transport-temporary, in which case the serving worker quarantines itself
/// and calls `test_connection` until the endpoint answers again.
pub trait SolrClient: Send + Sync + 'static {
    /// Runs one job against the endpoint.
    ///
    /// Returns the response plus a retry hint: `true` when the error is
    /// transport-temporary (timeout, transient network fault), `false` for
    /// everything else including decode failures.
    fn execute<'a>(
        &'a self,
        job: &'a dyn SolrJob,
    ) -> Pin<Box<dyn Future<Output = (SolrResponse, bool)> + Send + 'a>>;

    /// Issues a minimal probe against the endpoint.
    ///
    /// Returns `true` when the probe produced a non-error HTTP exchange.
    fn test_connection(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}
