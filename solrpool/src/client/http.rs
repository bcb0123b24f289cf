//! HTTP transport abstraction and the reqwest-backed Solr client.
//!
//! The transport trait exists for dependency injection: tests exercise
//! [`HttpSolrClient`] against an in-memory transport, production code uses
//! [`ReqwestTransport`].

use super::SolrClient;
use crate::error::{SolrError, TransportError};
use crate::job::SolrJob;
use crate::response::SolrResponse;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default request deadline.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Idle connections kept per endpoint. Workers sharing a client re-use these.
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 2;

/// Basic-auth credentials for endpoints that require them.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Minimal HTTP capability the Solr client consumes.
pub trait HttpTransport: Send + Sync {
    /// POSTs a JSON body and returns the raw response body.
    ///
    /// The HTTP status code is deliberately not part of the contract: Solr
    /// reports failures inside the JSON envelope, which the caller decodes.
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
        auth: Option<&'a Credentials>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + Send + 'a>>;
}

/// Real transport backed by a pooled [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default deadline.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a transport with a custom request deadline.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn post<'a>(
        &'a self,
        url: &'a str,
        body: Vec<u8>,
        auth: Option<&'a Credentials>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            trace!(url = url, bytes = body.len(), "HTTP POST starting");

            let mut request = self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .body(body);
            if let Some(credentials) = auth {
                request = request.basic_auth(&credentials.username, Some(&credentials.password));
            }

            let response = request.send().await.map_err(classify)?;
            debug!(
                url = url,
                status = response.status().as_u16(),
                "HTTP response received"
            );

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(classify)
        })
    }
}

/// Maps a reqwest failure onto the transport taxonomy that drives worker
/// quarantine decisions.
fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

/// A [`SolrClient`] bound to one host and one core over HTTP.
pub struct HttpSolrClient<T = ReqwestTransport> {
    host: String,
    core: String,
    credentials: Option<Credentials>,
    transport: T,
}

impl HttpSolrClient<ReqwestTransport> {
    /// Creates a client for `{host}/solr/{core}` with the default transport.
    pub fn new(host: impl Into<String>, core: impl Into<String>) -> Result<Self, TransportError> {
        Ok(Self::with_transport(host, core, ReqwestTransport::new()?))
    }

    /// Like [`new`](Self::new), with basic authentication.
    pub fn with_auth(
        host: impl Into<String>,
        core: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let mut client = Self::new(host, core)?;
        client.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        Ok(client)
    }
}

impl<T: HttpTransport> HttpSolrClient<T> {
    /// Creates a client over a caller-supplied transport.
    pub fn with_transport(host: impl Into<String>, core: impl Into<String>, transport: T) -> Self {
        Self {
            host: host.into(),
            core: core.into(),
            credentials: None,
            transport,
        }
    }

    /// The endpoint host this client is bound to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The Solr core this client addresses.
    pub fn core(&self) -> &str {
        &self.core
    }

    async fn exec_raw(&self, handler: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}/solr/{}/{}", self.host, self.core, handler);
        self.transport
            .post(&url, body, self.credentials.as_ref())
            .await
    }
}

impl<T: HttpTransport + 'static> SolrClient for HttpSolrClient<T> {
    fn execute<'a>(
        &'a self,
        job: &'a dyn SolrJob,
    ) -> Pin<Box<dyn Future<Output = (SolrResponse, bool)> + Send + 'a>> {
        Box::pin(async move {
            match self.exec_raw(job.handler(), job.bytes()).await {
                Ok(body) => match SolrResponse::from_bytes(&body) {
                    Ok(response) => (response, false),
                    Err(e) => {
                        warn!(host = %self.host, error = %e, "failed to decode Solr response");
                        (SolrResponse::from_error(e), false)
                    }
                },
                Err(e) => {
                    warn!(host = %self.host, handler = job.handler(), error = %e, "Solr request failed");
                    let retry = e.is_temporary();
                    (
                        SolrResponse::from_error(SolrError::Transport(e.to_string())),
                        retry,
                    )
                }
            }
        })
    }

    fn test_connection(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            // Empty POST to the root handler; any completed exchange counts.
            let ok = self.exec_raw("", Vec::new()).await.is_ok();
            if !ok {
                debug!(host = %self.host, "connection probe failed");
            }
            ok
        })
    }
}
