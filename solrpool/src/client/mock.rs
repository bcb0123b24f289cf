//! In-memory Solr client for tests and examples.

use super::SolrClient;
use crate::job::SolrJob;
use crate::response::{DocumentCollection, SolrResponse};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A [`SolrClient`] that never touches the network.
///
/// Behaviour, sized for the pool's test scenarios:
/// - `execute` echoes a numeric job payload into the response `status`,
///   so submitters can match responses to jobs.
/// - when canned documents are present and `job.start()` points past them,
///   an empty collection is returned, letting paginating callers observe
///   end-of-stream.
/// - a client marked [`faulty`](Self::faulty) reports every execution as
///   transport-temporary, driving its workers into quarantine.
/// - `test_connection` counts probes and succeeds only on a healthy client.
pub struct MockSolrClient {
    faulty: AtomicBool,
    probes: AtomicUsize,
    executes: AtomicUsize,
    canned: Mutex<SolrResponse>,
}

impl MockSolrClient {
    /// A healthy client answering with an empty response.
    pub fn new() -> Self {
        Self {
            faulty: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
            executes: AtomicUsize::new(0),
            canned: Mutex::new(SolrResponse::default()),
        }
    }

    /// A client whose endpoint never answers.
    pub fn faulty() -> Self {
        let client = Self::new();
        client.faulty.store(true, Ordering::SeqCst);
        client
    }

    /// A healthy client replaying the given response.
    pub fn with_response(response: SolrResponse) -> Self {
        let client = Self::new();
        *client.canned.lock().unwrap() = response;
        client
    }

    /// Flips the simulated endpoint health.
    pub fn set_faulty(&self, faulty: bool) {
        self.faulty.store(faulty, Ordering::SeqCst);
    }

    /// Number of `test_connection` probes received so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Number of `execute` calls received so far.
    pub fn execute_count(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }
}

impl Default for MockSolrClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SolrClient for MockSolrClient {
    fn execute<'a>(
        &'a self,
        job: &'a dyn SolrJob,
    ) -> Pin<Box<dyn Future<Output = (SolrResponse, bool)> + Send + 'a>> {
        Box::pin(async move {
            self.executes.fetch_add(1, Ordering::SeqCst);
            let faulty = self.faulty.load(Ordering::SeqCst);
            let mut response = self.canned.lock().unwrap().clone();

            // Echo a numeric payload so the submitter can correlate.
            if let Ok(status) = String::from_utf8_lossy(&job.bytes()).parse::<i64>() {
                response.status = status;
            }

            // Callers iterate the result set until no documents come back.
            if let Some(collection) = &response.docs {
                if job.start() > collection.docs.len() {
                    response.docs = Some(DocumentCollection::default());
                }
            }

            (response, faulty)
        })
    }

    fn test_connection(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            self.probes.fetch_add(1, Ordering::SeqCst);
            !self.faulty.load(Ordering::SeqCst)
        })
    }
}
