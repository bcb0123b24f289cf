//! Job capability trait and the per-job response channel.
//!
//! A job is one request/response unit. The submitter creates it, the pool
//! queues it, a worker executes it against a client and delivers exactly one
//! [`SolrResponse`] on the job's capacity-one response channel. A job is
//! never re-enqueued.

use crate::response::SolrResponse;
use tokio::sync::mpsc;

/// Sending half of a job's response channel.
pub type ResponseSender = mpsc::Sender<SolrResponse>;

/// Receiving half of a job's response channel.
pub type ResponseReceiver = mpsc::Receiver<SolrResponse>;

/// Creates the capacity-one channel a job carries its response on.
///
/// Capacity one means the worker's single delivery never blocks, even when
/// the submitter has not started waiting yet.
pub fn response_channel() -> (ResponseSender, ResponseReceiver) {
    mpsc::channel(1)
}

/// Both halves of a job's response channel, bundled for the query builders.
///
/// The sending half is cloned out to whichever worker serves the job; the
/// receiving half stays here until the submitter calls [`wait`](Self::wait).
pub struct ResponseSlot {
    tx: ResponseSender,
    rx: std::sync::Mutex<Option<ResponseReceiver>>,
}

impl ResponseSlot {
    /// Creates a slot around a fresh capacity-one channel.
    pub fn new() -> Self {
        let (tx, rx) = response_channel();
        Self {
            tx,
            rx: std::sync::Mutex::new(Some(rx)),
        }
    }

    /// A sender for the worker-side delivery.
    pub fn sender(&self) -> ResponseSender {
        self.tx.clone()
    }

    /// Blocks until the response arrives.
    ///
    /// Returns `None` on a second call, or when the pool died before any
    /// worker could deliver.
    pub async fn wait(&self) -> Option<SolrResponse> {
        let receiver = self
            .rx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match receiver {
            Some(mut rx) => rx.recv().await,
            None => None,
        }
    }
}

impl Default for ResponseSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResponseSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSlot").finish_non_exhaustive()
    }
}

/// The information a [`SolrClient`](crate::client::SolrClient) needs to run
/// one unit of work, and the channel its response goes back on.
///
/// Implementations are the query builders in [`crate::query`]; tests bring
/// their own. Jobs are shared as `Arc<dyn SolrJob>` so the submitter can keep
/// a handle to wait on after handing the job to the pool.
pub trait SolrJob: Send + Sync {
    /// The endpoint sub-path this job targets (`select`, `update`, ...).
    fn handler(&self) -> &str;

    /// The JSON payload transmitted verbatim to the server.
    fn bytes(&self) -> Vec<u8>;

    /// A sender for the job's response channel.
    ///
    /// The worker that dequeues this job performs the channel's sole write.
    fn result_ch(&self) -> ResponseSender;

    /// Pagination offset hint, informational for the client.
    fn start(&self) -> usize {
        0
    }

    /// Pagination page-size hint, informational for the client.
    fn rows(&self) -> usize {
        0
    }
}
