//! Worker state machine.
//!
//! A worker is a single-threaded loop bound to one client. It alternates
//! between two states:
//!
//! ```text
//! Draining ──[execute reports transport-temporary]──> Quarantined
//! Quarantined ──[test_connection succeeds]──> Draining
//! ```
//!
//! While `Draining` the worker consumes the shared queue; while
//! `Quarantined` it leaves the queue to its healthy peers and probes its own
//! endpoint on a timer. In both states the private termination token wins
//! over any other ready event, so shutdown is never starved.

use super::health::PoolHealth;
use crate::client::SolrClient;
use crate::error::SolrError;
use crate::job::SolrJob;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The shared job queue's consuming end, one lock per dequeue.
pub(crate) type JobQueue = Arc<tokio::sync::Mutex<mpsc::Receiver<Arc<dyn SolrJob>>>>;

pub(crate) struct Worker {
    id: usize,
    client: Arc<dyn SolrClient>,
    queue: JobQueue,
    shutdown: CancellationToken,
    ack_tx: mpsc::Sender<()>,
    reconnect_interval: Duration,
    health: Arc<PoolHealth>,
    online: bool,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: usize,
        client: Arc<dyn SolrClient>,
        queue: JobQueue,
        shutdown: CancellationToken,
        ack_tx: mpsc::Sender<()>,
        reconnect_interval: Duration,
        health: Arc<PoolHealth>,
    ) -> Self {
        Self {
            id,
            client,
            queue,
            shutdown,
            ack_tx,
            reconnect_interval,
            health,
            online: true,
        }
    }

    /// Runs until the termination token fires, then acknowledges death.
    pub(crate) async fn run(mut self) {
        debug!(worker = self.id, "worker started");
        self.health.worker_online();

        loop {
            let keep_going = if self.online {
                self.drain().await
            } else {
                self.probe().await
            };
            if !keep_going {
                break;
            }
        }

        if self.online {
            self.health.worker_offline();
        }
        debug!(worker = self.id, "worker stopped");
        let _ = self.ack_tx.send(()).await;
    }

    /// One `Draining` iteration. Returns `false` on termination.
    async fn drain(&mut self) -> bool {
        let shutdown = self.shutdown.clone();
        let queue = Arc::clone(&self.queue);

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => false,

            job = async { queue.lock().await.recv().await } => match job {
                Some(job) => {
                    self.serve(job).await;
                    true
                }
                None => {
                    // Queue closed: the pool stopped and the backlog is gone.
                    // Park until our termination token fires.
                    self.shutdown.cancelled().await;
                    false
                }
            },
        }
    }

    /// Executes one job and delivers its response.
    ///
    /// A transport-temporary failure quarantines this worker, but the job is
    /// still answered immediately with the `HostTimeout` sentinel; in-flight
    /// jobs are never held back.
    async fn serve(&mut self, job: Arc<dyn SolrJob>) {
        let (mut response, retry) = self.client.execute(job.as_ref()).await;

        if retry {
            warn!(
                worker = self.id,
                handler = job.handler(),
                "transport-temporary failure, quarantining"
            );
            response.error = Some(SolrError::HostTimeout);
            self.online = false;
            self.health.worker_offline();
            self.health.record_quarantine();
        }

        self.health.record_served(response.error.is_some());

        // Sole write to this job's capacity-one channel. A submitter that
        // abandoned its job closed the channel; nothing left to do then.
        let _ = job.result_ch().send(response).await;
    }

    /// One `Quarantined` iteration. Returns `false` on termination.
    async fn probe(&mut self) -> bool {
        let shutdown = self.shutdown.clone();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => false,

            _ = tokio::time::sleep(self.reconnect_interval) => {
                self.health.record_probe();
                if self.client.test_connection().await {
                    info!(worker = self.id, "endpoint reachable again, resuming");
                    self.online = true;
                    self.health.worker_online();
                } else {
                    debug!(worker = self.id, "endpoint still unreachable");
                }
                true
            }
        }
    }
}
