//! Worker pool: run / submit / stop.
//!
//! # Architecture
//!
//! ```text
//! submitter ──► Pool::submit ──► shared queue ──► (any healthy) Worker
//!                                                     │
//!                                              Client::execute
//!                                                     │
//! submitter ◄── job's response channel ◄──────────────┘
//! ```
//!
//! Control plane: `stop` cancels the pool-level token; the supervisor fans
//! termination out to every worker and signals the pool-death channel once
//! all of them have acknowledged. A worker that hits a transport fault
//! quarantines itself, leaving the queue to its peers — a single healthy
//! worker is enough to drain it.

mod config;
mod health;
mod supervisor;
mod worker;

pub use config::{
    PoolConfig, DEFAULT_QUEUE_BUFFER, DEFAULT_RECONNECT_INTERVAL, DEFAULT_WORKERS_PER_CLIENT,
};
pub use health::{PoolHealth, PoolHealthSnapshot, PoolStatus};

use crate::client::SolrClient;
use crate::error::PoolError;
use crate::job::SolrJob;
use std::sync::{Arc, Mutex, MutexGuard};
use supervisor::Supervisor;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::info;
use worker::Worker;

/// Caller-visible signal that every worker has acknowledged termination.
pub type PoolDeathReceiver = oneshot::Receiver<()>;

/// Lifecycle state; present only between `run` and `stop`.
#[derive(Default)]
struct PoolInner {
    queue_tx: Option<mpsc::Sender<Arc<dyn SolrJob>>>,
    shutdown: Option<CancellationToken>,
}

/// A fixed-size worker pool over a set of endpoint-bound clients.
///
/// Clients are provided by the caller and outlive the pool; the pool holds
/// shared references only. Workers are spawned by [`run`](Self::run) and
/// terminated through [`stop`](Self::stop).
pub struct Pool {
    clients: Vec<Arc<dyn SolrClient>>,
    config: PoolConfig,
    health: Arc<PoolHealth>,
    inner: Mutex<PoolInner>,
}

impl Pool {
    /// Records clients and configuration; nothing is spawned yet.
    pub fn new(clients: Vec<Arc<dyn SolrClient>>, config: PoolConfig) -> Self {
        Self {
            clients,
            config,
            health: Arc::new(PoolHealth::new()),
            inner: Mutex::new(PoolInner::default()),
        }
    }

    /// Spawns `workers_per_client × |clients|` workers plus one supervisor.
    /// Must be called within a Tokio runtime.
    ///
    /// Returns the pool-death channel the supervisor fires once every worker
    /// has acknowledged termination after [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// [`PoolError::Running`] when the pool is already running,
    /// [`PoolError::NoActiveWorkers`] when clients or workers-per-client is
    /// zero.
    pub fn run(&self) -> Result<PoolDeathReceiver, PoolError> {
        let mut inner = self.lock();

        if inner.queue_tx.is_some() {
            return Err(PoolError::Running);
        }

        let total_workers = self.clients.len() * self.config.workers_per_client;
        if total_workers == 0 {
            return Err(PoolError::NoActiveWorkers);
        }

        info!(
            workers = total_workers,
            clients = self.clients.len(),
            "starting pool"
        );

        // tokio channels reject a zero bound; a rendezvous queue degrades to
        // a single-slot buffer.
        let (queue_tx, queue_rx) = mpsc::channel(self.config.queue_buffer.max(1));
        let queue = Arc::new(tokio::sync::Mutex::new(queue_rx));

        let shutdown = CancellationToken::new();
        let (ack_tx, ack_rx) = mpsc::channel(total_workers);
        let (pool_death_tx, pool_death_rx) = oneshot::channel();

        self.health.reset_workers(total_workers);

        let mut worker_tokens = Vec::with_capacity(total_workers);
        for (client_idx, client) in self.clients.iter().enumerate() {
            for slot in 0..self.config.workers_per_client {
                let token = CancellationToken::new();
                worker_tokens.push(token.clone());

                let worker = Worker::new(
                    client_idx * self.config.workers_per_client + slot,
                    Arc::clone(client),
                    Arc::clone(&queue),
                    token,
                    ack_tx.clone(),
                    self.config.reconnect_interval,
                    Arc::clone(&self.health),
                );
                tokio::spawn(worker.run());
            }
        }

        let supervisor = Supervisor::new(shutdown.clone(), worker_tokens, ack_rx, pool_death_tx);
        tokio::spawn(supervisor.run());

        inner.queue_tx = Some(queue_tx);
        inner.shutdown = Some(shutdown);

        Ok(pool_death_rx)
    }

    /// Enqueues a job, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotRunning`] before `run`, after `stop`, or when the
    /// queue closed while this submission was blocked on it.
    pub async fn submit(&self, job: Arc<dyn SolrJob>) -> Result<(), PoolError> {
        // Hold the lifecycle lock only long enough to read the queue handle;
        // a submitter blocked on a full queue must never block `stop`.
        let queue_tx = self.lock().queue_tx.clone();

        let queue_tx = queue_tx.ok_or(PoolError::NotRunning)?;
        queue_tx
            .send(job)
            .await
            .map_err(|_| PoolError::NotRunning)?;

        self.health.record_submission();
        Ok(())
    }

    /// Stops the pool. Idempotent; silently returns when not running.
    ///
    /// Cancels the pool-level token and drops the queue sender atomically,
    /// so later submissions fail with [`PoolError::NotRunning`]. Does not
    /// wait for the workers; use the channel returned by [`run`](Self::run)
    /// for that.
    pub fn stop(&self) {
        let mut inner = self.lock();

        let Some(shutdown) = inner.shutdown.take() else {
            return;
        };
        inner.queue_tx = None;
        shutdown.cancel();

        info!("pool stopping");
    }

    /// A point-in-time snapshot of pool health.
    pub fn health(&self) -> PoolHealthSnapshot {
        self.health.snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("clients", &self.clients.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockSolrClient;
    use crate::query::SolrQuery;
    use std::time::Duration;

    fn mock_pool(workers_per_client: usize, queue_buffer: usize) -> Pool {
        Pool::new(
            vec![Arc::new(MockSolrClient::new())],
            PoolConfig::new(workers_per_client, queue_buffer, Duration::from_millis(50)),
        )
    }

    #[tokio::test]
    async fn test_submit_before_run_fails() {
        let pool = mock_pool(1, 1);
        let job = Arc::new(SolrQuery::new("*:*", 0, 0, "select"));

        assert_eq!(pool.submit(job).await, Err(PoolError::NotRunning));
    }

    #[tokio::test]
    async fn test_double_run_fails() {
        let pool = mock_pool(1, 1);

        let death = pool.run().unwrap();
        assert_eq!(pool.run().unwrap_err(), PoolError::Running);

        pool.stop();
        death.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_with_no_workers_fails() {
        let no_clients = Pool::new(vec![], PoolConfig::default());
        assert_eq!(no_clients.run().unwrap_err(), PoolError::NoActiveWorkers);

        let no_workers = mock_pool(0, 1);
        assert_eq!(no_workers.run().unwrap_err(), PoolError::NoActiveWorkers);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let pool = mock_pool(1, 1);
        pool.stop();

        let death = pool.run().unwrap();
        pool.stop();
        pool.stop();
        death.await.unwrap();
    }

    #[tokio::test]
    async fn test_submit_after_stop_fails() {
        let pool = mock_pool(1, 1);
        let death = pool.run().unwrap();
        pool.stop();
        death.await.unwrap();

        let job = Arc::new(SolrQuery::new("*:*", 0, 0, "select"));
        assert_eq!(pool.submit(job).await, Err(PoolError::NotRunning));
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let pool = mock_pool(2, 1);

        let first_death = pool.run().unwrap();
        pool.stop();

        let second_death = pool.run().unwrap();
        pool.stop();

        first_death.await.unwrap();
        second_death.await.unwrap();
    }

    #[tokio::test]
    async fn test_submitted_job_is_served() {
        let pool = mock_pool(2, 4);
        let death = pool.run().unwrap();

        let query = Arc::new(SolrQuery::new("123", 0, 0, "select"));
        pool.submit(query.clone()).await.unwrap();

        // The mock echoes the payload; SolrQuery payloads are JSON, so the
        // echo stays at the canned zero. Delivery is what matters here.
        let response = query.wait().await.unwrap();
        assert!(response.error.is_none());

        let snapshot = pool.health();
        assert_eq!(snapshot.jobs_submitted, 1);

        pool.stop();
        death.await.unwrap();
    }
}
