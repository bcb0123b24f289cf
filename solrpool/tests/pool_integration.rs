//! Integration tests for the worker pool.
//!
//! These tests verify the complete pool workflow including:
//! - Lifecycle guards (run / submit / stop sequencing)
//! - Bulk throughput across worker and buffer configurations
//! - Quarantine of workers whose endpoint keeps timing out
//! - Fault isolation with a mixed healthy/faulty client set
//! - Pagination exhaustion observed through the pool

use solrpool::client::{MockSolrClient, SolrClient};
use solrpool::error::{PoolError, SolrError};
use solrpool::job::{ResponseSender, ResponseSlot, SolrJob};
use solrpool::pool::{Pool, PoolConfig};
use solrpool::query::SolrQuery;
use solrpool::response::{Document, DocumentCollection, SolrResponse};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Test Helpers
// =============================================================================

/// A job whose payload is a bare integer, which the mock client echoes into
/// the response status.
struct EchoJob {
    payload: String,
    slot: ResponseSlot,
}

impl EchoJob {
    fn new(value: usize) -> Self {
        Self {
            payload: value.to_string(),
            slot: ResponseSlot::new(),
        }
    }

    async fn wait(&self) -> Option<SolrResponse> {
        self.slot.wait().await
    }
}

impl SolrJob for EchoJob {
    fn handler(&self) -> &str {
        "select"
    }

    fn bytes(&self) -> Vec<u8> {
        self.payload.clone().into_bytes()
    }

    fn result_ch(&self) -> ResponseSender {
        self.slot.sender()
    }
}

fn config(workers_per_client: usize, queue_buffer: usize) -> PoolConfig {
    PoolConfig::new(workers_per_client, queue_buffer, Duration::from_millis(50))
}

/// A client that records the order payloads reach it.
struct RecordingClient {
    seen: std::sync::Mutex<Vec<String>>,
}

impl RecordingClient {
    fn new() -> Self {
        Self {
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl SolrClient for RecordingClient {
    fn execute<'a>(
        &'a self,
        job: &'a dyn SolrJob,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = (SolrResponse, bool)> + Send + 'a>>
    {
        Box::pin(async move {
            self.seen
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(&job.bytes()).into_owned());
            (SolrResponse::default(), false)
        })
    }

    fn test_connection(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send + '_>> {
        Box::pin(async { true })
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_lifecycle_guards() {
    let client = Arc::new(MockSolrClient::new());
    let pool = Pool::new(vec![client], config(10, 1));

    let job = Arc::new(EchoJob::new(0));
    assert_eq!(pool.submit(job).await, Err(PoolError::NotRunning));

    let first_death = pool.run().unwrap();
    pool.stop();

    let second_death = pool.run().unwrap();
    assert_eq!(pool.run().unwrap_err(), PoolError::Running);
    pool.stop();

    // Both runs must wind down completely.
    first_death.await.unwrap();
    second_death.await.unwrap();
}

#[tokio::test]
async fn test_no_submission_after_shutdown() {
    let pool = Pool::new(vec![Arc::new(MockSolrClient::new())], config(2, 4));

    let death = pool.run().unwrap();
    pool.stop();
    death.await.unwrap();

    let job = Arc::new(EchoJob::new(1));
    assert_eq!(pool.submit(job).await, Err(PoolError::NotRunning));
}

// =============================================================================
// Throughput
// =============================================================================

async fn run_bulk(workers_per_client: usize, queue_buffer: usize) {
    const JOBS: usize = 9_999;

    let pool = Arc::new(Pool::new(
        vec![Arc::new(MockSolrClient::new())],
        config(workers_per_client, queue_buffer),
    ));
    let death = pool.run().unwrap();

    let mut waiters = Vec::with_capacity(JOBS);
    for i in 0..JOBS {
        let job = Arc::new(EchoJob::new(i));

        let submitter_pool = Arc::clone(&pool);
        let submitted = Arc::clone(&job);
        tokio::spawn(async move {
            submitter_pool.submit(submitted).await.unwrap();
        });

        waiters.push(tokio::spawn(async move {
            let response = job.wait().await.expect("every job gets a response");
            assert_eq!(response.status, i as i64);
        }));
    }

    for waiter in waiters {
        waiter.await.unwrap();
    }

    pool.stop();
    death.await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_single_worker() {
    run_bulk(1, 0).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_ten_workers() {
    run_bulk(10, 0).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bulk_fifty_workers_buffered() {
    run_bulk(50, 1).await;
}

#[tokio::test]
async fn test_single_submitter_dequeues_in_fifo_order() {
    const JOBS: usize = 100;

    let client = Arc::new(RecordingClient::new());
    let pool = Pool::new(
        vec![Arc::clone(&client) as Arc<dyn SolrClient>],
        config(1, 4),
    );
    let death = pool.run().unwrap();

    let jobs: Vec<Arc<EchoJob>> = (0..JOBS).map(|i| Arc::new(EchoJob::new(i))).collect();
    for job in &jobs {
        pool.submit(Arc::clone(job) as Arc<dyn SolrJob>).await.unwrap();
    }
    for job in &jobs {
        job.wait().await.unwrap();
    }

    let seen = client.seen.lock().unwrap();
    let expected: Vec<String> = (0..JOBS).map(|i| i.to_string()).collect();
    assert_eq!(*seen, expected);

    pool.stop();
    death.await.unwrap();
}

// =============================================================================
// Quarantine
// =============================================================================

#[tokio::test]
async fn test_permanent_timeout_quarantines_worker() {
    let client = Arc::new(MockSolrClient::faulty());
    let pool = Pool::new(
        vec![Arc::clone(&client) as Arc<dyn SolrClient>],
        config(1, 0),
    );
    let death = pool.run().unwrap();

    let job = Arc::new(EchoJob::new(0));
    pool.submit(Arc::clone(&job) as Arc<dyn SolrJob>)
        .await
        .unwrap();

    // The failing job is answered promptly with the sentinel error.
    let response = tokio::time::timeout(Duration::from_secs(1), job.wait())
        .await
        .expect("response within a second")
        .unwrap();
    assert_eq!(response.error, Some(SolrError::HostTimeout));

    // The quarantined worker keeps probing the endpoint on its timer.
    tokio::time::timeout(Duration::from_secs(5), async {
        while client.probe_count() < 3 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("at least three probes within five seconds");

    pool.stop();
    death.await.unwrap();
}

#[tokio::test]
async fn test_no_execute_while_quarantined() {
    let client = Arc::new(MockSolrClient::faulty());
    let pool = Pool::new(
        vec![Arc::clone(&client) as Arc<dyn SolrClient>],
        config(1, 2),
    );
    let death = pool.run().unwrap();

    let first = Arc::new(EchoJob::new(1));
    let second = Arc::new(EchoJob::new(2));
    pool.submit(Arc::clone(&first) as Arc<dyn SolrJob>)
        .await
        .unwrap();
    pool.submit(Arc::clone(&second) as Arc<dyn SolrJob>)
        .await
        .unwrap();

    assert_eq!(
        first.wait().await.unwrap().error,
        Some(SolrError::HostTimeout)
    );

    // The second job stays queued: no execute reaches the client while its
    // worker is quarantined and the probes keep failing.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(client.execute_count(), 1);
    assert!(client.probe_count() >= 1);

    // Heal the endpoint; the next successful probe resumes draining.
    client.set_faulty(false);
    let response = second.wait().await.unwrap();
    assert!(response.error.is_none());
    assert_eq!(client.execute_count(), 2);

    pool.stop();
    death.await.unwrap();
}

// =============================================================================
// Fault isolation
// =============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_healthy_client_drains_around_faulty_peer() {
    const JOBS: usize = 50;

    let healthy = Arc::new(MockSolrClient::new());
    let faulty = Arc::new(MockSolrClient::faulty());
    let pool = Pool::new(
        vec![
            Arc::clone(&faulty) as Arc<dyn SolrClient>,
            Arc::clone(&healthy) as Arc<dyn SolrClient>,
        ],
        config(1, 0),
    );
    let death = pool.run().unwrap();

    let jobs: Vec<Arc<EchoJob>> = (0..JOBS).map(|i| Arc::new(EchoJob::new(i))).collect();
    for job in &jobs {
        pool.submit(Arc::clone(job) as Arc<dyn SolrJob>).await.unwrap();
    }

    // Every job completes; the faulty worker can time out at most one before
    // it quarantines itself, the rest flow to the healthy peer.
    let mut timed_out = 0;
    for job in &jobs {
        let response = job.wait().await.expect("no job is durably pinned");
        if response.error == Some(SolrError::HostTimeout) {
            timed_out += 1;
        }
    }
    assert!(timed_out <= 1, "got {} timeouts", timed_out);

    pool.stop();
    death.await.unwrap();
}

// =============================================================================
// End-to-end with query builders
// =============================================================================

#[tokio::test]
async fn test_pagination_exhaustion_observed_through_pool() {
    let canned = SolrResponse {
        docs: Some(DocumentCollection {
            docs: vec![Document::new(), Document::new()],
            num_found: 2,
            start: 0,
        }),
        ..SolrResponse::default()
    };
    let pool = Pool::new(
        vec![Arc::new(MockSolrClient::with_response(canned))],
        config(1, 1),
    );
    let death = pool.run().unwrap();

    // First page comes back populated.
    let first = Arc::new(SolrQuery::new("*:*", 0, 2, "select"));
    pool.submit(Arc::clone(&first) as Arc<dyn SolrJob>)
        .await
        .unwrap();
    assert_eq!(first.wait().await.unwrap().docs.unwrap().docs.len(), 2);

    // A start past the result set yields an empty page: end-of-stream.
    let past_end = Arc::new(SolrQuery::new("*:*", 3, 2, "select"));
    pool.submit(Arc::clone(&past_end) as Arc<dyn SolrJob>)
        .await
        .unwrap();
    assert!(past_end.wait().await.unwrap().docs.unwrap().docs.is_empty());

    pool.stop();
    death.await.unwrap();
}
