//! Pool configuration.

use std::time::Duration;

/// Default workers spawned per client.
pub const DEFAULT_WORKERS_PER_CLIENT: usize = 4;

/// Default shared queue capacity.
pub const DEFAULT_QUEUE_BUFFER: usize = 64;

/// Default delay between reconnect probes of a quarantined worker.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a [`Pool`](super::Pool).
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Workers spawned for each client; the pool total is this times the
    /// number of clients.
    pub workers_per_client: usize,

    /// Jobs the shared queue holds before submitters block.
    pub queue_buffer: usize,

    /// How long a quarantined worker waits between connection probes.
    pub reconnect_interval: Duration,
}

impl PoolConfig {
    pub fn new(workers_per_client: usize, queue_buffer: usize, reconnect_interval: Duration) -> Self {
        Self {
            workers_per_client,
            queue_buffer,
            reconnect_interval,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers_per_client: DEFAULT_WORKERS_PER_CLIENT,
            queue_buffer: DEFAULT_QUEUE_BUFFER,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}
