//! Pool health tracking.
//!
//! Thread-safe counters updated by the workers on the hot path (relaxed
//! atomics, no locks) and read by callers as a point-in-time snapshot.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Coarse health of the pool's dispatch set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoolStatus {
    /// Every worker is serving the queue.
    Healthy,
    /// Some workers are quarantined; the rest keep draining.
    Degraded,
    /// No worker is serving; submitted jobs will wait in the queue.
    Offline,
}

impl PoolStatus {
    /// Returns a string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolStatus::Healthy => "healthy",
            PoolStatus::Degraded => "degraded",
            PoolStatus::Offline => "offline",
        }
    }
}

/// A point-in-time snapshot of pool health.
#[derive(Debug, Clone, Serialize)]
pub struct PoolHealthSnapshot {
    /// Coarse status derived from the worker gauges.
    pub status: PoolStatus,
    /// Workers of the current run.
    pub workers_total: usize,
    /// Workers currently serving the queue.
    pub workers_online: usize,
    /// Jobs accepted by `submit` since construction.
    pub jobs_submitted: u64,
    /// Responses delivered without an embedded error.
    pub jobs_completed: u64,
    /// Responses delivered carrying an error.
    pub jobs_failed: u64,
    /// Times any worker entered quarantine.
    pub quarantines: u64,
    /// Reconnect probes issued by quarantined workers.
    pub probes: u64,
}

/// Cumulative pool health with atomic counters.
///
/// Counters survive across run/stop cycles; the worker gauges are reset at
/// each `run`.
#[derive(Debug, Default)]
pub struct PoolHealth {
    workers_total: AtomicUsize,
    workers_online: AtomicUsize,
    jobs_submitted: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    quarantines: AtomicU64,
    probes: AtomicU64,
}

impl PoolHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the worker gauges for a fresh run.
    pub(crate) fn reset_workers(&self, total: usize) {
        self.workers_total.store(total, Ordering::Relaxed);
        self.workers_online.store(0, Ordering::Relaxed);
    }

    pub(crate) fn worker_online(&self) {
        self.workers_online.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn worker_offline(&self) {
        // Saturating: a stale worker from a previous run must not underflow.
        let _ = self
            .workers_online
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub(crate) fn record_submission(&self) {
        self.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_served(&self, errored: bool) {
        if errored {
            self.jobs_failed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.jobs_completed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_quarantine(&self) {
        self.quarantines.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_probe(&self) {
        self.probes.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current health.
    pub fn snapshot(&self) -> PoolHealthSnapshot {
        let workers_total = self.workers_total.load(Ordering::Relaxed);
        let workers_online = self.workers_online.load(Ordering::Relaxed);

        let status = if workers_total == 0 || workers_online == 0 {
            PoolStatus::Offline
        } else if workers_online < workers_total {
            PoolStatus::Degraded
        } else {
            PoolStatus::Healthy
        };

        PoolHealthSnapshot {
            status,
            workers_total,
            workers_online,
            jobs_submitted: self.jobs_submitted.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            quarantines: self.quarantines.load(Ordering::Relaxed),
            probes: self.probes.load(Ordering::Relaxed),
        }
    }
}
