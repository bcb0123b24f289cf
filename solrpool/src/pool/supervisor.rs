//! Shutdown orchestration.
//!
//! One supervisor task runs per pool run. On the pool-level stop signal it
//! fans termination out to every worker, then keeps collecting death
//! acknowledgements; only when the last worker has acknowledged does it
//! signal pool death to the caller. Message passing gives a natural join
//! barrier here; no shared stop flag is polled.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) struct Supervisor {
    /// Pool-level stop signal.
    shutdown: CancellationToken,
    /// Private termination tokens, one per worker.
    worker_tokens: Vec<CancellationToken>,
    /// Death acknowledgements from workers.
    ack_rx: mpsc::Receiver<()>,
    /// Fired exactly once, after every worker has acknowledged.
    pool_death_tx: oneshot::Sender<()>,
}

impl Supervisor {
    pub(crate) fn new(
        shutdown: CancellationToken,
        worker_tokens: Vec<CancellationToken>,
        ack_rx: mpsc::Receiver<()>,
        pool_death_tx: oneshot::Sender<()>,
    ) -> Self {
        Self {
            shutdown,
            worker_tokens,
            ack_rx,
            pool_death_tx,
        }
    }

    pub(crate) async fn run(self) {
        let Self {
            shutdown,
            worker_tokens,
            mut ack_rx,
            pool_death_tx,
        } = self;

        let mut workers_left = worker_tokens.len();
        let mut fanned_out = false;

        loop {
            if workers_left == 0 {
                info!("all workers acknowledged, pool is down");
                let _ = pool_death_tx.send(());
                return;
            }

            tokio::select! {
                // The guard keeps an already-cancelled token from winning
                // every iteration; cancelling twice is harmless anyway.
                _ = shutdown.cancelled(), if !fanned_out => {
                    debug!(workers = worker_tokens.len(), "stop received, terminating workers");
                    for token in &worker_tokens {
                        token.cancel();
                    }
                    fanned_out = true;
                }

                ack = ack_rx.recv() => match ack {
                    Some(()) => workers_left -= 1,
                    None => {
                        // Workers never drop their ack sender before
                        // acknowledging; reaching this means one died
                        // abnormally. Report pool death rather than hang.
                        warn!(missing = workers_left, "ack channel closed early");
                        let _ = pool_death_tx.send(());
                        return;
                    }
                },
            }
        }
    }
}
