//! In-process propagation transport.
//!
//! A bounded mpsc channel with a monotonic sequence number stamped on every
//! hop at emit time. The channel carries chain-start hops only; the single
//! consumer drives each chain to its root inline, so it never awaits the
//! queue it is draining and a full channel cannot wedge in-flight chains.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::PropagationHop;
use crate::domain::ports::ProgressTransport;
use crate::services::progress_propagator::{ProgressPropagator, PropagationOutcome};

/// Sending half of the propagation queue; the engine's `ProgressTransport`.
pub struct PropagationQueue {
    tx: mpsc::Sender<PropagationHop>,
    sequence: AtomicU64,
}

impl PropagationQueue {
    /// Create the queue and its receiving half.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PropagationHop>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                tx,
                sequence: AtomicU64::new(0),
            },
            rx,
        )
    }
}

#[async_trait]
impl ProgressTransport for PropagationQueue {
    async fn emit(&self, mut hop: PropagationHop) -> DomainResult<()> {
        hop.sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(chain = %hop.chain_id, sequence = hop.sequence, position = hop.position, "hop queued");
        self.tx
            .send(hop)
            .await
            .map_err(|e| DomainError::Transport(format!("propagation queue closed: {e}")))
    }
}

/// Single consumer that drives queued hops through the propagator.
pub struct PropagationWorker {
    rx: mpsc::Receiver<PropagationHop>,
    propagator: Arc<ProgressPropagator>,
}

impl PropagationWorker {
    pub fn new(rx: mpsc::Receiver<PropagationHop>, propagator: Arc<ProgressPropagator>) -> Self {
        Self { rx, propagator }
    }

    /// Consume chain-start hops until the queue closes.
    ///
    /// A failed hop aborts its chain (nothing downstream of it runs) but
    /// the worker keeps serving other chains.
    pub async fn run(mut self) {
        while let Some(hop) = self.rx.recv().await {
            self.drive(hop).await;
        }
        info!("propagation queue closed, worker stopping");
    }

    /// Drive one chain from its first hop to the root.
    ///
    /// Successor hops are handled inline, never re-queued: the sole
    /// consumer awaiting `tx.send` on its own bounded channel would wedge
    /// every in-flight chain once the channel fills.
    async fn drive(&self, first: PropagationHop) {
        let mut hop = first;
        loop {
            match self.propagator.handle_hop(&hop).await {
                Ok(PropagationOutcome::Forwarded(next)) => hop = next,
                Ok(PropagationOutcome::Completed(_)) => return,
                Err(err) => {
                    error!(
                        chain = %hop.chain_id,
                        sequence = hop.sequence,
                        error = %err,
                        "propagation hop failed, chain aborted"
                    );
                    return;
                }
            }
        }
    }
}
