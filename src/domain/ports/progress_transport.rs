use crate::domain::models::PropagationHop;
use crate::domain::DomainResult;
use async_trait::async_trait;

/// Outbound hand-off port for ancestry propagation.
///
/// `emit` is fire-and-forget from the engine's perspective, but the
/// transport must preserve per-chain ordering: hops of one chain are
/// delivered to the propagator in the order they were emitted.
#[async_trait]
pub trait ProgressTransport: Send + Sync {
    /// Hand the next propagation hop to the transport.
    async fn emit(&self, hop: PropagationHop) -> DomainResult<()>;
}
