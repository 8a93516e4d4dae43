//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters
//! must implement:
//! - `AttemptLedger` / `ProgressLedger` / `CompetencyLedger` / `ScoreLedger`
//!   / `ScopeLedger`: append-only record stores with "latest wins" reads
//! - `AssociationGraph`: traversal over the competency-document graph
//! - `ProgressTransport`: order-preserving hand-off for propagation hops
//!
//! These traits are the only thing the core services know about the outside
//! world; storage and transport specifics stay behind them.

pub mod association_graph;
pub mod attempt_ledger;
pub mod competency_ledger;
pub mod errors;
pub mod progress_ledger;
pub mod progress_transport;
pub mod scope_ledger;
pub mod score_ledger;

pub use association_graph::AssociationGraph;
pub use attempt_ledger::AttemptLedger;
pub use competency_ledger::CompetencyLedger;
pub use errors::LedgerError;
pub use progress_ledger::ProgressLedger;
pub use progress_transport::ProgressTransport;
pub use scope_ledger::ScopeLedger;
pub use score_ledger::ScoreLedger;
