//! SQLite persistence adapters
//!
//! One repository per ledger port, sharing a WAL-mode connection pool.
//! All stores are append-only; "latest" reads order by `created_at` then
//! `id` so UUIDv7 ids break timestamp ties.

pub mod association_repo;
pub mod attempt_repo;
pub mod competency_repo;
pub mod connection;
pub mod progress_repo;
pub mod scope_repo;
pub mod score_repo;
pub mod utils;

pub use association_repo::AssociationGraphImpl;
pub use attempt_repo::AttemptLedgerImpl;
pub use competency_repo::CompetencyLedgerImpl;
pub use connection::DatabaseConnection;
pub use progress_repo::ProgressLedgerImpl;
pub use scope_repo::ScopeLedgerImpl;
pub use score_repo::ScoreLedgerImpl;
