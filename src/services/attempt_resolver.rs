//! Attempt resolution for interactives.
//!
//! After an interactive is evaluated, the resolver decides whether the
//! student's next interaction reuses the current attempt or mints a new
//! one. The decision shape is shared across all pathway types; only the
//! "already complete" branch differs, so each variant is one trait
//! implementation over a shared core, selected through a lookup table keyed
//! by pathway type.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Attempt, PathwayType};
use crate::domain::ports::{AttemptLedger, ProgressLedger};

/// What to do when the latest progress on the current attempt is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompletedPolicy {
    /// Keep the current attempt; there is no self-loop back into the
    /// interactive.
    Keep,
    /// Mint a fresh attempt with the counter reset to 1; self-looping
    /// interactives restart.
    Restart,
    /// Mint the next attempt, same as the not-complete branch.
    Increment,
}

/// Resolves the attempt for one just-evaluated interactive.
#[async_trait]
pub trait InteractiveAttemptResolver: Send + Sync {
    /// Decide the attempt for the student's next interaction.
    ///
    /// Never fails on "no progress yet": that is a valid terminal state and
    /// resolves to the current attempt unchanged.
    async fn resolve(
        &self,
        deployment_id: Uuid,
        interactive_id: Uuid,
        student_id: Uuid,
        parent_pathway_attempt: &Attempt,
        current_attempt: &Attempt,
    ) -> DomainResult<Attempt>;
}

/// Shared decision core; the pathway-type variants differ only in the
/// completed-branch policy they hand it.
struct ResolverCore {
    attempts: Arc<dyn AttemptLedger>,
    progress: Arc<dyn ProgressLedger>,
}

impl ResolverCore {
    async fn resolve(
        &self,
        deployment_id: Uuid,
        interactive_id: Uuid,
        student_id: Uuid,
        parent_pathway_attempt: &Attempt,
        current_attempt: &Attempt,
        policy: CompletedPolicy,
    ) -> DomainResult<Attempt> {
        let latest = self
            .progress
            .find_latest(deployment_id, interactive_id, student_id)
            .await?;

        // No progress at all: nothing to resolve yet.
        let Some(latest) = latest else {
            return Ok(current_attempt.clone());
        };

        // Progress belongs to a different attempt: either a newer attempt
        // already exists or the record is stale. Either way, keep.
        if latest.attempt_id != current_attempt.id {
            debug!(
                interactive = %interactive_id,
                latest_attempt = %latest.attempt_id,
                current_attempt = %current_attempt.id,
                "latest progress is not for the current attempt, keeping"
            );
            return Ok(current_attempt.clone());
        }

        if !latest.completion.is_complete() {
            return self
                .mint(current_attempt.successor(parent_pathway_attempt.id, current_attempt.value + 1))
                .await;
        }

        match policy {
            CompletedPolicy::Keep => Ok(current_attempt.clone()),
            CompletedPolicy::Restart => {
                self.mint(current_attempt.successor(parent_pathway_attempt.id, 1))
                    .await
            }
            CompletedPolicy::Increment => {
                self.mint(
                    current_attempt.successor(parent_pathway_attempt.id, current_attempt.value + 1),
                )
                .await
            }
        }
    }

    async fn mint(&self, attempt: Attempt) -> DomainResult<Attempt> {
        self.attempts.insert(&attempt).await?;
        debug!(
            element = %attempt.element_id,
            value = attempt.value,
            "minted new attempt"
        );
        Ok(attempt)
    }
}

macro_rules! pathway_resolver {
    ($(#[$doc:meta])* $name:ident, $policy:expr) => {
        $(#[$doc])*
        pub struct $name {
            core: ResolverCore,
        }

        impl $name {
            pub fn new(
                attempts: Arc<dyn AttemptLedger>,
                progress: Arc<dyn ProgressLedger>,
            ) -> Self {
                Self {
                    core: ResolverCore { attempts, progress },
                }
            }
        }

        #[async_trait]
        impl InteractiveAttemptResolver for $name {
            async fn resolve(
                &self,
                deployment_id: Uuid,
                interactive_id: Uuid,
                student_id: Uuid,
                parent_pathway_attempt: &Attempt,
                current_attempt: &Attempt,
            ) -> DomainResult<Attempt> {
                self.core
                    .resolve(
                        deployment_id,
                        interactive_id,
                        student_id,
                        parent_pathway_attempt,
                        current_attempt,
                        $policy,
                    )
                    .await
            }
        }
    };
}

pathway_resolver!(
    /// Linear pathways never revisit a completed interactive.
    LinearAttemptResolver,
    CompletedPolicy::Keep
);
pathway_resolver!(
    /// Free pathways never revisit a completed interactive.
    FreeAttemptResolver,
    CompletedPolicy::Keep
);
pathway_resolver!(
    /// Random pathways never revisit a completed interactive.
    RandomAttemptResolver,
    CompletedPolicy::Keep
);
pathway_resolver!(
    /// Graph pathways allow self-loops; a completed interactive restarts
    /// its attempt counter at 1.
    GraphAttemptResolver,
    CompletedPolicy::Restart
);
pathway_resolver!(
    /// Adaptive mastery pathways keep numbering attempts; which interactive
    /// comes next is the upstream pathway's concern, not attempt numbering.
    BktAttemptResolver,
    CompletedPolicy::Increment
);

/// Lookup table of resolver variants keyed by pathway type.
pub struct AttemptResolverRegistry {
    resolvers: HashMap<PathwayType, Arc<dyn InteractiveAttemptResolver>>,
}

impl AttemptResolverRegistry {
    /// Registry with the standard variant per pathway type, all sharing the
    /// same ledger references.
    pub fn with_defaults(
        attempts: Arc<dyn AttemptLedger>,
        progress: Arc<dyn ProgressLedger>,
    ) -> Self {
        let mut resolvers: HashMap<PathwayType, Arc<dyn InteractiveAttemptResolver>> =
            HashMap::new();
        resolvers.insert(
            PathwayType::Linear,
            Arc::new(LinearAttemptResolver::new(attempts.clone(), progress.clone())),
        );
        resolvers.insert(
            PathwayType::Free,
            Arc::new(FreeAttemptResolver::new(attempts.clone(), progress.clone())),
        );
        resolvers.insert(
            PathwayType::Random,
            Arc::new(RandomAttemptResolver::new(attempts.clone(), progress.clone())),
        );
        resolvers.insert(
            PathwayType::Graph,
            Arc::new(GraphAttemptResolver::new(attempts.clone(), progress.clone())),
        );
        resolvers.insert(
            PathwayType::AlgoBkt,
            Arc::new(BktAttemptResolver::new(attempts, progress)),
        );
        Self { resolvers }
    }

    /// Resolve with the variant registered for `pathway_type`.
    pub async fn resolve(
        &self,
        pathway_type: PathwayType,
        deployment_id: Uuid,
        interactive_id: Uuid,
        student_id: Uuid,
        parent_pathway_attempt: &Attempt,
        current_attempt: &Attempt,
    ) -> DomainResult<Attempt> {
        let resolver = self
            .resolvers
            .get(&pathway_type)
            .ok_or_else(|| DomainError::UnknownPathwayType(pathway_type.to_string()))?;
        resolver
            .resolve(
                deployment_id,
                interactive_id,
                student_id,
                parent_pathway_attempt,
                current_attempt,
            )
            .await
    }
}
