//! Async support for the comparison engine (requires 'async' feature).

use crate::{
    engine::{ComparisonEngine, RoleComparison},
    error::{Error, Result},
    role::Role,
    suggestions::Suggestion,
};
use std::sync::Arc;

/// Async wrapper that keeps comparisons off the async executor threads.
#[derive(Debug, Clone)]
pub struct AsyncComparisonEngine {
    inner: Arc<ComparisonEngine>,
}

impl AsyncComparisonEngine {
    /// Wrap an engine.
    pub fn new(engine: ComparisonEngine) -> Self {
        Self {
            inner: Arc::new(engine),
        }
    }

    /// Access the wrapped engine.
    pub fn engine(&self) -> &ComparisonEngine {
        &self.inner
    }

    /// Run a comparison on the blocking thread pool.
    pub async fn build_comparison(&self, roles: Vec<Role>) -> Result<RoleComparison> {
        let engine = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || engine.build_comparison(&roles))
            .await
            .map_err(|e| Error::analysis("comparison task failed", e))?
    }

    /// Suggestion stage as an explicitly awaited step.
    ///
    /// Generation is currently synchronous and completes without suspending.
    pub async fn suggest(
        &self,
        roles: &[Role],
        comparison: &RoleComparison,
    ) -> Result<Vec<Suggestion>> {
        self.inner.suggest(roles, comparison)
    }
}
