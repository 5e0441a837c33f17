//! Configured front-end bundling a limit, a call timeout, and a racing policy.

use std::time::Duration;

use paralyze_config::ParalyzeConfig;
use paralyze_types::{ConcurrencyLimit, InvalidStagger, OutcomeSet, StaggerInterval, TaskError};

use crate::adapters::run_with_timeout;
use crate::speculate::Speculation;
use crate::task::Task;

/// Reusable call settings.
///
/// Defaults match [`ParalyzeConfig::default`]: unbounded, no timeout, a 10ms
/// stagger, and fallback on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paralyzer {
    limit: ConcurrencyLimit,
    timeout: Duration,
    speculation: Speculation,
}

impl Default for Paralyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Paralyzer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limit: ConcurrencyLimit::UNBOUNDED,
            timeout: Duration::ZERO,
            speculation: Speculation::new(StaggerInterval::DEFAULT, true),
        }
    }

    /// Build from loaded configuration. Fails if the configured stagger is zero.
    pub fn from_config(config: &ParalyzeConfig) -> Result<Self, InvalidStagger> {
        let speculation = Speculation::new(config.stagger()?, config.fallback_on_error());
        tracing::debug!(
            limit = %config.concurrency_limit(),
            timeout_ms = config.executor.timeout_ms,
            stagger_ms = config.speculation.stagger_ms,
            "Paralyzer configured"
        );
        Ok(Self {
            limit: config.concurrency_limit(),
            timeout: config.timeout(),
            speculation,
        })
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = ConcurrencyLimit::new(limit);
        self
    }

    /// Zero disables the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_speculation(mut self, speculation: Speculation) -> Self {
        self.speculation = speculation;
        self
    }

    #[must_use]
    pub fn limit(&self) -> ConcurrencyLimit {
        self.limit
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn speculation(&self) -> Speculation {
        self.speculation
    }

    /// Fan out under the configured limit and timeout.
    ///
    /// # Panics
    ///
    /// Re-raises the first panic from any task after all tasks have settled.
    pub async fn run<T, E>(&self, tasks: Vec<Task<T, E>>) -> OutcomeSet<T, E>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        run_with_timeout(self.limit, self.timeout, tasks).await
    }

    /// Race candidates under the configured policy.
    ///
    /// # Panics
    ///
    /// Re-raises the panic of an observed candidate.
    pub async fn speculate<T, E>(
        &self,
        primary: Task<T, E>,
        fallbacks: Vec<Task<T, E>>,
    ) -> Result<T, TaskError<E>>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        self.speculation.race(primary, fallbacks).await
    }
}
