//! Speculative racing among alternative operations.
//!
//! The racer launches the primary candidate and, whenever the current
//! candidate is still pending after the stagger interval, hedges by launching
//! the next one. The first candidate to settle after its launch decides the
//! result, subject to the fallback-on-error policy.
//!
//! Candidates left behind by a hedge keep running detached and their outcome
//! is never retrieved. Operations with side effects should be idempotent or
//! otherwise tolerate running to completion unobserved.

use std::time::Duration;

use tokio::task::JoinError;

use paralyze_types::{StaggerInterval, TaskError};

use crate::signal::CancellationSignal;
use crate::task::Task;

/// Race `primary` and then each of `fallbacks`, hedging every `stagger`.
///
/// Returns `TaskError::InvalidParameter` without launching anything if
/// `stagger` is zero.
///
/// # Panics
///
/// Re-raises the panic of an observed candidate.
pub async fn speculate<T, E>(
    stagger: Duration,
    fallback_on_error: bool,
    primary: Task<T, E>,
    fallbacks: Vec<Task<T, E>>,
) -> Result<T, TaskError<E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let stagger = StaggerInterval::new(stagger)?;
    Speculation::new(stagger, fallback_on_error)
        .race(primary, fallbacks)
        .await
}

/// Racing policy: stagger interval plus fallback-on-error behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speculation {
    stagger: StaggerInterval,
    fallback_on_error: bool,
}

enum Step<T, E> {
    Settled(Result<T, TaskError<E>>),
    Hedge,
}

impl Speculation {
    #[must_use]
    pub const fn new(stagger: StaggerInterval, fallback_on_error: bool) -> Self {
        Self {
            stagger,
            fallback_on_error,
        }
    }

    #[must_use]
    pub const fn stagger(&self) -> StaggerInterval {
        self.stagger
    }

    #[must_use]
    pub const fn fallback_on_error(&self) -> bool {
        self.fallback_on_error
    }

    /// Run the race. The last candidate has nothing left to hedge to, so it is
    /// awaited until it settles.
    ///
    /// # Panics
    ///
    /// Re-raises the panic of an observed candidate.
    pub async fn race<T, E>(
        &self,
        primary: Task<T, E>,
        fallbacks: Vec<Task<T, E>>,
    ) -> Result<T, TaskError<E>>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let total = fallbacks.len() + 1;
        // Candidates get a signal that the racer never fires.
        let signal = CancellationSignal::new();

        for (index, candidate) in std::iter::once(primary).chain(fallbacks).enumerate() {
            let remaining = index + 1 < total;
            let mut handle = candidate.launch(&signal);

            let step = if remaining {
                tokio::select! {
                    joined = &mut handle => Step::Settled(flatten(joined)),
                    () = tokio::time::sleep(self.stagger.get()) => Step::Hedge,
                }
            } else {
                Step::Settled(flatten(handle.await))
            };

            match step {
                Step::Settled(Ok(value)) => {
                    tracing::debug!(index, "Speculative candidate won");
                    return Ok(value);
                }
                Step::Settled(Err(_)) if self.fallback_on_error && remaining => {
                    tracing::debug!(index, "Speculative candidate failed, falling back");
                }
                Step::Settled(Err(err)) => return Err(err),
                Step::Hedge => {
                    tracing::debug!(
                        index,
                        stagger_ms = self.stagger.get().as_millis(),
                        "Speculative candidate still pending, hedging"
                    );
                }
            }
        }

        // Unreachable: the last candidate is always awaited to settlement.
        Err(TaskError::InternalInvariant {
            detail: "speculation exhausted every candidate without a result",
        })
    }
}

fn flatten<T, E>(joined: Result<Result<T, E>, JoinError>) -> Result<T, TaskError<E>> {
    match joined {
        Ok(result) => result.map_err(TaskError::Task),
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(_) => Err(TaskError::Interrupted),
    }
}
