//! Bounded fan-out/fan-in executor.
//!
//! Every task gets its own worker. The worker launches the task and races it
//! against the call's cancellation signal; whichever settles first decides the
//! slot's outcome. Outcomes are collected in submission order after a join
//! barrier over all workers, so no slot is ever read before it is written.
//!
//! # Admission control
//!
//! With a non-zero [`ConcurrencyLimit`] below the task count, the launch loop
//! acquires a semaphore permit before spawning each worker and blocks while
//! none is free. The permit lives in the worker and is released on every exit
//! path. A task still waiting for admission when the signal fires is never
//! launched; its slot is recorded as interrupted.
//!
//! # Panics
//!
//! A panicking task yields `TaskError::Panicked` at its index, and the first
//! payload is captured. [`Executor::run`] returns that payload as a [`Fault`]
//! only after every worker has finished.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

use paralyze_types::{ConcurrencyLimit, Fault, Outcome, OutcomeSet};

use crate::fault::{FaultCapture, contain};
use crate::signal::CancellationSignal;
use crate::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Executor {
    limit: ConcurrencyLimit,
}

enum Slot<T, E> {
    Running(JoinHandle<Outcome<T, E>>),
    Settled(Outcome<T, E>),
}

impl Executor {
    #[must_use]
    pub const fn new(limit: ConcurrencyLimit) -> Self {
        Self { limit }
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(ConcurrencyLimit::UNBOUNDED)
    }

    #[must_use]
    pub const fn limit(&self) -> ConcurrencyLimit {
        self.limit
    }

    /// Run `tasks` concurrently and collect their outcomes in submission order.
    ///
    /// Slots interrupted by `signal` hold the signal's typed reason, or
    /// `TaskError::Interrupted` if it fired without one. Returns `Err` with the
    /// first captured panic if any task panicked.
    pub async fn run<T, E>(
        &self,
        tasks: Vec<Task<T, E>>,
        signal: &CancellationSignal,
    ) -> Result<OutcomeSet<T, E>, Fault>
    where
        T: Send + 'static,
        E: Send + 'static,
    {
        let total = tasks.len();
        let admission = self
            .limit
            .permits_for(total)
            .map(|permits| Arc::new(Semaphore::new(permits.get())));
        let faults = Arc::new(FaultCapture::default());

        tracing::debug!(tasks = total, limit = %self.limit, "Launching task set");

        let mut slots = Vec::with_capacity(total);
        for (index, task) in tasks.into_iter().enumerate() {
            let permit = match &admission {
                Some(semaphore) => match admit(semaphore, signal).await {
                    Some(permit) => Some(permit),
                    None => {
                        tracing::trace!(index, "Signal fired before task was admitted");
                        slots.push(Slot::Settled(Outcome::Failed(signal.interruption())));
                        continue;
                    }
                },
                None => None,
            };
            let worker = tokio::spawn(supervise(
                index,
                task,
                signal.clone(),
                Arc::clone(&faults),
                permit,
            ));
            slots.push(Slot::Running(worker));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (index, slot) in slots.into_iter().enumerate() {
            let outcome = match slot {
                Slot::Settled(outcome) => outcome,
                Slot::Running(worker) => match worker.await {
                    Ok(outcome) => outcome,
                    Err(err) => contain(index, err, &faults),
                },
            };
            outcomes.push(outcome);
        }

        if let Some(fault) = faults.take() {
            tracing::debug!(index = fault.index(), "Task set settled with a captured panic");
            return Err(fault);
        }
        Ok(OutcomeSet::new(outcomes))
    }
}

/// Wait for an admission permit, giving up once the signal has fired.
async fn admit(
    semaphore: &Arc<Semaphore>,
    signal: &CancellationSignal,
) -> Option<OwnedSemaphorePermit> {
    tokio::select! {
        biased;
        () = signal.fired() => None,
        permit = Arc::clone(semaphore).acquire_owned() => permit.ok(),
    }
}

/// Race one task against the signal.
///
/// When the signal wins, the task's handle is dropped, which detaches the task
/// without aborting it.
async fn supervise<T, E>(
    index: usize,
    task: Task<T, E>,
    signal: CancellationSignal,
    faults: Arc<FaultCapture>,
    _permit: Option<OwnedSemaphorePermit>,
) -> Outcome<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let mut handle = task.launch(&signal);
    tokio::select! {
        joined = &mut handle => match joined {
            Ok(result) => {
                tracing::trace!(index, ok = result.is_ok(), "Task settled");
                Outcome::from(result)
            }
            Err(err) => contain(index, err, &faults),
        },
        () = signal.fired() => {
            tracing::trace!(index, "Signal fired before task settled");
            Outcome::Failed(signal.interruption())
        }
    }
}
