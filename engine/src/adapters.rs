//! Public fan-out entry points.
//!
//! Each entry point derives the call's cancellation signal in its own way and
//! hands it to the [`Executor`]. A captured task panic is re-raised on the
//! calling task once every sibling has settled.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

use paralyze_types::{CancelReason, ConcurrencyLimit, Fault, OutcomeSet};

use crate::executor::Executor;
use crate::signal::{CancellationContext, CancellationSignal};
use crate::task::Task;

/// Run every task concurrently and wait for all of them.
///
/// # Panics
///
/// Re-raises the first panic from any task after all tasks have settled.
pub async fn paralyze<T, E>(tasks: Vec<Task<T, E>>) -> OutcomeSet<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    settle(Executor::unbounded().run(tasks, &CancellationSignal::new()).await)
}

/// Like [`paralyze`], but slots still pending after `timeout` are recorded as
/// `TaskError::TimedOut`. A zero timeout disables the deadline.
///
/// Timed-out tasks are not stopped; plain tasks keep running detached.
///
/// # Panics
///
/// Re-raises the first panic from any task after all tasks have settled.
pub async fn paralyze_with_timeout<T, E>(
    timeout: Duration,
    tasks: Vec<Task<T, E>>,
) -> OutcomeSet<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    run_with_timeout(ConcurrencyLimit::UNBOUNDED, timeout, tasks).await
}

/// Like [`paralyze`], but slots still pending when `trigger` completes are
/// recorded as `TaskError::Canceled`.
///
/// Completion of `trigger` fires cancellation regardless of its output, so a
/// `oneshot::Receiver` cancels both when a value is sent and when its sender
/// is dropped.
///
/// # Panics
///
/// Re-raises the first panic from any task after all tasks have settled.
pub async fn paralyze_with_cancel<T, E, F>(
    trigger: F,
    tasks: Vec<Task<T, E>>,
) -> OutcomeSet<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Future + Send + 'static,
{
    run_until(Executor::unbounded(), trigger, CancelReason::Canceled, tasks).await
}

/// Run tasks under a [`CancellationContext`].
///
/// Slots still pending when the context ends hold the context's own reason,
/// `TaskError::DeadlineExceeded` or `TaskError::Canceled`. Cancellation-aware
/// tasks receive the context's signal.
///
/// # Panics
///
/// Re-raises the first panic from any task after all tasks have settled.
pub async fn paralyze_with_context<T, E>(
    ctx: &CancellationContext,
    tasks: Vec<Task<T, E>>,
) -> OutcomeSet<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    settle(Executor::unbounded().run(tasks, ctx.signal()).await)
}

/// Like [`paralyze`], with at most `limit` tasks in flight at once.
/// A limit of zero means unbounded.
///
/// # Panics
///
/// Re-raises the first panic from any task after all tasks have settled.
pub async fn paralyze_limit<T, E>(
    limit: usize,
    tasks: Vec<Task<T, E>>,
) -> OutcomeSet<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    settle(
        Executor::new(ConcurrencyLimit::new(limit))
            .run(tasks, &CancellationSignal::new())
            .await,
    )
}

pub(crate) async fn run_with_timeout<T, E>(
    limit: ConcurrencyLimit,
    timeout: Duration,
    tasks: Vec<Task<T, E>>,
) -> OutcomeSet<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let executor = Executor::new(limit);
    if timeout.is_zero() {
        return settle(executor.run(tasks, &CancellationSignal::new()).await);
    }
    run_until(
        executor,
        tokio::time::sleep(timeout),
        CancelReason::TimedOut,
        tasks,
    )
    .await
}

/// Aborts the task forwarding a trigger into a call's signal.
///
/// Held for the duration of the call so the forwarder never outlives it, even
/// if the call's future is dropped early.
struct TriggerGuard(JoinHandle<()>);

impl Drop for TriggerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Fire a fresh signal when `trigger` completes, and remap interrupted slots
/// to `reason`.
async fn run_until<T, E, F>(
    executor: Executor,
    trigger: F,
    reason: CancelReason,
    tasks: Vec<Task<T, E>>,
) -> OutcomeSet<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Future + Send + 'static,
{
    let signal = CancellationSignal::new();
    let forward = {
        let signal = signal.clone();
        TriggerGuard(tokio::spawn(async move {
            let _ = trigger.await;
            signal.fire();
        }))
    };
    let result = executor.run(tasks, &signal).await;
    drop(forward);
    settle(result).remap_interrupted(reason)
}

/// Hand back the outcomes, or re-raise a captured panic.
fn settle<T, E>(result: Result<OutcomeSet<T, E>, Fault>) -> OutcomeSet<T, E> {
    result.unwrap_or_else(|fault| {
        tracing::debug!(index = fault.index(), "Re-raising task panic");
        fault.resume()
    })
}
