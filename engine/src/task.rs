//! The unit of work submitted to the executor and the racer.

use std::fmt;
use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;

use crate::signal::CancellationSignal;

type PlainOp<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send>;
type BlockingOp<T, E> = Box<dyn FnOnce() -> Result<T, E> + Send>;
type AwareOp<T, E> = Box<dyn FnOnce(CancellationSignal) -> BoxFuture<'static, Result<T, E>> + Send>;

/// An independent operation producing `Result<T, E>`.
///
/// Once launched a task always runs on its own Tokio task. The engine never
/// aborts it: when cancellation wins the race, the task is detached and left
/// to finish (or, if cancellation-aware, to notice the signal and return).
pub enum Task<T, E> {
    /// Async operation with no awareness of cancellation.
    Plain(PlainOp<T, E>),
    /// Synchronous operation, run on the blocking thread pool.
    Blocking(BlockingOp<T, E>),
    /// Async operation that receives the call's cancellation signal and is
    /// expected to return an error promptly once it fires.
    CancellationAware(AwareOp<T, E>),
}

impl<T, E> Task<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn plain<F, Fut>(op: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Task::Plain(Box::new(move || op().boxed()))
    }

    pub fn blocking<F>(op: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        Task::Blocking(Box::new(op))
    }

    pub fn cancellation_aware<F, Fut>(op: F) -> Self
    where
        F: FnOnce(CancellationSignal) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Task::CancellationAware(Box::new(move |signal| op(signal).boxed()))
    }

    #[must_use]
    pub fn is_cancellation_aware(&self) -> bool {
        matches!(self, Task::CancellationAware(_))
    }

    /// Start the task on the runtime.
    ///
    /// The operation is invoked inside the spawned task so that a panic while
    /// building its future is contained like any other.
    pub(crate) fn launch(self, signal: &CancellationSignal) -> JoinHandle<Result<T, E>> {
        match self {
            Task::Plain(op) => tokio::spawn(async move { op().await }),
            Task::Blocking(op) => tokio::task::spawn_blocking(op),
            Task::CancellationAware(op) => {
                let signal = signal.clone();
                tokio::spawn(async move { op(signal).await })
            }
        }
    }
}

impl<T, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Task::Plain(_) => "Plain",
            Task::Blocking(_) => "Blocking",
            Task::CancellationAware(_) => "CancellationAware",
        };
        f.debug_tuple("Task").field(&kind).finish()
    }
}
