//! One-shot cancellation signals.
//!
//! [`CancellationSignal`] is the broadcast shared by every worker of a call.
//! [`CancellationContext`] pairs a signal with a deadline and a typed terminal
//! reason, for callers that want "done" and "why" in one value.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use paralyze_types::{CancelReason, TaskError};

/// One-shot, multi-listener cancellation broadcast.
///
/// Transitions from unfired to fired exactly once and never back. Cloning
/// yields another handle to the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    token: CancellationToken,
    // Set by whichever fire call wins; `None` means fired without a reason.
    reason: Arc<OnceLock<Option<CancelReason>>>,
}

impl CancellationSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire without a reason. Slots interrupted by this signal are recorded as
    /// [`TaskError::Interrupted`].
    pub fn fire(&self) {
        self.fire_inner(None);
    }

    /// Fire with a typed reason. Ignored if the signal already fired.
    pub fn fire_with(&self, reason: CancelReason) {
        self.fire_inner(Some(reason));
    }

    fn fire_inner(&self, reason: Option<CancelReason>) {
        if self.reason.set(reason).is_ok() {
            tracing::debug!(reason = ?reason, "Cancellation signal fired");
        }
        self.token.cancel();
    }

    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The reason given when the signal fired, if it fired with one.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        self.reason.get().copied().flatten()
    }

    /// Resolves once the signal fires. Resolves immediately if it already has.
    pub async fn fired(&self) {
        self.token.cancelled().await;
    }

    /// Error recorded for a slot this signal interrupted.
    pub(crate) fn interruption<E>(&self) -> TaskError<E> {
        self.reason().map_or(TaskError::Interrupted, TaskError::from)
    }
}

/// A cancellation signal with an optional deadline and a typed terminal reason.
///
/// Fires with [`CancelReason::DeadlineExceeded`] when the deadline passes, or
/// [`CancelReason::Canceled`] on [`cancel`](Self::cancel), whichever comes
/// first.
#[derive(Debug, Clone, Default)]
pub struct CancellationContext {
    signal: CancellationSignal,
    deadline: Option<Instant>,
}

impl CancellationContext {
    /// A context with no deadline. It only ends through [`cancel`](Self::cancel).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    ///
    /// A timeout too large to represent as an instant yields a context with no
    /// deadline. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => {
                tracing::debug!(?timeout, "Timeout unrepresentable, context has no deadline");
                Self::new()
            }
        }
    }

    /// A context that expires at `deadline`.
    ///
    /// Must be called from within a Tokio runtime unless the deadline has
    /// already passed. The deadline timer exits early if the context is
    /// canceled first.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        let signal = CancellationSignal::new();
        if deadline <= Instant::now() {
            signal.fire_with(CancelReason::DeadlineExceeded);
        } else {
            let timer_signal = signal.clone();
            tokio::spawn(async move {
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {
                        timer_signal.fire_with(CancelReason::DeadlineExceeded);
                    }
                    () = timer_signal.fired() => {}
                }
            });
        }
        Self {
            signal,
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.signal.fire_with(CancelReason::Canceled);
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.signal.is_fired()
    }

    /// Why the context ended, or `None` while it is still live.
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        self.signal.reason()
    }

    pub async fn done(&self) {
        self.signal.fired().await;
    }

    /// The underlying signal, as handed to cancellation-aware tasks.
    #[must_use]
    pub fn signal(&self) -> &CancellationSignal {
        &self.signal
    }
}
