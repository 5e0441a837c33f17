use std::fmt;

use thiserror::Error;

use crate::limits::InvalidStagger;

/// Why a cancellation signal fired.
///
/// A bare signal carries no reason; the call surface that owns it decides
/// which of these an interrupted slot is reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// A caller-specified duration elapsed.
    TimedOut,
    /// A caller-owned trigger fired, or the context was canceled explicitly.
    Canceled,
    /// A context deadline passed.
    DeadlineExceeded,
}

impl CancelReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CancelReason::TimedOut => "timed out",
            CancelReason::Canceled => "canceled",
            CancelReason::DeadlineExceeded => "deadline exceeded",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error recorded for a single task slot, or returned by the racer.
///
/// `Task` wraps whatever the operation itself reported and is passed through
/// unmodified. Every other variant is produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError<E> {
    #[error("{0}")]
    Task(E),
    /// Generic cancellation kind. The adapters remap this before returning.
    #[error("interrupted by cancellation signal")]
    Interrupted,
    #[error("timed out")]
    TimedOut,
    #[error("canceled")]
    Canceled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("task panicked: {message}")]
    Panicked { message: String },
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: &'static str },
    #[error("should never happen: {detail}")]
    InternalInvariant { detail: &'static str },
}

impl<E> TaskError<E> {
    /// True for every variant produced by a cancellation signal firing.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(
            self,
            TaskError::Interrupted
                | TaskError::TimedOut
                | TaskError::Canceled
                | TaskError::DeadlineExceeded
        )
    }

    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked { .. })
    }

    /// The operation's own error, if that is what this is.
    #[must_use]
    pub const fn task_error(&self) -> Option<&E> {
        match self {
            TaskError::Task(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_task_error(self) -> Result<E, Self> {
        match self {
            TaskError::Task(err) => Ok(err),
            other => Err(other),
        }
    }
}

impl<E> From<CancelReason> for TaskError<E> {
    fn from(reason: CancelReason) -> Self {
        match reason {
            CancelReason::TimedOut => TaskError::TimedOut,
            CancelReason::Canceled => TaskError::Canceled,
            CancelReason::DeadlineExceeded => TaskError::DeadlineExceeded,
        }
    }
}

impl<E> From<InvalidStagger> for TaskError<E> {
    fn from(_: InvalidStagger) -> Self {
        TaskError::InvalidParameter {
            reason: InvalidStagger::REASON,
        }
    }
}
