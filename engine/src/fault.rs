//! First-writer-wins capture of task panics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::task::JoinError;

use paralyze_types::{Fault, Outcome, TaskError};

/// Holds at most one panic payload per call.
///
/// The first offer claims the slot through a compare-and-set; every later
/// payload is dropped.
#[derive(Debug, Default)]
pub(crate) struct FaultCapture {
    claimed: AtomicBool,
    slot: Mutex<Option<Fault>>,
}

impl FaultCapture {
    /// Offer a fault. Returns whether it was kept.
    pub(crate) fn offer(&self, fault: Fault) -> bool {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(
                index = fault.index(),
                "Discarding panic from task, another was captured first: {}",
                fault.message()
            );
            return false;
        }
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(fault);
        true
    }

    pub(crate) fn take(&self) -> Option<Fault> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Turn a failed join into the outcome recorded for `index`.
///
/// Panics become `Panicked` and their payload is offered to `faults`. A join
/// that failed for any other reason means the runtime dropped the task before
/// it settled, which is reported as an interruption.
pub(crate) fn contain<T, E>(index: usize, err: JoinError, faults: &FaultCapture) -> Outcome<T, E> {
    if !err.is_panic() {
        tracing::debug!(index, "Task dropped by runtime before settling");
        return Outcome::Failed(TaskError::Interrupted);
    }
    let fault = Fault::new(index, err.into_panic());
    let message = fault.message().to_string();
    tracing::debug!(index, %message, "Task panicked");
    faults.offer(fault);
    Outcome::Failed(TaskError::Panicked { message })
}
