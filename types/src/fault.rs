use std::any::Any;

use thiserror::Error;

/// A panic captured from inside a task.
///
/// Carries the original payload so it can be re-raised unchanged with
/// [`Fault::resume`] once every sibling task has settled.
#[derive(Debug, Error)]
#[error("task {index} panicked: {message}")]
pub struct Fault {
    index: usize,
    message: String,
    payload: Box<dyn Any + Send>,
}

impl Fault {
    #[must_use]
    pub fn new(index: usize, payload: Box<dyn Any + Send>) -> Self {
        let message = panic_message(&*payload);
        Self {
            index,
            message,
            payload,
        }
    }

    /// Index of the task that panicked.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn into_payload(self) -> Box<dyn Any + Send> {
        self.payload
    }

    /// Re-raise the captured panic on the current thread.
    pub fn resume(self) -> ! {
        std::panic::resume_unwind(self.payload)
    }
}

/// Render a panic payload for display.
///
/// `panic!` payloads are `&'static str` for literal messages and `String` for
/// formatted ones; anything else is opaque.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
