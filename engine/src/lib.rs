//! Concurrent fan-out/fan-in execution for Paralyze.
//!
//! Submit a list of independent [`Task`]s and get back one [`Outcome`] per
//! task, in submission order, once every task has settled or the call has been
//! interrupted. Variants add an aggregate timeout, an external cancel trigger,
//! a [`CancellationContext`], or a concurrency limit. [`speculate`] races
//! alternative operations with staggered hedging.
//!
//! Tasks are never forcibly stopped. An interrupted slot is recorded as soon as
//! cancellation wins, and the task itself either notices the signal (if
//! cancellation-aware) or runs to completion detached.

#![allow(clippy::missing_errors_doc)]

mod adapters;
mod executor;
mod fault;
mod named;
mod paralyzer;
mod signal;
mod speculate;
mod task;

pub use adapters::{
    paralyze, paralyze_limit, paralyze_with_cancel, paralyze_with_context, paralyze_with_timeout,
};
pub use executor::Executor;
pub use named::paralyze_named;
pub use paralyzer::Paralyzer;
pub use signal::{CancellationContext, CancellationSignal};
pub use speculate::{Speculation, speculate};
pub use task::Task;

pub use paralyze_config::{ConfigError, ParalyzeConfig};
pub use paralyze_types::{
    CancelReason, ConcurrencyLimit, Fault, InvalidStagger, Outcome, OutcomeSet, StaggerInterval,
    TaskError, panic_message,
};
