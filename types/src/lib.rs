//! Core domain types for Paralyze.
//!
//! This crate contains the data shapes shared by the executor, the racer and
//! the configuration layer. No IO, no async, minimal dependencies.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod error;
mod fault;
mod limits;
mod outcome;

pub use error::{CancelReason, TaskError};
pub use fault::{Fault, panic_message};
pub use limits::{ConcurrencyLimit, InvalidStagger, StaggerInterval};
pub use outcome::{Outcome, OutcomeSet};
