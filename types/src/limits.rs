use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of tasks allowed in flight at once.
///
/// Zero means unbounded: every task is admitted immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcurrencyLimit(usize);

impl ConcurrencyLimit {
    pub const UNBOUNDED: Self = Self(0);

    #[must_use]
    pub const fn new(limit: usize) -> Self {
        Self(limit)
    }

    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }

    #[must_use]
    pub const fn is_unbounded(self) -> bool {
        self.0 == 0
    }

    /// Number of admission permits needed for a call with `task_count` tasks,
    /// or `None` when no admission control applies.
    ///
    /// A limit at or above the task count bounds nothing, so it is treated as
    /// unbounded.
    #[must_use]
    pub fn permits_for(self, task_count: usize) -> Option<NonZeroUsize> {
        if self.0 >= task_count {
            return None;
        }
        NonZeroUsize::new(self.0)
    }
}

impl From<usize> for ConcurrencyLimit {
    fn from(limit: usize) -> Self {
        Self(limit)
    }
}

impl fmt::Display for ConcurrencyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str("unbounded")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", InvalidStagger::REASON)]
pub struct InvalidStagger;

impl InvalidStagger {
    pub const REASON: &'static str = "stagger interval must be greater than zero";
}

/// Delay the racer waits on a pending candidate before hedging to the next one.
///
/// Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaggerInterval(Duration);

impl StaggerInterval {
    /// 10ms.
    pub const DEFAULT: Self = Self(Duration::from_millis(10));

    pub fn new(interval: Duration) -> Result<Self, InvalidStagger> {
        if interval.is_zero() {
            Err(InvalidStagger)
        } else {
            Ok(Self(interval))
        }
    }

    pub fn from_millis(millis: u64) -> Result<Self, InvalidStagger> {
        Self::new(Duration::from_millis(millis))
    }

    #[must_use]
    pub const fn get(self) -> Duration {
        self.0
    }
}

impl TryFrom<Duration> for StaggerInterval {
    type Error = InvalidStagger;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StaggerInterval> for Duration {
    fn from(value: StaggerInterval) -> Self {
        value.0
    }
}
