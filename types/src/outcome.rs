use std::ops::Index;

use crate::error::{CancelReason, TaskError};

/// Result of one task: a value or an error, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    Value(T),
    Failed(TaskError<E>),
}

impl<T, E> Outcome<T, E> {
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&TaskError<E>> {
        match self {
            Outcome::Value(_) => None,
            Outcome::Failed(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, TaskError<E>> {
        match self {
            Outcome::Value(value) => Ok(value),
            Outcome::Failed(err) => Err(err),
        }
    }

    /// Split into the `(value, error)` pair, exactly one side populated.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, Option<TaskError<E>>) {
        match self {
            Outcome::Value(value) => (Some(value), None),
            Outcome::Failed(err) => (None, Some(err)),
        }
    }

    /// Replace the generic cancellation kind with the reason the caller's
    /// signal fired for. Every other outcome is left as is.
    #[must_use]
    pub fn remap_interrupted(self, reason: CancelReason) -> Self {
        match self {
            Outcome::Failed(TaskError::Interrupted) => Outcome::Failed(reason.into()),
            other => other,
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Value(value),
            Err(err) => Outcome::Failed(TaskError::Task(err)),
        }
    }
}

/// Outcomes of one call, index-aligned with the submitted tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeSet<T, E>(Vec<Outcome<T, E>>);

impl<T, E> OutcomeSet<T, E> {
    #[must_use]
    pub fn new(outcomes: Vec<Outcome<T, E>>) -> Self {
        Self(outcomes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Outcome<T, E>> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outcome<T, E>> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Outcome<T, E>] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Outcome<T, E>> {
        self.0
    }

    /// Split into parallel `values` and `errors` vectors of equal length.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Option<T>>, Vec<Option<TaskError<E>>>) {
        self.0.into_iter().map(Outcome::into_parts).unzip()
    }

    #[must_use]
    pub fn remap_interrupted(self, reason: CancelReason) -> Self {
        self.0
            .into_iter()
            .map(|outcome| outcome.remap_interrupted(reason))
            .collect()
    }

    #[must_use]
    pub fn count_values(&self) -> usize {
        self.0.iter().filter(|outcome| outcome.is_value()).count()
    }
}

impl<T, E> Index<usize> for OutcomeSet<T, E> {
    type Output = Outcome<T, E>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T, E> FromIterator<Outcome<T, E>> for OutcomeSet<T, E> {
    fn from_iter<I: IntoIterator<Item = Outcome<T, E>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T, E> IntoIterator for OutcomeSet<T, E> {
    type Item = Outcome<T, E>;
    type IntoIter = std::vec::IntoIter<Outcome<T, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T, E> IntoIterator for &'a OutcomeSet<T, E> {
    type Item = &'a Outcome<T, E>;
    type IntoIter = std::slice::Iter<'a, Outcome<T, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
