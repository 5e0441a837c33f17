//! Keyed fan-out over a map of tasks.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use paralyze_types::Outcome;

use crate::adapters::paralyze;
use crate::task::Task;

/// Run every task in `tasks` concurrently and key each outcome by the task's
/// key. The returned map has exactly the input's key set.
///
/// # Panics
///
/// Re-raises the first panic from any task after all tasks have settled.
pub async fn paralyze_named<K, T, E, S>(
    tasks: HashMap<K, Task<T, E>, S>,
) -> HashMap<K, Outcome<T, E>, S>
where
    K: Eq + Hash,
    T: Send + 'static,
    E: Send + 'static,
    S: BuildHasher + Default,
{
    let (keys, tasks): (Vec<K>, Vec<Task<T, E>>) = tasks.into_iter().unzip();
    let outcomes = paralyze(tasks).await;
    keys.into_iter().zip(outcomes).collect()
}
