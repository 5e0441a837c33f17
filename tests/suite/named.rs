//! Keyed fan-out.

use std::collections::{BTreeSet, HashMap};

use paralyze_engine::{Outcome, TaskError, paralyze, paralyze_named};

use crate::common::{Answer, SomeError, broken, fast, slow, trio};

#[tokio::test(start_paused = true)]
async fn keyed_outcomes_match_positional_outcomes() {
    let tasks = HashMap::from([("slow", slow()), ("fast", fast()), ("broken", broken())]);

    let named = paralyze_named(tasks).await;
    let positional = paralyze(trio()).await;

    let keys: BTreeSet<_> = named.keys().copied().collect();
    assert_eq!(keys, BTreeSet::from(["broken", "fast", "slow"]));
    assert_eq!(named["slow"], positional[0]);
    assert_eq!(named["fast"], positional[1]);
    assert_eq!(named["broken"], positional[2]);
}

#[tokio::test(start_paused = true)]
async fn owned_keys_are_preserved() {
    let tasks: HashMap<String, _> = (0..4)
        .map(|i| {
            let task = if i % 2 == 0 { fast() } else { broken() };
            (format!("job-{i}"), task)
        })
        .collect();

    let outcomes = paralyze_named(tasks).await;
    assert_eq!(outcomes.len(), 4);
    assert_eq!(outcomes["job-0"], Outcome::Value(Answer::Number(55)));
    assert_eq!(outcomes["job-3"], Outcome::Failed(TaskError::Task(SomeError)));
}
