//! Admission control under a concurrency limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use paralyze_engine::{Task, paralyze, paralyze_limit};
use tokio::sync::Barrier;

use crate::common::{SomeError, TestTask, millis};

/// Tasks with mixed latency and results, tracking the in-flight peak.
fn tracked_tasks(in_flight: &Arc<AtomicUsize>, peak: &Arc<AtomicUsize>) -> Vec<TestTask<usize>> {
    (0..10)
        .map(|i| {
            let in_flight = Arc::clone(in_flight);
            let peak = Arc::clone(peak);
            Task::plain(move || async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(millis((i as u64 * 7) % 20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                if i % 3 == 0 { Err(SomeError) } else { Ok(i) }
            })
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn limit_caps_in_flight_and_preserves_outcomes() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let limited = paralyze_limit(3, tracked_tasks(&in_flight, &peak)).await;
    assert!(peak.load(Ordering::SeqCst) <= 3);

    let unbounded = paralyze(tracked_tasks(&in_flight, &peak)).await;
    assert_eq!(limited, unbounded);
}

#[tokio::test]
async fn limit_of_one_runs_tasks_one_at_a_time() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let outcomes = paralyze_limit(1, tracked_tasks(&in_flight, &peak)).await;
    assert_eq!(outcomes.len(), 10);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_limit_admits_every_task_at_once() {
    // Completes only if all five tasks are in flight together.
    let barrier = Arc::new(Barrier::new(5));
    let tasks: Vec<TestTask<usize>> = (0..5)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            Task::plain(move || async move {
                barrier.wait().await;
                Ok(i)
            })
        })
        .collect();

    let outcomes = paralyze_limit(0, tasks).await;
    assert_eq!(outcomes.count_values(), 5);
}

#[tokio::test]
async fn limit_above_task_count_behaves_unbounded() {
    let barrier = Arc::new(Barrier::new(3));
    let tasks: Vec<TestTask<()>> = (0..3)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            Task::plain(move || async move {
                barrier.wait().await;
                Ok(())
            })
        })
        .collect();

    let outcomes = paralyze_limit(8, tasks).await;
    assert_eq!(outcomes.count_values(), 3);
}
