//! Panic containment and deferred re-raise.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use paralyze_engine::{
    CancellationSignal, Executor, Task, TaskError, panic_message, paralyze, paralyze_limit,
    paralyze_with_timeout,
};

use crate::common::{SomeError, TestTask, init_tracing, millis, panic_after, succeed_after};

fn counted(delay_ms: u64, finished: &Arc<AtomicUsize>) -> TestTask<u32> {
    let finished = Arc::clone(finished);
    Task::plain(move || async move {
        tokio::time::sleep(millis(delay_ms)).await;
        finished.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    })
}

#[tokio::test]
#[should_panic(expected = "kaboom")]
async fn panic_is_re_raised_to_the_caller() {
    let tasks = vec![succeed_after(millis(1), 1), panic_after(millis(5), "kaboom")];
    paralyze(tasks).await;
}

#[tokio::test]
async fn panic_surfaces_only_after_siblings_settle() {
    init_tracing();
    let finished = Arc::new(AtomicUsize::new(0));
    let tasks = vec![
        panic_after(millis(0), "early"),
        counted(30, &finished),
        counted(60, &finished),
    ];

    let err = tokio::spawn(paralyze(tasks)).await.unwrap_err();
    assert!(err.is_panic());
    assert_eq!(panic_message(&*err.into_panic()), "early");
    assert_eq!(finished.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_panics_surface_one_payload() {
    let tasks: Vec<TestTask<()>> = (0..8).map(|_| panic_after(millis(5), "simultaneous")).collect();

    let fault = Executor::unbounded()
        .run(tasks, &CancellationSignal::new())
        .await
        .unwrap_err();
    assert!(fault.index() < 8);
    assert_eq!(fault.message(), "simultaneous");
    assert_eq!(fault.to_string(), format!("task {} panicked: simultaneous", fault.index()));
}

#[tokio::test]
async fn executor_records_panicked_slot_without_unwinding() {
    let tasks = vec![panic_after(millis(0), "contained"), succeed_after(millis(1), 7)];
    let fault = Executor::unbounded()
        .run(tasks, &CancellationSignal::new())
        .await
        .unwrap_err();

    assert_eq!(fault.index(), 0);
    let payload = fault.into_payload();
    assert_eq!(panic_message(&*payload), "contained");
}

#[tokio::test]
async fn limited_call_releases_slot_of_panicking_task() {
    let finished = Arc::new(AtomicUsize::new(0));
    let tasks = vec![
        panic_after(millis(0), "first"),
        counted(1, &finished),
        counted(1, &finished),
    ];

    let err = tokio::spawn(paralyze_limit(1, tasks)).await.unwrap_err();
    assert!(err.is_panic());
    assert_eq!(finished.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn panic_beats_timeout_remapping() {
    let tasks: Vec<TestTask<()>> = vec![
        panic_after(millis(0), "before deadline"),
        succeed_after(std::time::Duration::from_secs(5), ()),
    ];

    let err = tokio::spawn(paralyze_with_timeout(millis(20), tasks))
        .await
        .unwrap_err();
    assert_eq!(panic_message(&*err.into_panic()), "before deadline");
}

#[test]
fn panicked_error_is_distinct_from_task_errors() {
    let err: TaskError<SomeError> = TaskError::Panicked {
        message: "boom".to_string(),
    };
    assert!(err.is_panic());
    assert!(!err.is_cancellation());
    assert_eq!(err.task_error(), None);
}
