//! Unbounded fan-out: shape, ordering and isolation of outcomes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use paralyze_engine::{Outcome, Task, TaskError, paralyze};

use crate::common::{
    Answer, SomeError, TestTask, fail_after, init_tracing, millis, succeed_after, trio,
};

#[tokio::test]
async fn outcome_count_matches_task_count() {
    init_tracing();
    for n in 0..6 {
        let tasks: Vec<TestTask<usize>> = (0..n).map(|i| succeed_after(millis(1), i)).collect();
        let (values, errors) = paralyze(tasks).await.into_parts();
        assert_eq!(values.len(), n);
        assert_eq!(errors.len(), n);
    }
}

#[tokio::test]
async fn outcomes_align_with_submission_order() {
    let delays = [40, 5, 25, 0, 15, 30, 1];
    let tasks: Vec<TestTask<u64>> = delays
        .iter()
        .map(|&delay| succeed_after(millis(delay), delay))
        .collect();

    let outcomes = paralyze(tasks).await;
    let values: Vec<u64> = outcomes.iter().filter_map(|o| o.value().copied()).collect();
    assert_eq!(values, delays);
}

#[tokio::test]
async fn task_results_do_not_interfere() {
    init_tracing();
    let (values, errors) = paralyze(trio()).await.into_parts();

    assert_eq!(
        values,
        vec![Some(Answer::Text("ok")), Some(Answer::Number(55)), None]
    );
    assert_eq!(errors, vec![None, None, Some(TaskError::Task(SomeError))]);
}

#[tokio::test]
async fn errors_and_values_interleave_by_index() {
    let tasks = vec![
        fail_after(millis(10)),
        succeed_after(millis(1), 1),
        fail_after(millis(0)),
        succeed_after(millis(20), 3),
    ];
    let outcomes = paralyze(tasks).await;

    assert_eq!(outcomes.count_values(), 2);
    assert_eq!(outcomes[0], Outcome::Failed(TaskError::Task(SomeError)));
    assert_eq!(outcomes[1], Outcome::Value(1));
    assert_eq!(outcomes[2], Outcome::Failed(TaskError::Task(SomeError)));
    assert_eq!(outcomes[3], Outcome::Value(3));
}

#[tokio::test]
async fn blocking_tasks_run_alongside_async_tasks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let tasks: Vec<Task<&str, SomeError>> = vec![
        Task::blocking(move || {
            std::thread::sleep(millis(20));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("blocking")
        }),
        Task::plain(|| async { Ok("async") }),
        Task::blocking(|| Err(SomeError)),
    ];

    let outcomes = paralyze(tasks).await;
    assert_eq!(outcomes[0].value(), Some(&"blocking"));
    assert_eq!(outcomes[1].value(), Some(&"async"));
    assert_eq!(outcomes[2].error(), Some(&TaskError::Task(SomeError)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn outcomes_convert_into_results() {
    let results: Vec<Result<Answer, TaskError<SomeError>>> = paralyze(trio())
        .await
        .into_iter()
        .map(Outcome::into_result)
        .collect();

    assert_eq!(results[1], Ok(Answer::Number(55)));
    assert!(results[2].as_ref().is_err_and(|err| err.task_error() == Some(&SomeError)));
}
