use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use delegator::{
    DelegateError, Delegator, EventKind, Launch, Outputs, PatternKind, RunState, TaskFn, TaskRef,
    Value,
};
use tokio::sync::{Notify, mpsc};
use tokio::time::Instant;

/// Task that reports each call's number on `tx`, then parks on `gate` when
/// the call number equals `hold_at`.
fn gated(
    hits: &Arc<AtomicI64>,
    tx: mpsc::UnboundedSender<i64>,
    gate: &Arc<Notify>,
    hold_at: i64,
) -> TaskRef {
    let hits = Arc::clone(hits);
    let gate = Arc::clone(gate);
    TaskFn::arc("gated", move || {
        let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = tx.clone();
        let gate = Arc::clone(&gate);
        async move {
            let _ = tx.send(n);
            if n == hold_at {
                gate.notified().await;
            }
            vec![Value::Int(n)]
        }
    })
}

#[tokio::test]
async fn detached_run_returns_immediately() {
    let hits = Arc::new(AtomicI64::new(0));
    let gate = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let d = Delegator::detachable();
    d.load_task(gated(&hits, tx, &gate, 1));

    d.run(Launch::Detached).await.unwrap();
    assert_eq!(rx.recv().await, Some(1));
    assert_eq!(d.state(), RunState::Running);

    gate.notify_one();
    d.wait().await;
    assert_eq!(d.state(), RunState::Completed);

    let r = d.get_returns().await.unwrap();
    assert_eq!(r.get(0, 0), Ok(&Value::Int(1)));
}

#[tokio::test]
async fn over_stops_an_endless_cycle_after_the_current_pass() {
    let hits = Arc::new(AtomicI64::new(0));
    let gate = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let d = Delegator::detachable();
    d.load_task(gated(&hits, tx, &gate, 2))
        .set_pattern(PatternKind::Cycle, [Value::Int(-1)]);
    d.run(Launch::Detached).await.unwrap();

    assert_eq!(rx.recv().await, Some(1));
    assert_eq!(rx.recv().await, Some(2));
    d.over();
    gate.notify_one();
    d.wait().await;

    assert_eq!(d.state(), RunState::Cancelled);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let r = d.get_returns().await.unwrap();
    assert_eq!(r.pass(), 2);
    assert_eq!(r.get(0, 0), Ok(&Value::Int(2)));
}

#[tokio::test]
async fn over_during_pass_two_of_three_prevents_pass_three() {
    let hits = Arc::new(AtomicI64::new(0));
    let gate = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let d = Delegator::detachable();
    d.load_task(gated(&hits, tx, &gate, 2))
        .set_pattern(PatternKind::Cycle, [Value::Int(3)]);
    d.run(Launch::Detached).await.unwrap();

    assert_eq!(rx.recv().await, Some(1));
    assert_eq!(rx.recv().await, Some(2));
    d.over();
    gate.notify_one();
    d.wait().await;

    assert_eq!(d.state(), RunState::Cancelled);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let r = d.get_returns().await.unwrap();
    assert_eq!(r.pass(), 2);
    assert!(r.back_error().is_none());
}

#[tokio::test]
async fn tick_without_duration_is_deposited_in_returns() {
    let hits = Arc::new(AtomicI64::new(0));
    let h = Arc::clone(&hits);

    let d = Delegator::detachable();
    d.load_task(TaskFn::arc("once", move || {
        h.fetch_add(1, Ordering::SeqCst);
        async { Outputs::new() }
    }))
    .set_pattern(PatternKind::Tick, [Value::Int(5)]);

    d.run(Launch::Detached).await.unwrap();
    d.wait().await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(d.state(), RunState::Faulted);
    assert!(d.fault().is_none());

    let r = d.get_returns().await.unwrap();
    assert_eq!(r.pass(), 1);
    assert!(matches!(
        r.back_error(),
        Some(DelegateError::PatternParam { pattern: PatternKind::Tick, .. })
    ));
}

#[tokio::test]
async fn timeout_without_duration_is_deposited_in_returns() {
    let hits = Arc::new(AtomicI64::new(0));
    let h = Arc::clone(&hits);

    let d = Delegator::detachable();
    d.load_task(TaskFn::arc("once", move || {
        h.fetch_add(1, Ordering::SeqCst);
        async { Outputs::new() }
    }))
    .set_pattern(PatternKind::TimeOut, []);

    assert!(d.run(Launch::Detached).await.is_ok());
    d.wait().await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(d.state(), RunState::Faulted);
    assert!(d.fault().is_none());

    let r = d.get_returns().await.unwrap();
    assert!(matches!(
        r.back_error(),
        Some(DelegateError::PatternParam { pattern: PatternKind::TimeOut, .. })
    ));

    // nothing buffered any more: the run's fault is reported instead
    assert_eq!(
        d.get_returns().await.unwrap_err().as_label(),
        "pattern_param_fault"
    );
    assert_eq!(d.run(Launch::Inline).await, Err(DelegateError::AlreadyLaunched));
}

#[tokio::test(start_paused = true)]
async fn stop_holds_the_next_dispatch_until_start() {
    let hits = Arc::new(AtomicI64::new(0));
    let gate = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let d = Delegator::detachable();
    let mut events = d.subscribe();
    for _ in 0..3 {
        d.load_task(gated(&hits, tx.clone(), &gate, 1));
    }
    d.run(Launch::Detached).await.unwrap();

    assert_eq!(rx.recv().await, Some(1));
    d.stop();
    gate.notify_one();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    d.start();
    d.wait().await;
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.kind);
    }
    let paused = kinds.iter().position(|k| *k == EventKind::Paused).unwrap();
    let resumed = kinds.iter().position(|k| *k == EventKind::Resumed).unwrap();
    assert!(paused < resumed);
}

#[tokio::test(start_paused = true)]
async fn sleep_pauses_for_the_given_duration() {
    let hits = Arc::new(AtomicI64::new(0));
    let gate = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let second_at = Arc::new(parking_lot::Mutex::new(None::<Instant>));

    let d = Delegator::detachable();
    d.load_task(gated(&hits, tx, &gate, 1));
    let s = Arc::clone(&second_at);
    d.load_task(TaskFn::arc("second", move || {
        *s.lock() = Some(Instant::now());
        async { Outputs::new() }
    }));
    d.run(Launch::Detached).await.unwrap();

    assert_eq!(rx.recv().await, Some(1));
    let t0 = Instant::now();
    d.sleep(Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(1)).await;
    gate.notify_one();

    d.wait().await;
    let at = second_at.lock().unwrap();
    assert!(at - t0 >= Duration::from_millis(100));
}

#[tokio::test]
async fn inline_run_while_another_is_in_flight_is_busy() {
    let hits = Arc::new(AtomicI64::new(0));
    let gate = Arc::new(Notify::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let d = Delegator::new();
    d.load_task(gated(&hits, tx, &gate, 1));

    let other = d.clone();
    let first = tokio::spawn(async move { other.run(Launch::Inline).await });
    assert_eq!(rx.recv().await, Some(1));

    assert_eq!(d.run(Launch::Inline).await, Err(DelegateError::Busy));

    gate.notify_one();
    first.await.unwrap().unwrap();
    // get_returns waits for the in-flight run, then takes its snapshot
    assert_eq!(d.get_returns().await.unwrap().get(0, 0), Ok(&Value::Int(1)));
}
