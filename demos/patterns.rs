//! # Run Patterns Example
//!
//! Runs the same small queue under each pattern and prints what came back.
//!
//! - `Normal`: one pass
//! - `Cycle 3`: three passes, the last snapshot wins
//! - `TimeOut 200ms`: one pass after a delay
//! - `Tick 100ms x 3`: three passes, 100ms apart
//! - `TimeOut` without a duration: one pass, then the pattern fault surfaces
//!
//! ## Run
//! ```bash
//! cargo run --example patterns
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicI64, Ordering},
    time::{Duration, Instant},
};

use delegator::{Callable, Delegator, Launch, ParamKind, PatternKind, Value};

fn queue(hits: &Arc<AtomicI64>) -> Delegator {
    let add = Callable::from_fn("add", [ParamKind::Int, ParamKind::Int], |args: &[Value]| {
        let a = args[0].as_int().unwrap_or_default();
        let b = args[1].as_int().unwrap_or_default();
        vec![Value::Int(a + b)]
    })
    .with_returns([ParamKind::Int]);

    let hits = Arc::clone(hits);
    let count = Callable::from_fn("count", [], move |_: &[Value]| {
        vec![Value::Int(hits.fetch_add(1, Ordering::Relaxed) + 1)]
    })
    .with_returns([ParamKind::Int]);

    let engine = Delegator::new();
    engine.load(&add, [Value::Int(40), Value::Int(2)]).load(&count, []);
    engine
}

async fn show(label: &str, kind: PatternKind, args: Vec<Value>) -> anyhow::Result<()> {
    let hits = Arc::new(AtomicI64::new(0));
    let engine = queue(&hits);
    engine.set_pattern(kind, args);

    let started = Instant::now();
    let outcome = engine.run(Launch::Inline).await;
    let elapsed = started.elapsed();

    println!("{label}");
    println!(" ├─► state:   {:?} in {elapsed:?}", engine.state());
    match outcome {
        Ok(()) => {
            let returns = engine.get_returns().await?;
            println!(" ├─► pass:    {}", returns.pass());
            println!(" ├─► add:     {:?}", returns.get(0, 0)?);
            println!(" └─► count:   {:?}", returns.get(1, 0)?);
        }
        Err(e) => {
            println!(" ├─► calls:   {}", hits.load(Ordering::Relaxed));
            println!(" └─► fault:   {e} ({})", e.as_label());
        }
    }
    println!();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    show("Normal", PatternKind::Normal, vec![]).await?;
    show("Cycle 3", PatternKind::Cycle, vec![Value::Int(3)]).await?;
    show(
        "TimeOut 200ms",
        PatternKind::TimeOut,
        vec![Value::Duration(Duration::from_millis(200))],
    )
    .await?;
    show(
        "Tick 100ms x 3",
        PatternKind::Tick,
        vec![Value::Duration(Duration::from_millis(100)), Value::Int(3)],
    )
    .await?;
    show("TimeOut (no duration)", PatternKind::TimeOut, vec![]).await?;
    Ok(())
}
