//! # Detached Run Example
//!
//! Launches a never-ending cycle in the background, pauses it, resumes it,
//! then cancels it. Engine events are rendered by the built-in `LogWriter`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=delegator=debug cargo run --example detached --features logging
//! ```

use std::{sync::Arc, time::Duration};

use delegator::{Config, Delegator, Launch, LogWriter, Mode, PatternKind, TaskFn, Value};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("delegator=info")),
        )
        .init();

    let engine = Delegator::builder(Config::default())
        .with_mode(Mode::Detachable)
        .with_name("heartbeat")
        .with_subscribers(vec![Arc::new(LogWriter::new())])
        .build();

    engine
        .load_task(TaskFn::arc("beat", || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            vec![Value::from("lub-dub")]
        }))
        .set_time(Duration::from_millis(100), -1)
        .set_pattern(PatternKind::Cycle, [Value::Int(-1)]);

    engine.run(Launch::Detached).await?;
    println!("run detached; state = {:?}", engine.state());

    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("stop");
    engine.stop();

    tokio::time::sleep(Duration::from_millis(500)).await;
    println!("start");
    engine.start();

    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("sleep 400ms");
    engine.sleep(Duration::from_millis(400));

    tokio::time::sleep(Duration::from_millis(800)).await;
    println!("over");
    engine.over();
    engine.wait().await;

    let returns = engine.get_returns().await?;
    println!(
        "finished {:?} after pass {} with {:?}",
        engine.state(),
        returns.pass(),
        returns.get(0, 0)?
    );
    Ok(())
}
