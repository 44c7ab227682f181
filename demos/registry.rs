//! # Registry Example
//!
//! Registers three named engines, runs them all in order with `flow`, and
//! reads each one's returns back by name or by position.
//!
//! ## Run
//! ```bash
//! cargo run --example registry
//! ```

use delegator::{Callable, Delegator, Launch, ParamKind, Registry, Target, Value};

fn engine(label: &'static str, factor: i64) -> Delegator {
    let scale = Callable::from_fn("scale", [ParamKind::Int], move |args: &[Value]| {
        let n = args[0].as_int().unwrap_or_default();
        vec![Value::Int(n * factor), Value::from(label)]
    })
    .with_returns([ParamKind::Int, ParamKind::Str]);

    let d = Delegator::new();
    d.load(&scale, [Value::Int(7)]);
    d
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let registry = Registry::new();
    registry.register(engine("double", 2), "double")?;
    registry.register(engine("triple", 3), "triple")?;
    registry.register(engine("square", 7), "square")?;

    println!("registered: {:?}", registry.names());
    registry.flow(-1, Launch::Inline).await?;

    for target in [Target::from("double"), Target::from(1_usize), Target::from("square")] {
        let label = format!("{target:?}");
        let returns = registry.back_return(target).await?;
        println!(
            "{label:<20} ─► {:?} ({:?})",
            returns.get(0, 0)?,
            returns.get(0, 1)?
        );
    }

    let removed = registry.delete("triple")?;
    println!("deleted triple ({} task), left: {:?}", removed.len(), registry.names());
    Ok(())
}
