//! # Run patterns.
//!
//! A [`Pattern`] pairs a [`PatternKind`] with a dynamically typed argument
//! list. When a run begins, the pattern is resolved into a [`Plan`]: the
//! concrete schedule of passes the run loop executes.
//!
//! ## Resolution table
//! ```text
//! Normal       any args                 → Once
//! Cycle        []  | [Int(-1)]          → Forever
//!              [Int(n)]                 → Repeat(max(n, 0))
//!              [Str(numeric)]           → Repeat(max(parsed, 0))
//!              [anything else]          → Repeat(1)
//! TimeOut      [Duration(d), ..]        → Delayed(d)
//!              missing / mistyped       → Once + PatternParam fault
//! Tick         [Duration(d), Int(n),..] → Ticks { every: d, count: max(n, 0) }
//!              missing / mistyped       → Once + PatternParam fault
//! Ineffective  any args                 → Skip
//! ```

use std::fmt;
use std::time::Duration;

use crate::error::DelegateError;
use crate::tasks::Value;

/// Sentinel cycle count meaning "repeat until cancelled".
pub const RUN_FOREVER: i64 = -1;

const TIMEOUT_REASON: &str = "expected a duration as the first argument";
const TICK_REASON: &str = "expected a duration then an integer repeat count";

/// Repetition/timing policy of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternKind {
    /// Exactly one pass.
    #[default]
    Normal,
    /// Bounded or unbounded repetition.
    Cycle,
    /// One pass after a leading delay.
    TimeOut,
    /// `count` passes separated by a fixed interval.
    Tick,
    /// Placeholder for an invalid selection; runs nothing.
    Ineffective,
}

impl PatternKind {
    /// Numeric code of this pattern (`Ineffective` has none).
    pub fn code(self) -> Option<i64> {
        match self {
            PatternKind::Normal => Some(0),
            PatternKind::Cycle => Some(1),
            PatternKind::TimeOut => Some(2),
            PatternKind::Tick => Some(3),
            PatternKind::Ineffective => None,
        }
    }

    /// Maps a numeric code to a pattern; anything out of range is `Ineffective`.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PatternKind::Normal,
            1 => PatternKind::Cycle,
            2 => PatternKind::TimeOut,
            3 => PatternKind::Tick,
            _ => PatternKind::Ineffective,
        }
    }
}

impl From<i64> for PatternKind {
    fn from(code: i64) -> Self {
        PatternKind::from_code(code)
    }
}

impl From<i32> for PatternKind {
    fn from(code: i32) -> Self {
        PatternKind::from_code(i64::from(code))
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatternKind::Normal => "normal",
            PatternKind::Cycle => "cycle",
            PatternKind::TimeOut => "timeout",
            PatternKind::Tick => "tick",
            PatternKind::Ineffective => "ineffective",
        })
    }
}

/// Selected pattern plus its arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    kind: PatternKind,
    args: Vec<Value>,
}

impl Pattern {
    pub fn new(kind: PatternKind, args: Vec<Value>) -> Self {
        // invalid selections keep no arguments
        let args = if kind == PatternKind::Ineffective {
            Vec::new()
        } else {
            args
        };
        Self { kind, args }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Resolves the pattern into a pass schedule.
    ///
    /// A `Some` fault means the arguments were rejected and the plan was
    /// degraded to a single pass.
    pub(crate) fn plan(&self) -> (Plan, Option<DelegateError>) {
        match self.kind {
            PatternKind::Normal => (Plan::Once, None),
            PatternKind::Ineffective => (Plan::Skip, None),
            PatternKind::Cycle => (cycle_plan(self.args.first()), None),
            PatternKind::TimeOut => match self.args.first().and_then(Value::as_duration) {
                Some(d) => (Plan::Delayed(d), None),
                None => (Plan::Once, Some(self.fault(TIMEOUT_REASON))),
            },
            PatternKind::Tick => {
                let every = self.args.first().and_then(Value::as_duration);
                let count = self.args.get(1).and_then(Value::as_int);
                match (every, count) {
                    (Some(every), Some(count)) => (
                        Plan::Ticks {
                            every,
                            count: clamp_count(count),
                        },
                        None,
                    ),
                    _ => (Plan::Once, Some(self.fault(TICK_REASON))),
                }
            }
        }
    }

    fn fault(&self, reason: &'static str) -> DelegateError {
        DelegateError::PatternParam {
            pattern: self.kind,
            reason,
        }
    }
}

/// Concrete pass schedule executed by the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Plan {
    /// No pass at all.
    Skip,
    /// A single pass.
    Once,
    /// Passes until cancelled.
    Forever,
    /// A fixed number of passes.
    Repeat(u64),
    /// Sleep, then a single pass.
    Delayed(Duration),
    /// `count` passes with `every` between consecutive ones.
    Ticks { every: Duration, count: u64 },
}

fn cycle_plan(arg: Option<&Value>) -> Plan {
    match arg {
        None | Some(Value::Int(RUN_FOREVER)) => Plan::Forever,
        Some(Value::Int(n)) => Plan::Repeat(clamp_count(*n)),
        Some(Value::Str(s)) => match s.trim().parse::<i64>() {
            Ok(n) => Plan::Repeat(clamp_count(n)),
            Err(_) => Plan::Repeat(1),
        },
        Some(_) => Plan::Repeat(1),
    }
}

fn clamp_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(kind: PatternKind, args: Vec<Value>) -> (Plan, Option<DelegateError>) {
        Pattern::new(kind, args).plan()
    }

    #[test]
    fn test_out_of_range_codes_are_ineffective() {
        assert_eq!(PatternKind::from(-3), PatternKind::Ineffective);
        assert_eq!(PatternKind::from(4), PatternKind::Ineffective);
        assert_eq!(PatternKind::from(99_i64), PatternKind::Ineffective);
        assert_eq!(PatternKind::from(3), PatternKind::Tick);
        assert_eq!(PatternKind::Tick.code(), Some(3));
        assert_eq!(PatternKind::Ineffective.code(), None);
    }

    #[test]
    fn test_ineffective_runs_nothing() {
        let p = Pattern::new(PatternKind::Ineffective, vec![Value::Int(3)]);
        assert!(p.args().is_empty());
        assert_eq!(p.plan(), (Plan::Skip, None));
    }

    #[test]
    fn test_cycle_argument_forms() {
        assert_eq!(plan(PatternKind::Cycle, vec![]).0, Plan::Forever);
        assert_eq!(plan(PatternKind::Cycle, vec![Value::Int(-1)]).0, Plan::Forever);
        assert_eq!(plan(PatternKind::Cycle, vec![Value::Int(3)]).0, Plan::Repeat(3));
        assert_eq!(plan(PatternKind::Cycle, vec![Value::Int(0)]).0, Plan::Repeat(0));
        assert_eq!(plan(PatternKind::Cycle, vec![Value::Int(-7)]).0, Plan::Repeat(0));
        assert_eq!(plan(PatternKind::Cycle, vec!["5".into()]).0, Plan::Repeat(5));
        assert_eq!(plan(PatternKind::Cycle, vec!["-1".into()]).0, Plan::Repeat(0));
        assert_eq!(plan(PatternKind::Cycle, vec!["five".into()]).0, Plan::Repeat(1));
        assert_eq!(plan(PatternKind::Cycle, vec![Value::Float(2.0)]).0, Plan::Repeat(1));
    }

    #[test]
    fn test_timeout_requires_duration() {
        let d = Duration::from_millis(100);
        assert_eq!(plan(PatternKind::TimeOut, vec![d.into()]), (Plan::Delayed(d), None));

        let (p, fault) = plan(PatternKind::TimeOut, vec![]);
        assert_eq!(p, Plan::Once);
        assert_eq!(fault.unwrap().as_label(), "pattern_param_fault");

        let (p, fault) = plan(PatternKind::TimeOut, vec![Value::Int(100)]);
        assert_eq!(p, Plan::Once);
        assert!(fault.is_some());
    }

    #[test]
    fn test_tick_requires_duration_and_count() {
        let d = Duration::from_millis(50);
        assert_eq!(
            plan(PatternKind::Tick, vec![d.into(), Value::Int(4)]),
            (Plan::Ticks { every: d, count: 4 }, None)
        );

        for args in [vec![], vec![d.into()], vec![Value::Int(4), d.into()]] {
            let (p, fault) = plan(PatternKind::Tick, args);
            assert_eq!(p, Plan::Once);
            assert_eq!(
                fault,
                Some(DelegateError::PatternParam {
                    pattern: PatternKind::Tick,
                    reason: TICK_REASON,
                })
            );
        }
    }
}
