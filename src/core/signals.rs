//! # Engine signal primitives.
//!
//! Each engine owns one [`Signals`] value with three independent gates:
//!
//! ```text
//! pause   watch<bool>         stop() → true, start() → false; read at dispatch boundaries
//! cancel  CancellationToken   over(); latched, read before each pass and each dispatch
//! state   watch<RunState>     written by the run driver; wait() blocks on is_terminal()
//! ```
//!
//! Result delivery is not a signal: see [`Mailbox`](super::returns::Mailbox).

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Lifecycle state of an engine's most recent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run started yet.
    #[default]
    Idle,
    /// A run is in flight.
    Running,
    /// Every planned pass finished.
    Completed,
    /// The cancel gate stopped the run.
    Cancelled,
    /// The run ended with a fault.
    Faulted,
}

impl RunState {
    /// True for `Completed`, `Cancelled` and `Faulted`.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Faulted
        )
    }
}

pub(crate) struct Signals {
    pause: watch::Sender<bool>,
    cancel: CancellationToken,
    state: watch::Sender<RunState>,
}

impl Signals {
    pub fn new() -> Self {
        Self {
            pause: watch::Sender::new(false),
            cancel: CancellationToken::new(),
            state: watch::Sender::new(RunState::Idle),
        }
    }

    pub fn pause(&self) {
        self.pause.send_replace(true);
    }

    pub fn resume(&self) {
        self.pause.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.pause.borrow()
    }

    /// Completes once the pause gate is lowered.
    pub async fn resumed(&self) {
        let mut rx = self.pause.subscribe();
        // the sender lives as long as `self`
        let _ = rx.wait_for(|paused| !*paused).await;
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn set_state(&self, state: RunState) {
        self.state.send_replace(state);
    }

    /// Completes once the state is terminal, or immediately when no run is in flight.
    pub async fn settled(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|s| *s != RunState::Running).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_resumed_waits_for_lowered_gate() {
        let signals = Arc::new(Signals::new());
        signals.pause();
        assert!(signals.is_paused());

        let s = Arc::clone(&signals);
        let waiter = tokio::spawn(async move { s.resumed().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        signals.resume();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_settled_tracks_running_state() {
        let signals = Arc::new(Signals::new());
        signals.settled().await;

        signals.set_state(RunState::Running);
        let s = Arc::clone(&signals);
        let waiter = tokio::spawn(async move { s.settled().await });
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        signals.set_state(RunState::Cancelled);
        waiter.await.unwrap();
        assert!(signals.state().is_terminal());
    }
}
