//! Connection lifecycle: first-connect detection and the one-time ready hook.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Disconnected,
    /// The first UI connection since the daemon started
    ConnectedFirst,
    /// Any later reconnection
    ConnectedSubsequent,
}

#[derive(Debug)]
struct State {
    phase: ConnectionPhase,
    ever_connected: bool,
}

/// Tracks UI connection phases and guards the ready hook so it runs at most once.
///
/// Only the transition into [`ConnectionPhase::ConnectedFirst`] arms the hook;
/// the hook then runs after the settle delay unless the UI reports ready first.
#[derive(Debug)]
pub struct ConnectionLifecycle {
    state: Mutex<State>,
    ready_fired: AtomicBool,
    settle_delay: Duration,
}

impl ConnectionLifecycle {
    #[must_use]
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                phase: ConnectionPhase::Disconnected,
                ever_connected: false,
            }),
            ready_fired: AtomicBool::new(false),
            settle_delay,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.lock().phase
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Record a connection and return the phase it entered.
    pub fn on_connect(&self) -> ConnectionPhase {
        let mut state = self.lock();
        state.phase = if state.ever_connected {
            ConnectionPhase::ConnectedSubsequent
        } else {
            ConnectionPhase::ConnectedFirst
        };
        state.ever_connected = true;
        debug!("UI connection phase: {:?}", state.phase);
        state.phase
    }

    pub fn on_disconnect(&self) {
        self.lock().phase = ConnectionPhase::Disconnected;
    }

    /// Claim the right to run the ready hook. Only the first caller gets `true`.
    pub fn claim_ready(&self) -> bool {
        !self.ready_fired.swap(true, Ordering::AcqRel)
    }

    #[must_use]
    pub fn ready_fired(&self) -> bool {
        self.ready_fired.load(Ordering::Acquire)
    }
}
