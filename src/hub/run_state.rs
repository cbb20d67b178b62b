use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Lifecycle of the hub as seen by its entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    NotRunning,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl RunState {
    /// True before the hub has begun starting; entity setup happens here
    pub fn is_not_running(&self) -> bool {
        matches!(self, RunState::NotRunning)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::NotRunning => write!(f, "not_running"),
            RunState::Starting => write!(f, "starting"),
            RunState::Running => write!(f, "running"),
            RunState::Stopping => write!(f, "stopping"),
            RunState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Read access to the hub's run state, injected into entities
pub trait RunStateQuery: Send + Sync {
    fn run_state(&self) -> RunState;
}

/// A fixed state; handy wherever the state never changes
impl RunStateQuery for RunState {
    fn run_state(&self) -> RunState {
        *self
    }
}

/// Shared, observable run state owned by the hub
#[derive(Debug)]
pub struct RunStateHandle {
    tx: watch::Sender<RunState>,
}

impl RunStateHandle {
    pub fn new(initial: RunState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn set(&self, state: RunState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "Hub run state changed");
        }
    }

    pub fn get(&self) -> RunState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.tx.subscribe()
    }
}

impl Default for RunStateHandle {
    fn default() -> Self {
        Self::new(RunState::NotRunning)
    }
}

impl RunStateQuery for RunStateHandle {
    fn run_state(&self) -> RunState {
        self.get()
    }
}
