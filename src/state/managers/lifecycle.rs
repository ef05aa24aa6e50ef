//! Lifecycle management state and behavior.
//!
//! The hub moves through `Running → Draining → Persisting → Stopped` exactly
//! once. Phases only advance; an attempt to go back or to repeat a phase is
//! ignored, which makes a second shutdown trigger harmless.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shutdown state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShutdownPhase {
    /// Accepting peers and broadcasting.
    Running,
    /// Admissions stopped, queue draining, peers being notified.
    Draining,
    /// Writing the session log.
    Persisting,
    /// Listener released; the process may exit.
    Stopped,
}

impl ShutdownPhase {
    /// Name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Persisting => "persisting",
            Self::Stopped => "stopped",
        }
    }
}

/// Lifecycle management state.
///
/// The LifecycleManager handles:
/// - Shutdown requests from outside the signal handler (tests, embedding)
/// - The admissions token observed by the gateway
/// - Publishing the current phase
pub struct LifecycleManager {
    phase: watch::Sender<ShutdownPhase>,
    requested: CancellationToken,
    admissions: CancellationToken,
}

impl LifecycleManager {
    /// Create a manager in the `Running` phase.
    pub fn new() -> Self {
        let (phase, _) = watch::channel(ShutdownPhase::Running);
        Self {
            phase,
            requested: CancellationToken::new(),
            admissions: CancellationToken::new(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ShutdownPhase {
        *self.phase.borrow()
    }

    /// Whether the hub is still in normal operation.
    pub fn is_running(&self) -> bool {
        self.phase() == ShutdownPhase::Running
    }

    /// Observe phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<ShutdownPhase> {
        self.phase.subscribe()
    }

    /// Move to `next` if it is later than the current phase.
    ///
    /// Returns `true` if the phase changed.
    pub fn advance(&self, next: ShutdownPhase) -> bool {
        self.phase.send_if_modified(|current| {
            if next > *current {
                *current = next;
                true
            } else {
                false
            }
        })
    }

    /// Ask the shutdown coordinator to begin draining.
    pub fn request_shutdown(&self) {
        self.requested.cancel();
    }

    /// Resolves once [`request_shutdown`](Self::request_shutdown) has been called.
    pub async fn shutdown_requested(&self) {
        self.requested.cancelled().await;
    }

    /// Token the gateway watches; cancelled when admissions stop.
    pub fn admissions(&self) -> CancellationToken {
        self.admissions.clone()
    }

    /// Stop accepting new peers.
    pub fn stop_admissions(&self) {
        self.admissions.cancel();
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}
