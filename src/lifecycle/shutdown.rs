//! Shutdown coordination for the proxy.

use tokio::sync::broadcast;

use crate::lifecycle::signals::wait_for_signal;

/// Coordinator for graceful shutdown.
///
/// Tests and embedders trigger it directly; `main` relies on OS signals.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on an OS signal or when `rx` fires (or its sender is dropped).
pub async fn shutdown_requested(mut rx: broadcast::Receiver<()>) {
    tokio::select! {
        _ = wait_for_signal() => {}
        _ = rx.recv() => {
            tracing::info!("Shutdown triggered");
        }
    }
}
