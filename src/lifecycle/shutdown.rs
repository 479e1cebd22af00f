//! Shutdown coordination for the server.
//!
//! A [`Shutdown`] fans one trigger out to every subscribed task. Servers wait
//! on [`wait_for_shutdown`], which also honours Ctrl+C.

use tokio::sync::broadcast;

/// Fan-out shutdown trigger.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. A no-op when nobody is listening.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a [`wait_for_shutdown`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Triggered,
    /// The [`Shutdown`] was dropped without triggering.
    Abandoned,
    CtrlC,
}

/// Resolve once `rx` fires, its sender goes away, or Ctrl+C arrives.
pub async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) -> ShutdownReason {
    let reason = tokio::select! {
        res = rx.recv() => match res {
            Err(broadcast::error::RecvError::Closed) => ShutdownReason::Abandoned,
            _ => ShutdownReason::Triggered,
        },
        _ = tokio::signal::ctrl_c() => ShutdownReason::CtrlC,
    };
    tracing::info!(reason = ?reason, "Shutdown signal received");
    reason
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_waiter() {
        let shutdown = Shutdown::new();
        let a = tokio::spawn(wait_for_shutdown(shutdown.subscribe()));
        let b = tokio::spawn(wait_for_shutdown(shutdown.subscribe()));
        shutdown.trigger();
        assert_eq!(a.await.unwrap(), ShutdownReason::Triggered);
        assert_eq!(b.await.unwrap(), ShutdownReason::Triggered);
    }

    #[tokio::test]
    async fn test_dropped_coordinator_releases_waiters() {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        drop(shutdown);
        assert_eq!(wait_for_shutdown(rx).await, ShutdownReason::Abandoned);
    }
}
