//! Graceful process shutdown handling.
//!
//! Coordinates shutdown between the signal handler, the HTTP server, and
//! whatever else needs to drain before exit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

/// Shutdown controller for coordinating graceful shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownController {
    /// Whether shutdown has been initiated.
    initiated: Arc<AtomicBool>,
    /// Sender for shutdown notification.
    shutdown_tx: broadcast::Sender<()>,
    /// Watch channel for shutdown completion.
    completion_tx: Arc<watch::Sender<bool>>,
    /// Receiver for shutdown completion.
    completion_rx: watch::Receiver<bool>,
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownController {
    /// Creates a new shutdown controller.
    #[must_use]
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (completion_tx, completion_rx) = watch::channel(false);

        Self {
            initiated: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            completion_tx: Arc::new(completion_tx),
            completion_rx,
        }
    }

    /// Initiates shutdown, notifying all listeners. Idempotent.
    pub fn initiate(&self) {
        if self
            .initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.shutdown_tx.send(());
        }
    }

    /// Returns whether shutdown has been initiated.
    #[must_use]
    pub fn is_initiated(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    /// Resolves when shutdown is initiated.
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.shutdown_tx.subscribe();
        let _ = rx.recv().await;
    }

    /// Marks shutdown as complete.
    pub fn mark_complete(&self) {
        let _ = self.completion_tx.send(true);
    }

    /// Waits for shutdown to complete, up to `timeout`.
    ///
    /// Returns `true` if shutdown completed in time.
    pub async fn wait_for_completion(&self, timeout: Duration) -> bool {
        let mut rx = self.completion_rx.clone();

        tokio::select! {
            result = rx.changed() => {
                result.is_ok() && *rx.borrow()
            }
            () = tokio::time::sleep(timeout) => {
                warn!("Shutdown completion timeout after {:?}", timeout);
                false
            }
        }
    }
}

/// Listens for SIGINT (Ctrl+C) and SIGTERM and initiates shutdown.
pub async fn setup_signal_handlers(controller: ShutdownController) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let Ok(mut sigint) = signal(SignalKind::interrupt()) else {
            warn!("Failed to install SIGINT handler");
            return;
        };
        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            warn!("Failed to install SIGTERM handler");
            return;
        };

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT (Ctrl+C)");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
        }

        controller.initiate();
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C");
            controller.initiate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_controller_starts_idle() {
        let controller = ShutdownController::new();
        assert!(!controller.is_initiated());
    }

    #[tokio::test]
    async fn test_initiate_is_idempotent() {
        let controller = ShutdownController::new();

        controller.initiate();
        controller.initiate();

        assert!(controller.is_initiated());
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_resolves() {
        let controller = ShutdownController::new();

        let ctrl = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctrl.initiate();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            controller.wait_for_shutdown(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_completion() {
        let controller = ShutdownController::new();

        controller.initiate();
        controller.mark_complete();

        assert!(
            controller
                .wait_for_completion(Duration::from_millis(100))
                .await
        );
    }

    #[tokio::test]
    async fn test_completion_timeout() {
        let controller = ShutdownController::new();

        controller.initiate();

        assert!(
            !controller
                .wait_for_completion(Duration::from_millis(50))
                .await
        );
    }
}
