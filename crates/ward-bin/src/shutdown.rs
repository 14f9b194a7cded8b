// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! OS signals (SIGTERM, SIGINT) or a manual trigger fan out to every
//! subscriber: the HTTP server and the revocation purge task.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown across multiple components.
///
/// ```ignore
/// use ward_bin::shutdown::ShutdownCoordinator;
///
/// let coordinator = ShutdownCoordinator::new();
/// let signal = coordinator.shutdown_signal();
///
/// tokio::spawn(async move { coordinator.wait_for_shutdown().await });
/// server.run_with_shutdown(signal).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribes to shutdown notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Returns a future that resolves once shutdown is initiated.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        // Subscribe before reading the flag so a concurrent trigger is not lost.
        let mut receiver = self.sender.subscribe();
        let initiated = self.shutdown_initiated.clone();
        async move {
            if initiated.load(Ordering::SeqCst) {
                return;
            }
            let _ = receiver.recv().await;
        }
    }

    /// Initiates shutdown. Idempotent.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.sender.send(());
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for an OS signal, or returns early once shutdown was initiated
    /// some other way, then notifies all subscribers.
    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown_initiated() {
            return;
        }

        tokio::select! {
            _ = os_signal() => {}
            _ = self.shutdown_signal() => {}
        }

        self.initiate_shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on SIGTERM or SIGINT (Unix) or Ctrl+C.
async fn os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = ctrl_c() => {}
                }
                return;
            }
            Err(e) => warn!("Failed to register SIGTERM handler: {}", e),
        }
    }

    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
