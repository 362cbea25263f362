use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::job::SyncController;
use crate::http::JobApi;

/// Handles shutdown of the interactive session
///
/// Shutdown starts on CTRL+C, SIGTERM (Unix only) or when the shell ends,
/// then:
/// 1. Signals the shell to stop reading input
/// 2. Waits for the shell task to finish
/// 3. Aborts refreshes that have not fired yet
pub struct ShutdownCoordinator<A> {
    shell_task: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
    controller: Arc<SyncController<A>>,
}

impl<A: JobApi> ShutdownCoordinator<A> {
    pub fn new(
        shell_task: JoinHandle<()>,
        shutdown_tx: watch::Sender<bool>,
        controller: Arc<SyncController<A>>,
    ) -> Self {
        Self {
            shell_task,
            shutdown_tx,
            controller,
        }
    }

    /// Wait for a shutdown trigger and tear down
    pub async fn wait_for_shutdown(mut self) {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install CTRL+C signal handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM signal handler: {:?}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let shell_done = tokio::select! {
            _ = ctrl_c => {
                info!("Received CTRL+C signal, shutting down...");
                false
            }
            _ = terminate => {
                info!("Received SIGTERM signal, shutting down...");
                false
            }
            result = &mut self.shell_task => {
                if let Err(e) = result {
                    error!("Shell task failed: {:?}", e);
                }
                true
            }
        };

        self.shutdown(shell_done).await
    }

    async fn shutdown(self, shell_done: bool) {
        // 1. Tell the shell to stop
        if !shell_done {
            info!("Signaling shell to stop...");
            if let Err(e) = self.shutdown_tx.send(true) {
                error!("Failed to send shutdown signal to shell: {:?}", e);
            }

            // 2. Wait for the shell loop to return
            match self.shell_task.await {
                Ok(()) => info!("Shell stopped"),
                Err(e) => error!("Shell task failed to stop: {:?}", e),
            }
        }

        // 3. Drop refreshes still waiting on their delay
        let aborted = self.controller.abort_pending_refreshes();
        info!("Aborted {} pending refreshes", aborted);

        info!("Shutdown completed");
    }
}
