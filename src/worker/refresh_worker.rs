use std::future::Future;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Handle to one delayed refresh
///
/// The refresh fires once after its delay and is never retried. Dropping the
/// ticket does not cancel it; aborting through `abort_handle` does.
#[derive(Debug)]
pub struct RefreshTicket {
    handle: JoinHandle<()>,
}

impl RefreshTicket {
    /// Wait until the refresh has run (or was aborted)
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            if e.is_cancelled() {
                info!("Scheduled refresh was aborted before it ran");
            } else {
                warn!("Scheduled refresh task failed: {:?}", e);
            }
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }
}

/// Spawn `refresh` to run once after `delay`
pub fn schedule<F>(delay: Duration, refresh: F) -> RefreshTicket
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Scheduling data refresh in {} ms", delay.as_millis());
    let handle = tokio::spawn(async move {
        sleep(delay).await;
        refresh.await;
    });
    RefreshTicket { handle }
}
