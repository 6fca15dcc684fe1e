//! Graceful shutdown signalling for the ingestion loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::errors::IngestError;

/// Requests a graceful stop of the ingestion loop.
///
/// Cloning the handle is cheap; every clone controls the same loop. Once
/// triggered the request cannot be withdrawn.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Create a new, untriggered handle.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Ask the loop to stop after the record it is currently processing.
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves once shutdown has been requested.
pub(crate) async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|stop| *stop).await.is_err();
    if closed {
        // Every handle is gone, so nobody can ask us to stop anymore.
        std::future::pending::<()>().await;
    }
}

/// Sleep for `duration` unless shutdown is requested first.
pub(crate) async fn sleep_or_cancel(
    rx: &mut watch::Receiver<bool>,
    duration: Duration,
) -> Result<(), IngestError> {
    tokio::select! {
        biased;
        _ = wait_for_shutdown(rx) => Err(IngestError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_shutdown() {
        let handle = ShutdownHandle::new();
        let mut rx = handle.subscribe();

        let result = sleep_or_cancel(&mut rx, Duration::from_secs(1)).await;

        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_is_cancelled_by_earlier_shutdown() {
        let handle = ShutdownHandle::new();
        let mut rx = handle.subscribe();
        handle.shutdown();

        let result = sleep_or_cancel(&mut rx, Duration::from_secs(3600)).await;

        assert!(matches!(result, Err(IngestError::Cancelled)));
        assert!(handle.is_shutdown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_is_cancelled_mid_way() {
        let handle = ShutdownHandle::new();
        let mut rx = handle.subscribe();

        let trigger = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.shutdown();
        });

        let start = tokio::time::Instant::now();
        let result = sleep_or_cancel(&mut rx, Duration::from_secs(3600)).await;

        assert!(matches!(result, Err(IngestError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
