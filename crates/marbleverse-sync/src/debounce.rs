//! Debounced remote push: rapid local edits collapse into one upsert carrying
//! only the latest state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use marbleverse_core::AppState;

/// How long a scheduled push waits for a newer state to supersede it.
pub const PUSH_DEBOUNCE: Duration = Duration::from_secs(2);

/// Destination for pushed state. A trait seam so the scheduler can be tested
/// without a network.
#[async_trait]
pub trait VaultSink: Send + Sync {
    async fn store(&self, state: AppState) -> Result<(), String>;
}

/// Single-slot push scheduler. Local persistence must already have happened
/// when a push is scheduled; losing a pending push only loses the remote
/// copy, never the mutation.
pub struct DebouncedPusher {
    sink: Arc<dyn VaultSink>,
    window: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DebouncedPusher {
    pub fn new(sink: Arc<dyn VaultSink>) -> Self {
        Self::with_window(sink, PUSH_DEBOUNCE)
    }

    pub fn with_window(sink: Arc<dyn VaultSink>, window: Duration) -> Self {
        Self { sink, window, pending: None }
    }

    /// Arm a push for `state`, superseding any still-pending one.
    pub fn schedule(&mut self, state: AppState) {
        self.cancel();
        let sink = Arc::clone(&self.sink);
        let window = self.window;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Err(e) = sink.store(state).await {
                // Background sync: log only, never surface.
                log::warn!("background push failed: {e}");
            }
        }));
    }

    /// Drop the pending push without sending.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Push `state` right now, superseding any pending push. The error is
    /// returned so explicit save actions can show it.
    pub async fn flush(&mut self, state: AppState) -> Result<(), String> {
        self.cancel();
        self.sink.store(state).await
    }
}

impl Drop for DebouncedPusher {
    fn drop(&mut self) {
        self.cancel();
    }
}
