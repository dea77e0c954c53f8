//! Background directory refresh
//!
//! Reloads the clinic directory when the network comes back and, optionally,
//! on a fixed interval. Progress is reported over a tokio channel.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Interval;

use crate::directory::{DirectoryLoader, LoadOrigin};
use crate::network::OnlineStatus;

/// Shortest period a periodic reload will tick at
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Messages sent from the background refresh to its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMessage {
    /// Refresh started
    RefreshStarted,
    /// Refresh completed with the working set from `origin`
    RefreshCompleted { origin: LoadOrigin },
}

/// Configuration for the background refresh
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between periodic reloads, clamped to [`MIN_REFRESH_INTERVAL`]
    pub interval: Duration,
    /// Whether periodic reloads are enabled
    pub periodic: bool,
    /// Whether to reload when the network comes back online
    pub reload_on_reconnect: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1800), // 30 minutes
            periodic: true,
            reload_on_reconnect: true,
        }
    }
}

/// Handle for controlling the background refresh task
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    /// Signals the task to stop
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the refresh task
    ///
    /// # Arguments
    /// * `loader` - Loader to refresh
    /// * `status` - Reachability signal to watch for reconnects
    /// * `config` - When to refresh
    pub fn spawn(
        loader: Arc<DirectoryLoader>,
        status: &OnlineStatus,
        config: RefreshConfig,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let mut online_rx = status.subscribe();

        tokio::spawn(async move {
            let mut interval = config.periodic.then(|| {
                let mut interval =
                    tokio::time::interval(config.interval.max(MIN_REFRESH_INTERVAL));
                // Skip the first tick (immediate)
                interval.reset();
                interval
            });
            let mut watching = config.reload_on_reconnect;

            loop {
                tokio::select! {
                    _ = next_tick(&mut interval) => {
                        reload(&loader, &msg_tx).await;
                    }
                    changed = online_rx.changed(), if watching => {
                        match changed {
                            Ok(()) => {
                                if *online_rx.borrow_and_update() {
                                    reload(&loader, &msg_tx).await;
                                }
                            }
                            // Status dropped, no more transitions will arrive
                            Err(_) => watching = false,
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Shuts down the background refresh task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Waits for the next periodic tick, or forever when periodic reloads are off
async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn reload(loader: &DirectoryLoader, tx: &mpsc::Sender<RefreshMessage>) {
    let _ = tx.send(RefreshMessage::RefreshStarted).await;
    let origin = loader.load_directory().await;
    let _ = tx.send(RefreshMessage::RefreshCompleted { origin }).await;
}

/// Checks for pending refresh messages without blocking
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
