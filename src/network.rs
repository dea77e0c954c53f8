//! Network reachability signal
//!
//! The directory loader only needs a boolean at call time. `OnlineStatus`
//! also publishes transitions so background tasks can react when the
//! connection comes back.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};

/// Shortest period the reachability monitor will probe at
pub const MIN_PROBE_PERIOD: Duration = Duration::from_millis(1);

/// Each probe gets at least this long to connect, however short the period
const MIN_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Anything that can report whether the network is reachable right now
pub trait Reachability: Send + Sync {
    fn is_reachable(&self) -> bool;
}

impl Reachability for bool {
    fn is_reachable(&self) -> bool {
        *self
    }
}

/// Shared online/offline flag with change notifications
#[derive(Debug, Clone)]
pub struct OnlineStatus {
    sender: Arc<watch::Sender<bool>>,
}

impl OnlineStatus {
    /// Creates a status with the given initial state
    pub fn new(online: bool) -> Self {
        let (sender, _) = watch::channel(online);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current state
    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Records a new state, notifying subscribers only if it changed
    ///
    /// # Returns
    /// `true` if the state flipped
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            if online {
                tracing::info!("network is now online");
            } else {
                tracing::info!("network is now offline");
            }
        }
        changed
    }

    /// Subscribes to state changes
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    /// Spawns a task that probes `addr` every `period` and updates the status
    ///
    /// `period` is clamped to [`MIN_PROBE_PERIOD`]. The task stops when the
    /// returned sender is dropped or sent to.
    pub fn spawn_monitor(&self, addr: String, period: Duration) -> mpsc::Sender<()> {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        let status = self.clone();
        let period = period.max(MIN_PROBE_PERIOD);
        let probe_timeout = period.max(MIN_PROBE_TIMEOUT);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        status.set_online(probe(&addr, probe_timeout).await);
                    }
                    _ = stop_rx.recv() => break,
                }
            }
        });

        stop_tx
    }
}

impl Reachability for OnlineStatus {
    fn is_reachable(&self) -> bool {
        self.is_online()
    }
}

/// Host and port to probe for a directory endpoint URL
pub fn probe_target(url: &str) -> Option<String> {
    let url = reqwest::Url::parse(url).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}

/// Attempts a TCP connection to `addr` within `timeout`
pub async fn probe(addr: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_bool_reachability() {
        assert!(true.is_reachable());
        assert!(!false.is_reachable());
    }

    #[test]
    fn test_set_online_reports_changes_only() {
        let status = OnlineStatus::new(false);

        assert!(!status.is_reachable());
        assert!(status.set_online(true));
        assert!(!status.set_online(true), "Same state should not count as a change");
        assert!(status.is_reachable());
    }

    #[test]
    fn test_probe_target_from_url() {
        assert_eq!(
            probe_target("https://data.example.org/clinics.json").as_deref(),
            Some("data.example.org:443")
        );
        assert_eq!(
            probe_target("http://127.0.0.1:8080/clinics").as_deref(),
            Some("127.0.0.1:8080")
        );
        assert!(probe_target("not a url").is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let status = OnlineStatus::new(false);
        let mut rx = status.subscribe();

        status.set_online(true);

        rx.changed().await.expect("Sender should still be alive");
        assert!(*rx.borrow_and_update());
    }

    #[tokio::test]
    async fn test_probe_open_and_closed_ports() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        assert!(probe(&addr, Duration::from_secs(1)).await);

        drop(listener);
        assert!(!probe(&addr, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_monitor_marks_status_online() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let status = OnlineStatus::new(false);
        let mut rx = status.subscribe();

        let stop = status.spawn_monitor(addr, Duration::from_millis(50));

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("Monitor should report within 5s")
            .unwrap();
        assert!(status.is_online());

        let _ = stop.send(()).await;
    }

    #[tokio::test]
    async fn test_monitor_with_zero_period_keeps_running() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let status = OnlineStatus::new(false);
        let mut rx = status.subscribe();

        let stop = status.spawn_monitor(addr, Duration::ZERO);

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("Monitor should report within 5s")
            .unwrap();
        assert!(status.is_online());
        assert!(!stop.is_closed(), "Monitor task should still be alive");

        let _ = stop.send(()).await;
    }
}
