//! Signal handling for graceful shutdown
//!
//! One broadcast channel carries the shutdown signal for a whole run. The
//! listener task translates CTRL-C or SIGTERM into a single broadcast; the
//! coordinator and the download workers each hold a receiver and finish
//! their current step before stopping.

use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

/// Create the shutdown broadcast channel for a run
pub fn create_shutdown_channel() -> (broadcast::Sender<()>, broadcast::Receiver<()>) {
    broadcast::channel(1)
}

/// Listen for CTRL-C or SIGTERM and broadcast one shutdown signal
pub fn spawn_signal_listener(shutdown_tx: broadcast::Sender<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Ctrl+C received, finishing the current step before stopping");
            }
            _ = terminate => {
                info!("SIGTERM received, finishing the current step before stopping");
            }
        }

        let _ = shutdown_tx.send(());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Signals sent on the channel reach a subscriber
    #[tokio::test]
    async fn test_shutdown_channel_delivers() {
        let (tx, mut rx) = create_shutdown_channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(());
        });

        let result = timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(result.is_ok());
    }

    /// Every subscriber sees the same single signal
    #[tokio::test]
    async fn test_all_subscribers_notified() {
        let (tx, _rx) = create_shutdown_channel();
        let mut rx1 = tx.subscribe();
        let mut rx2 = tx.subscribe();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(());
        });

        assert!(timeout(Duration::from_millis(200), rx1.recv()).await.is_ok());
        assert!(timeout(Duration::from_millis(200), rx2.recv()).await.is_ok());
    }
}
