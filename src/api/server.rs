//! HTTP server lifecycle.
//!
//! Binds the listen address, mounts `queue_api_router()`, and runs the
//! axum server in a background task. Shutdown goes through a oneshot
//! channel so in-flight requests drain gracefully.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::queue_api_router;
use crate::state::AppState;

/// Handle to a running queue API server.
pub struct QueueServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl QueueServer {
    /// The address the server actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Queue API server shutdown signal sent");
        }
    }
}

/// Bind the address and spawn the server in a background tokio task.
pub async fn start_server(
    state: Arc<AppState>,
    addr: SocketAddr,
) -> Result<QueueServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let app = queue_api_router(state);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Queue API server received shutdown signal");
        };

        tracing::info!(%local_addr, "Queue API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Queue API server error: {e}");
        }

        tracing::info!("Queue API server stopped");
    });

    Ok(QueueServer {
        local_addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> (Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(AppState::new(dir.path().join("queue.db")));
        state.open_db().unwrap();
        (state, dir)
    }

    fn loopback_ephemeral() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let (state, _dir) = test_state();
        let mut server = start_server(state, loopback_ephemeral())
            .await
            .expect("server should start");

        assert!(server.local_addr().port() > 0);

        let url = format!("http://{}/api/health", server.local_addr());
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.shutdown();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn server_serves_queue_routes() {
        let (state, _dir) = test_state();
        let mut server = start_server(state, loopback_ephemeral())
            .await
            .expect("server should start");
        let addr = server.local_addr();

        let resp = reqwest::get(format!("http://{addr}/api/queue/counts"))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let resp = reqwest::get(format!("http://{addr}/nonexistent"))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (state, _dir) = test_state();
        let mut server = start_server(state, loopback_ephemeral())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}
