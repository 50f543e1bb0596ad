//! HTTP listener serving the replay coordinator
//!
//! Each accepted connection runs on its own task; hyper dispatches each
//! request on that connection into the coordinator. When the coordinator
//! reports a simulated network failure the service returns an error, which
//! makes hyper tear the connection down without writing a status line.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::replay::ReplayCoordinator;
use crate::Result;

use super::SHUTDOWN_TIMEOUT_MS;

/// HTTP front end that replays recorded traffic to live clients
pub struct ReplayServer {
    coordinator: Arc<ReplayCoordinator>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ReplayServer {
    /// Create a server around a coordinator
    #[must_use]
    pub fn new(coordinator: ReplayCoordinator) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            coordinator: Arc::new(coordinator),
            shutdown_tx,
        }
    }

    /// Handle for triggering shutdown from another task
    #[must_use]
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Bind the given port on all interfaces and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be bound
    pub async fn run(self, port: u16) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener until ctrl-c or shutdown signal
    ///
    /// # Errors
    ///
    /// Returns error if the listener's local address cannot be read
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        info!("HAR replay server listening on http://{addr}");

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let shutdown = async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("received SIGINT, shutting down");
                }
                _ = shutdown_rx.recv() => {
                    info!("received shutdown signal");
                }
            }
        };
        tokio::pin!(shutdown);

        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            debug!("accepted connection from {peer_addr}");
                            let coordinator = Arc::clone(&self.coordinator);

                            connections.spawn(async move {
                                let io = TokioIo::new(stream);
                                let service = service_fn(move |request: Request<Incoming>| {
                                    let coordinator = Arc::clone(&coordinator);
                                    async move {
                                        coordinator.handle(
                                            request.method().as_str(),
                                            request.uri().path(),
                                        )
                                    }
                                });

                                if let Err(e) =
                                    http1::Builder::new().serve_connection(io, service).await
                                {
                                    // expected for simulated-failure entries
                                    debug!("connection from {peer_addr} ended: {e}");
                                }
                            });
                        }
                        Err(e) => {
                            error!("accept error: {e}");
                        }
                    }
                }
                Some(result) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = result {
                        warn!("connection task failed: {e}");
                    }
                }
            }
        }

        // Drain in-flight connections with a bounded grace period
        let shutdown_timeout = Duration::from_millis(SHUTDOWN_TIMEOUT_MS);
        tokio::time::timeout(shutdown_timeout, async {
            while connections.join_next().await.is_some() {}
        })
        .await
        .ok();

        info!("shutdown complete");
        Ok(())
    }
}
