/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::Client;

/// Request routing
pub mod router;

/// Address the gateway listens on unless configured otherwise
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

const ACCEPT_BACKOFF_INITIAL: Duration = Duration::from_millis(10);
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Delay before accepting again after `failures` consecutive accept errors.
///
/// Errors like `EMFILE` persist until connections close, so retrying immediately would spin.
fn accept_backoff(failures: u32) -> Duration {
    let exp = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_INITIAL
        .saturating_mul(1 << exp)
        .min(ACCEPT_BACKOFF_MAX)
}

/// Result type for server lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors starting or stopping the HTTP server.
///
/// Request level failures never surface here; they are rendered into responses.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The listen address could not be parsed
    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    /// The listener could not be bound
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// Address we tried to bind
        addr: SocketAddr,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The server was built without everything it needs
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server task panicked or was cancelled
    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on. Port `0` picks an available port.
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Handle for a running gateway server.
#[derive(Debug)]
pub struct ServerHandle {
    address: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    server_task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// Get the address the server is listening on
    pub fn socket_addr(&self) -> SocketAddr {
        self.address
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        self.server_task.await?
    }
}

/// Builder for [`GatewayServer`].
#[derive(Debug, Default)]
pub struct GatewayServerBuilder {
    config: ServerConfig,
    client: Option<Client>,
}

impl GatewayServerBuilder {
    /// Address to listen on.
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.config.listen = addr;
        self
    }

    /// Address to listen on, parsed from `host:port`.
    pub fn listen_str(self, addr: &str) -> Result<Self> {
        let addr = addr
            .parse()
            .map_err(|_| Error::InvalidAddress(addr.to_owned()))?;
        Ok(self.listen(addr))
    }

    /// Gateway client requests are served with.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the server.
    pub fn build(self) -> Result<GatewayServer> {
        let client = self.client.ok_or_else(|| {
            Error::InvalidConfiguration("a gateway client must be specified".to_owned())
        })?;

        Ok(GatewayServer {
            config: self.config,
            client,
        })
    }
}

/// HTTP front end of the gateway.
#[derive(Debug)]
pub struct GatewayServer {
    config: ServerConfig,
    client: Client,
}

impl GatewayServer {
    /// Create a new [`GatewayServerBuilder`].
    pub fn builder() -> GatewayServerBuilder {
        GatewayServerBuilder::default()
    }

    /// Bind the listener and start serving requests in the background.
    pub async fn start(&self) -> Result<ServerHandle> {
        let addr = self.config.listen;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let addr = listener.local_addr()?;

        tracing::info!("Server started on {addr}");
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let client = self.client.clone();
        let server_task = tokio::spawn(async move {
            let http_server = ConnBuilder::new(TokioExecutor::new());
            let graceful = hyper_util::server::graceful::GracefulShutdown::new();

            let mut accept_failures: u32 = 0;
            loop {
                let (socket, peer) = tokio::select! {
                    res = listener.accept() => {
                        match res {
                            Ok(conn) => {
                                accept_failures = 0;
                                conn
                            }
                            Err(err) => {
                                accept_failures = accept_failures.saturating_add(1);
                                let delay = accept_backoff(accept_failures);
                                tracing::error!(
                                    "error accepting connection, retrying in {delay:?}: {err}"
                                );
                                tokio::select! {
                                    () = tokio::time::sleep(delay) => continue,
                                    _ = &mut shutdown_rx => break,
                                }
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        break;
                    }
                };

                let client = client.clone();
                let service = service_fn(move |req: Request<Incoming>| {
                    let client = client.clone();
                    async move { Ok::<_, Infallible>(router::route(&client, req).await) }
                });

                let conn = http_server.serve_connection(TokioIo::new(socket), service);
                let conn = graceful.watch(conn.into_owned());
                tokio::spawn(async move {
                    if let Err(err) = conn.await {
                        tracing::debug!("connection from {peer} closed with error: {err}");
                    }
                });
            }

            tokio::select! {
                () = graceful.shutdown() => {
                    tracing::debug!("all connections closed");
                },
                () = tokio::time::sleep(GRACEFUL_SHUTDOWN_TIMEOUT) => {
                    tracing::warn!("waited {GRACEFUL_SHUTDOWN_TIMEOUT:?} for connections to close, aborting");
                }
            }

            tracing::info!("server is stopped");
            Ok(())
        });

        Ok(ServerHandle {
            address: addr,
            shutdown_tx,
            server_task,
        })
    }
}
