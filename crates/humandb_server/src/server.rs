//! The accept loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tracing::{debug, info, warn};

use crate::connection::serve_connection;
use crate::context::ServerContext;
use crate::error::ServerResult;

/// The collection server.
///
/// Accepts connections and serves each one on its own task. Every task
/// shares the same [`ServerContext`].
///
/// # Example
///
/// ```no_run
/// use humandb_server::{Server, ServerConfig, ServerContext};
///
/// # async fn run() -> humandb_server::ServerResult<()> {
/// let context = ServerContext::load(ServerConfig::default())?;
/// let server = Server::bind(context).await?;
/// server.run_until_ctrl_c().await
/// # }
/// ```
pub struct Server {
    listener: TcpListener,
    context: Arc<ServerContext>,
}

impl Server {
    /// Bind to the configured address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(context: ServerContext) -> ServerResult<Self> {
        let listener = TcpListener::bind(context.config().bind_addr).await?;
        Ok(Self {
            listener,
            context: Arc::new(context),
        })
    }

    /// Address actually bound, useful with port 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket has no local address.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared state, for the operator console and for tests.
    pub fn context(&self) -> Arc<ServerContext> {
        Arc::clone(&self.context)
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already being served keep running on their own tasks.
    ///
    /// # Errors
    ///
    /// Currently never fails; accept errors are logged and skipped.
    pub async fn run_until<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let Server { listener, context } = self;
        if let Ok(addr) = listener.local_addr() {
            info!(addr = %addr, "server listening");
        }
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("server shutting down");
                    break;
                }
                accepted = listener.accept() => {
                    handle_accept_result(accepted, &context);
                }
            }
        }

        Ok(())
    }

    /// Accept connections until Ctrl-C.
    ///
    /// # Errors
    ///
    /// See [`Server::run_until`].
    pub async fn run_until_ctrl_c(self) -> ServerResult<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

fn handle_accept_result(
    result: std::io::Result<(TcpStream, SocketAddr)>,
    context: &Arc<ServerContext>,
) {
    match result {
        Ok((stream, peer)) => spawn_connection(stream, peer, context),
        Err(err) => warn!(error = ?err, "failed to accept connection"),
    }
}

fn spawn_connection(stream: TcpStream, peer: SocketAddr, context: &Arc<ServerContext>) {
    info!(peer = %peer, "client connected");
    let context = Arc::clone(context);
    tokio::spawn(async move {
        match serve_connection(stream, context).await {
            Ok(()) => debug!(peer = %peer, "connection finished"),
            Err(err) if err.is_disconnect() => {
                info!(peer = %peer, error = %err, "client dropped the connection")
            }
            Err(err) => warn!(peer = %peer, error = ?err, "connection closed with error"),
        }
    });
}
