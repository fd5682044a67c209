use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::connection::ConnectionRegistry;
use crate::connection::SharedRegistry;
use crate::connection::handle_connection;
use crate::error::RelayServerError;

pub struct Server {
    registry: SharedRegistry,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listener on the configured address.
    pub async fn new(config: ServerConfig) -> Result<Self, RelayServerError> {
        let addr = config.listen_addr();

        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(RelayServerError::IoError(e));
            }
        };

        Ok(Self {
            registry: Arc::new(Mutex::new(ConnectionRegistry::new())),
            listener,
            config: Arc::new(config),
        })
    }

    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, RelayServerError> {
        self.listener.local_addr().map_err(RelayServerError::IoError)
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.registry.lock().unwrap().len()
    }

    /// Accepts connections until the process is terminated.
    pub async fn start(&self) {
        info!(
            "Chat relay started on ws://{} (max {} clients)",
            self.config.listen_addr(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    let registry = Arc::clone(&self.registry);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so the accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, peer_addr, registry, config).await
                        {
                            warn!("Session with {} ended with error: {}", peer_addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}
