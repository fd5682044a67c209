//! Module `handler`
//!
//! Owns the full lifecycle of one WebSocket session: handshake, registration,
//! message relay, and deregistration on every exit path.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::config::ServerConfig;
use crate::connection::registry::SharedRegistry;
use crate::connection::state::{Connection, ConnectionId, SessionState};
use crate::error::SessionError;
use crate::relay;

/// Removes the connection from the registry when dropped.
///
/// Wrapping the session loop in this guard makes deregistration run exactly
/// once on every exit path: clean close, transport error, or cancellation
/// of the session task.
struct RegistryGuard {
    registry: SharedRegistry,
    conn: Connection,
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        self.conn.set_state(SessionState::Closing);
        if let Ok(mut registry) = self.registry.lock() {
            registry.unregister(self.conn.id());
        }
        self.conn.set_state(SessionState::Closed);
        info!(
            "Client disconnected: {} ({})",
            self.conn.id(),
            self.conn.peer_addr()
        );
    }
}

/// Handles one WebSocket session from handshake to close.
///
/// - Performs the WebSocket handshake on the accepted TCP stream.
/// - Rejects the connection with a close frame when the server is full.
/// - Registers the connection, then relays every inbound text frame to the
///   current registry snapshot (sender included).
/// - Deregisters the connection however the loop exits.
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    registry: SharedRegistry,
    config: Arc<ServerConfig>,
) -> Result<(), SessionError> {
    let ws_stream = accept_async(stream).await.map_err(SessionError::Handshake)?;
    let (mut ws_sink, mut ws_source) = ws_stream.split();

    let at_capacity = {
        let registry = registry.lock().unwrap();
        registry.len() >= config.max_clients
    };
    if at_capacity {
        warn!("Rejecting connection from {}: server full", peer_addr);
        let _ = ws_sink
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Again,
                reason: "too many connections".into(),
            })))
            .await;
        return Ok(());
    }

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(config.outbound_queue_size);

    // Writer task drains the outbound queue into the sink, so broadcasts
    // enqueue without ever waiting on this peer's socket.
    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_sink.send(frame).await.is_err() {
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    let id = ConnectionId::next();
    let mut conn = Connection::new(id, peer_addr, outbound_tx);
    conn.set_state(SessionState::Active);

    {
        let mut registry = registry.lock().unwrap();
        registry.register(conn.clone());
    }
    info!("Client connected: {} ({})", id, peer_addr);

    let _guard = RegistryGuard {
        registry: Arc::clone(&registry),
        conn,
    };

    let mut session_result = Ok(());

    while let Some(frame) = ws_source.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if text.len() > config.max_message_bytes {
                    warn!(
                        "Dropping oversized message from client {} ({} bytes)",
                        id,
                        text.len()
                    );
                    continue;
                }

                let payload = format!("{} from {}", text.as_str(), id);
                info!("Message received: {}", payload);

                let snapshot = {
                    let registry = registry.lock().unwrap();
                    registry.snapshot()
                };
                let outcome = relay::broadcast(&snapshot, &payload);
                if !outcome.is_complete() {
                    warn!(
                        "Relay from client {} reached {}/{} recipients",
                        id,
                        outcome.delivered,
                        snapshot.len()
                    );
                }
            }
            Ok(Message::Close(_)) => {
                info!("Close frame received from client {}", id);
                break;
            }
            // Ping/pong and binary frames are not part of the relay protocol
            Ok(_) => continue,
            Err(e) => match SessionError::from(e) {
                SessionError::ConnectionClosed => {
                    info!("Connection lost with client {}", id);
                    break;
                }
                err => {
                    error!("Transport error on client {}: {}", id, err);
                    session_result = Err(err);
                    break;
                }
            },
        }
    }

    session_result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::registry::ConnectionRegistry;
    use std::sync::Mutex;

    fn test_conn() -> Connection {
        let (tx, _rx) = mpsc::channel(1);
        Connection::new(ConnectionId::next(), "127.0.0.1:9999".parse().unwrap(), tx)
    }

    #[test]
    fn guard_unregisters_on_drop() {
        let registry: SharedRegistry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let conn = test_conn();
        registry.lock().unwrap().register(conn.clone());
        assert_eq!(registry.lock().unwrap().len(), 1);

        let guard = RegistryGuard {
            registry: Arc::clone(&registry),
            conn,
        };
        drop(guard);

        assert!(registry.lock().unwrap().is_empty());
    }

    #[test]
    fn guard_tolerates_connection_already_gone() {
        let registry: SharedRegistry = Arc::new(Mutex::new(ConnectionRegistry::new()));
        let conn = test_conn();
        let other = test_conn();
        registry.lock().unwrap().register(other.clone());

        // Never registered; dropping the guard must not disturb other members
        let guard = RegistryGuard {
            registry: Arc::clone(&registry),
            conn,
        };
        drop(guard);

        assert_eq!(registry.lock().unwrap().len(), 1);
        assert_eq!(registry.lock().unwrap().snapshot()[0].id(), other.id());
    }
}
