//! Connection registry for the relay
//!
//! This module tracks every open WebSocket connection together with the
//! outbound channel its writer task drains. It is owned by the relay's single
//! controlling task, so it needs no locking of its own.
//!
//! Delivery is best effort: a connection whose writer has already gone away
//! is skipped and never retried.

use log::{debug, info};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// A connected peer and the channel feeding its socket writer
#[derive(Debug)]
pub struct Client {
    /// Connection identifier assigned by the acceptor
    pub id: u32,
    /// Remote address, kept for logging
    pub addr: SocketAddr,
    /// When the WebSocket handshake completed
    pub connected_at: Instant,
    sender: mpsc::UnboundedSender<String>,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a text frame for this connection.
    ///
    /// Returns false when the writer side is already closed; the frame is
    /// dropped in that case.
    pub fn send(&self, text: &str) -> bool {
        self.sender.send(text.to_string()).is_ok()
    }

    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Registry of all open connections
///
/// Exposes add/remove plus the two fan-out shapes the relay needs: to
/// everybody, and to everybody except the sender.
pub struct ClientManager {
    clients: HashMap<u32, Client>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Registers a connection. Returns false if the id is already taken.
    pub fn add_client(
        &mut self,
        id: u32,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<String>,
    ) -> bool {
        if self.clients.contains_key(&id) {
            return false;
        }

        info!("Client {} connected from {}", id, addr);
        self.clients.insert(id, Client::new(id, addr, sender));
        true
    }

    /// Removes a connection, returning true if it was registered
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!(
                "Client {} disconnected after {:.1}s",
                client.id,
                client.uptime().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    /// Sends a frame to every open connection. Returns how many accepted it.
    pub fn broadcast(&self, text: &str) -> usize {
        self.clients
            .values()
            .filter(|client| client.is_open())
            .filter(|client| client.send(text))
            .count()
    }

    /// Sends a frame to every open connection except `exclude`.
    /// Returns how many accepted it.
    pub fn broadcast_except(&self, exclude: u32, text: &str) -> usize {
        let mut delivered = 0;

        for client in self.clients.values() {
            if client.id == exclude {
                continue;
            }

            if client.is_open() && client.send(text) {
                delivered += 1;
            } else {
                debug!("Skipping closed connection {}", client.id);
            }
        }

        delivered
    }

    pub fn contains(&self, client_id: &u32) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}
