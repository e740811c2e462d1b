//! Relay rules: who receives what
//!
//! The relay has no game knowledge. It only looks at the `type` field to
//! recognise `join` frames; everything else that parses as JSON is forwarded
//! verbatim to the other peers.

use crate::client_manager::ClientManager;
use log::{debug, error, info};
use shared::Message;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// How an inbound text frame is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Not JSON; dropped without reply
    Malformed,
    /// Liveness announcement; never forwarded
    Join,
    /// Anything else; forwarded unmodified
    Forward,
}

pub fn classify(text: &str) -> Inbound {
    match serde_json::from_str::<serde_json::Value>(text) {
        Err(_) => Inbound::Malformed,
        Ok(value) => match value.get("type").and_then(|kind| kind.as_str()) {
            Some("join") => Inbound::Join,
            _ => Inbound::Forward,
        },
    }
}

/// Connection-level state machine of the relay, driven by one task
pub struct Relay {
    clients: ClientManager,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            clients: ClientManager::new(),
        }
    }

    /// Registers a new connection and tells everybody, the newcomer
    /// included, the new count. Returns how many connections were notified.
    pub fn on_accept(
        &mut self,
        client_id: u32,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<String>,
    ) -> usize {
        if !self.clients.add_client(client_id, addr, sender) {
            error!("Connection id {} registered twice", client_id);
            return 0;
        }
        self.broadcast_player_count()
    }

    /// Applies the forwarding rule to one inbound frame.
    /// Returns the number of peers the frame was delivered to.
    pub fn on_message(&mut self, client_id: u32, text: &str) -> usize {
        if !self.clients.contains(&client_id) {
            debug!("Frame from unregistered connection {} ignored", client_id);
            return 0;
        }

        match classify(text) {
            Inbound::Malformed => {
                debug!("Dropping non-JSON frame from client {}", client_id);
                0
            }
            Inbound::Join => {
                debug!("Client {} announced itself", client_id);
                0
            }
            Inbound::Forward => {
                let delivered = self.clients.broadcast_except(client_id, text);
                debug!(
                    "Forwarded {} bytes from client {} to {} peers",
                    text.len(),
                    client_id,
                    delivered
                );
                delivered
            }
        }
    }

    /// Forgets a connection and tells the remaining ones the new count.
    pub fn on_disconnect(&mut self, client_id: u32) -> usize {
        if !self.clients.remove_client(&client_id) {
            return 0;
        }
        self.broadcast_player_count()
    }

    pub fn connection_count(&self) -> usize {
        self.clients.len()
    }

    fn broadcast_player_count(&self) -> usize {
        let count = self.clients.len();
        match (Message::PlayerCount { count }).to_json() {
            Ok(text) => {
                info!("{} connection(s) open", count);
                self.clients.broadcast(&text)
            }
            Err(e) => {
                error!("Failed to encode player count: {}", e);
                0
            }
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}
