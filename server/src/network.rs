//! Server network layer: WebSocket accept loop, per-connection tasks, and the
//! controlling loop that owns the relay

use crate::relay::Relay;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Events sent from connection tasks to the controlling loop
#[derive(Debug)]
pub enum ServerMessage {
    ConnectionOpened {
        client_id: u32,
        addr: SocketAddr,
        sender: mpsc::UnboundedSender<String>,
    },
    TextReceived {
        client_id: u32,
        text: String,
    },
    ConnectionClosed {
        client_id: u32,
    },
}

/// Relay server bound to a TCP listener
pub struct Server {
    listener: TcpListener,
    relay: Relay,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn bind(addr: &str) -> Result<Self, BoxError> {
        let listener = TcpListener::bind(addr).await?;
        info!("Relay listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            relay: Relay::new(),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Spawns the task that accepts TCP connections and hands each one to
    /// its own connection task
    fn spawn_acceptor(listener: TcpListener, server_tx: mpsc::UnboundedSender<ServerMessage>) {
        tokio::spawn(async move {
            let mut next_client_id: u32 = 1;

            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let client_id = next_client_id;
                        next_client_id += 1;
                        tokio::spawn(handle_connection(
                            stream,
                            addr,
                            client_id,
                            server_tx.clone(),
                        ));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Main relay loop. All registry mutation happens here, one event at a time.
    pub async fn run(self) -> Result<(), BoxError> {
        let Server {
            listener,
            mut relay,
            server_tx,
            mut server_rx,
        } = self;

        Self::spawn_acceptor(listener, server_tx);

        info!("Relay started successfully");

        while let Some(message) = server_rx.recv().await {
            match message {
                ServerMessage::ConnectionOpened {
                    client_id,
                    addr,
                    sender,
                } => {
                    relay.on_accept(client_id, addr, sender);
                }
                ServerMessage::TextReceived { client_id, text } => {
                    relay.on_message(client_id, &text);
                }
                ServerMessage::ConnectionClosed { client_id } => {
                    relay.on_disconnect(client_id);
                }
            }
        }

        info!("Relay shutting down");
        Ok(())
    }
}

/// Performs the WebSocket handshake, then pumps frames in both directions
/// until either side closes.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    client_id: u32,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let (sender, mut outbound) = mpsc::unbounded_channel::<String>();

    if server_tx
        .send(ServerMessage::ConnectionOpened {
            client_id,
            addr,
            sender,
        })
        .is_err()
    {
        error!("Relay loop is gone, dropping connection {}", client_id);
        return;
    }

    // Writer ends when the registry drops the sender or the socket fails
    tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = write.send(Message::Text(text)).await {
                debug!("Send to client {} failed: {}", client_id, e);
                break;
            }
        }
        outbound.close();
    });

    while let Some(frame) = read.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    debug!("Ignoring non-UTF-8 binary frame from client {}", client_id);
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!("Read from client {} failed: {}", client_id, e);
                break;
            }
        };

        if server_tx
            .send(ServerMessage::TextReceived { client_id, text })
            .is_err()
        {
            break;
        }
    }

    let _ = server_tx.send(ServerMessage::ConnectionClosed { client_id });
}
