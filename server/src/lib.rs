//! # Relay Server Library
//!
//! A message relay for two-player tile duels. The relay knows nothing about
//! the game: clients replicate their full match state to each other through
//! it, and the relay only forwards frames and reports how many peers are
//! connected so that clients can work out their own roles.
//!
//! ## Forwarding Rules
//!
//! - A new connection makes the relay broadcast `playerCount` to every
//!   connection, the new one included.
//! - A `join` frame is a liveness announcement and is never forwarded.
//! - Any other JSON frame is forwarded unmodified to every other open
//!   connection. The sender never receives its own frame.
//! - Frames that are not JSON are dropped without a reply.
//! - A closed connection makes the relay broadcast the new count to the
//!   remaining ones.
//!
//! Delivery is best effort. There is no queueing, no retry and no ordering
//! beyond what each WebSocket connection provides.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Registry of open connections and the fan-out helpers used by the relay.
//!
//! ### Relay Module (`relay`)
//! Classification of inbound frames and the accept/message/disconnect rules.
//!
//! ### Network Module (`network`)
//! WebSocket accept loop, per-connection reader and writer tasks, and the
//! single controlling loop that owns the relay state.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), server::network::BoxError> {
//!     let server = Server::bind("127.0.0.1:3000").await?;
//!     server.run().await
//! }
//! ```

pub mod client_manager;
pub mod network;
pub mod relay;
