//! # Tile Duel Client Library
//!
//! Client side of a two-player tile-placement duel. There is no authoritative
//! server: every client keeps its own full copy of the match, applies its own
//! moves locally, and replicates the complete state to its peers through a
//! relay after each change.
//!
//! ## Replication Model
//!
//! ### Whole-State, Last Writer Wins
//! After a local start, placement, or timeout finish, the client broadcasts
//! the entire match. A peer that receives it overwrites its own copy and
//! drops any tile selection in progress. Nothing is merged; two clients
//! mutating between broadcasts would lose one update. The turn order is what
//! prevents that in practice.
//!
//! ### Roles From Connection Order
//! The relay reports the number of open connections. The first count a
//! session sees decides its role for the lifetime of the connection: one
//! means left, two means right, anything else means spectator.
//!
//! ### Independent Clocks
//! Every client ticks the running clock once per second. Only the client
//! whose side is on turn may end the match on timeout; the others count down
//! for display and learn about the finish through replication.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The match state machine: start, select, place, tick, finish, reset, and
//! snapshot application.
//!
//! ### Role Module (`role`)
//! Role derivation from the connection count, assigned once.
//!
//! ### Replication Module (`replication`)
//! Frame encoding, echo filtering, and wholesale snapshot application.
//!
//! ### Timer Module (`timer`)
//! The periodic driver and the rule for who may finish on timeout.
//!
//! ### Session Module (`session`)
//! Owns all of the above and turns events into outbound frames.
//!
//! ### Input, Rendering and Network Modules
//! Terminal commands, a text view of the match, and the WebSocket event loop.
//!
//! ## Usage Example
//!
//! ```rust
//! use client::input::Command;
//! use client::session::{Event, Session};
//!
//! let mut session = Session::new("my-id");
//! session.handle(Event::ServerText(r#"{"type":"playerCount","count":1}"#.to_string()));
//! session.handle(Event::ServerText(r#"{"type":"playerCount","count":2}"#.to_string()));
//!
//! // Starting produces one state frame to push through the relay
//! let update = session.handle(Event::Command(Command::Start));
//! assert_eq!(update.frames.len(), 1);
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod replication;
pub mod role;
pub mod session;
pub mod timer;
