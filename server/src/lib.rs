//! # Runner Server Library
//!
//! Relay server for the multiplayer runner. It owns the authoritative player
//! registry and rebroadcasts every state change to the connected clients.
//!
//! ## Core Responsibilities
//!
//! ### Player Registry
//! Exactly one player entry exists per open connection. Entries are created
//! when a socket connects and removed when it closes, however it closes.
//!
//! ### Relay
//! Client actions (jump/slide key transitions) are applied and echoed to every
//! client, sender included. Client progress updates (`x`, `score`) are merged
//! without validation and forwarded to everyone else. Cheat prevention is out
//! of scope: the server trusts clients for these fields.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! Connection tasks only move frames between the socket and a channel. All
//! registry mutation happens on the main loop, one message at a time, so no
//! locks are needed and no two messages touch the same player concurrently.
//! Messages that name a player who has already disconnected are dropped.
//!
//! ### WebSocket + JSON
//! Each text frame is one `{"event", "data"}` object (see `shared::protocol`).
//! Upgrades are accepted from any origin.
//!
//! ## Module Organization
//!
//! - `registry`: the authoritative `PlayerRegistry`
//! - `relay`: maps lifecycle events and client messages to addressed
//!   outbound events
//! - `network`: sockets, per-connection tasks and the main loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("0.0.0.0:3001").await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod registry;
pub mod relay;
