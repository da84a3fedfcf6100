//! # Runner Client Library
//!
//! Client side of the multiplayer runner: a local replica of every player,
//! kept in sync with the relay server, plus the loops that move the local
//! player and animate jumps.
//!
//! ## Architecture Overview
//!
//! ### Optimistic Local State
//! Key presses update the local player's replica immediately and are sent to
//! the server at the same time. The server echoes actions to every client, the
//! sender included; applying the echo is idempotent.
//!
//! ### Relay-Driven Remote State
//! Remote players change only through server events: snapshot, join, action,
//! progress update and disconnect. Late events for a player that already left
//! are ignored.
//!
//! ### Fixed-Timestep Jumps
//! Jumps are integrated at 60 Hz regardless of the display rate. Every client
//! animates every jump it hears about, remote players included, so jumps look
//! the same everywhere without the server simulating anything.
//!
//! ## Module Organization
//!
//! - `store`: copy-on-write replica of the player mapping
//! - `animator`: pure jump step and the per-player jump scheduler
//! - `input`: keyboard mapping and press/release edge detection
//! - `progress`: fixed-interval clock for horizontal progress
//! - `game`: the `Session` tying the pieces together
//! - `network`: background WebSocket connection
//! - `rendering`: macroquad drawing
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::Session;
//! use client::network::{NetworkEvent, NetworkHandle};
//! use std::time::Duration;
//!
//! let mut network = NetworkHandle::spawn("ws://127.0.0.1:3001")?;
//! let mut session = Session::new();
//!
//! loop {
//!     for event in network.poll() {
//!         match event {
//!             NetworkEvent::Server(event) => session.handle_event(event),
//!             NetworkEvent::Closed(_) => session.end(),
//!         }
//!     }
//!     for message in session.update(Duration::from_millis(16)) {
//!         network.send(message);
//!     }
//!     # break;
//! }
//! # Ok::<(), client::network::NetworkError>(())
//! ```

pub mod animator;
pub mod game;
pub mod input;
pub mod network;
pub mod progress;
pub mod rendering;
pub mod store;
