//! botfleet-sdk: a small IRC client that backs each bot in the fleet.
//!
//! [`client`] runs one session per bot (registration, keepalive, nick
//! collisions) in its own tokio task and emits [`event::Event`]s.
//! [`bot::IrcBot`] wraps a session behind the `botfleet_core::Bot` trait so
//! the fleet core can drive it without knowing anything about the wire.

pub mod bot;
pub mod client;
pub mod event;
pub mod irc;

pub use bot::{IrcBot, IrcBotFactory};
