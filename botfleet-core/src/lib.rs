//! botfleet-core: fleet reconciliation and command routing.
//!
//! Keeps a pool of nicknames, grows or shrinks a registry of bot handles to
//! a requested size, connects the ones that are offline, and routes user
//! text to a selected subset of them as chat or as commands. The network
//! side of each bot lives behind the [`bot::Bot`] trait; this crate does no
//! I/O of its own beyond reading the nickname source.

pub mod bot;
pub mod error;
pub mod fleet;
pub mod history;
pub mod nickname;
pub mod reconcile;
pub mod registry;
pub mod request;
pub mod router;

pub use bot::{Bot, BotFactory};
pub use error::FleetError;
pub use fleet::FleetService;
pub use history::InputHistory;
pub use nickname::NicknamePool;
pub use reconcile::ReconcileReport;
pub use registry::Registry;
pub use router::{CommandRequest, DispatchReport, Selector, COMMAND_PREFIX};

#[cfg(test)]
pub(crate) mod testing;
