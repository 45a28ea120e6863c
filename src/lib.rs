//! Networked Uno: an authoritative rules engine plus a multi-room relay.
//!
//! The [`game`] module owns the cards and the game state machine, [`room`]
//! tracks live rooms and routes commands into them, [`session`] runs one
//! task per room that serializes every mutation and broadcasts filtered
//! state snapshots, and [`protocol`] defines the JSON wire messages.

pub mod game;
pub mod protocol;
pub mod room;
pub mod session;
