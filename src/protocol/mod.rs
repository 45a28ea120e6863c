pub mod client2server;
pub mod server2client;
pub use client2server::ClientMessage;
pub use server2client::{GameStateView, HandCount, ServerMessage};
