pub mod cards;
pub mod state;
pub use cards::*;
pub use state::{Direction, GameError, GameState, PlayerId, MAX_PLAYERS, MIN_PLAYERS};
