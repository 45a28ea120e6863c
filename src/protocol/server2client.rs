use serde::{Deserialize, Serialize};

use crate::game::cards::{Card, Color};
use crate::game::state::GameState;

/// Outbound wire messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "ROOM_CREATED", rename_all = "camelCase")]
    RoomCreated { room_code: String, player_id: String },
    #[serde(rename = "ROOM_JOINED", rename_all = "camelCase")]
    RoomJoined {
        room_code: String,
        player_id: String,
        player_count: usize,
        player_list: Vec<String>,
    },
    #[serde(rename = "PLAYER_JOINED", rename_all = "camelCase")]
    PlayerJoined {
        player_id: String,
        player_count: usize,
        player_list: Vec<String>,
    },
    #[serde(rename = "PLAYER_LEFT", rename_all = "camelCase")]
    PlayerLeft {
        player_id: String,
        player_count: usize,
        player_list: Vec<String>,
    },
    #[serde(rename = "GAME_STARTED")]
    GameStarted { message: String },
    #[serde(rename = "GAME_STATE_UPDATE", rename_all = "camelCase")]
    GameStateUpdate { game_state: GameStateView },
    #[serde(rename = "GAME_OVER")]
    GameOver { winner: String, message: String },
    #[serde(rename = "ERROR")]
    Error { message: String },
}

/// Another player's hand, collapsed to its size so no cards leak between
/// clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandCount {
    pub player_id: String,
    pub count: usize,
}

/// What one recipient is allowed to see of a game: their own hand in full,
/// everyone else as a count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub player_hand: Vec<Card>,
    pub others: Vec<HandCount>,
    pub discard_pile: Vec<Card>,
    pub current_color: Color,
    pub current_player_index: usize,
    /// `+1` clockwise, `-1` counter-clockwise.
    pub direction: i8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_drawn_card: Option<Card>,
    pub messages: Vec<String>,
}

impl GameStateView {
    /// Builds the filtered snapshot for `player`. `messages` is passed in
    /// rather than read off the state so one broadcast drains the queue once
    /// and every recipient still sees the same notices. A member without a
    /// seat (joined after the deal) gets an empty hand.
    pub fn for_player(game: &GameState, player: &str, messages: &[String]) -> GameStateView {
        let player_hand = game.hand(player).cloned().unwrap_or_default();
        let others = game
            .seats
            .iter()
            .filter(|seat| seat.as_str() != player)
            .map(|seat| HandCount {
                player_id: seat.clone(),
                count: game.hand(seat).map_or(0, Vec::len),
            })
            .collect();
        let last_drawn_card = match &game.last_drawn {
            Some((drawer, card)) if drawer == player => Some(*card),
            _ => None,
        };
        GameStateView {
            player_hand,
            others,
            discard_pile: game.discard_pile.clone(),
            current_color: game.current_color,
            current_player_index: game.current,
            direction: game.direction.step(),
            last_drawn_card,
            messages: messages.to_vec(),
        }
    }
}
