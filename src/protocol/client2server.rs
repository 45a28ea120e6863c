use serde::{Deserialize, Serialize};

use crate::game::cards::{Card, Color};

/// Inbound wire messages, one JSON object per line with a `type`
/// discriminator. Field names follow the browser client (`roomCode`,
/// `playerId`, `chosenColor`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "CREATE_ROOM", rename_all = "camelCase")]
    CreateRoom { player_id: String },
    #[serde(rename = "JOIN_ROOM", rename_all = "camelCase")]
    JoinRoom { room_code: String, player_id: String },
    #[serde(rename = "DRAW_CARD", rename_all = "camelCase")]
    DrawCard { room_code: String, player_id: String },
    #[serde(rename = "PLAY_CARD", rename_all = "camelCase")]
    PlayCard {
        room_code: String,
        player_id: String,
        card: Card,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chosen_color: Option<Color>,
    },
}
