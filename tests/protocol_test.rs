use uno_rooms::game::cards::{Card, CardColor, CardKind, Color};
use uno_rooms::protocol::{ClientMessage, ServerMessage};

#[cfg(test)]
mod inbound_tests {
    use super::*;

    #[test]
    fn parses_create_room() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"CREATE_ROOM","playerId":"alice"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::CreateRoom { player_id } if player_id == "alice"));
    }

    #[test]
    fn parses_join_room() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"JOIN_ROOM","roomCode":"K7Q2M","playerId":"bob"}"#)
                .unwrap();
        match msg {
            ClientMessage::JoinRoom {
                room_code,
                player_id,
            } => {
                assert_eq!(room_code, "K7Q2M");
                assert_eq!(player_id, "bob");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn parses_play_card_with_numeral_type_and_chosen_color() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"PLAY_CARD","roomCode":"K7Q2M","playerId":"alice",
                "card":{"color":"WILD","type":"WILD_DRAW_FOUR"},"chosenColor":"BLUE"}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::PlayCard {
                card, chosen_color, ..
            } => {
                assert_eq!(card, Card::new(CardColor::Wild, CardKind::WildDrawFour));
                assert_eq!(chosen_color, Some(Color::Blue));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn chosen_color_is_optional() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"PLAY_CARD","roomCode":"K7Q2M","playerId":"alice",
                "card":{"color":"RED","type":"5"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::PlayCard {
                card, chosen_color, ..
            } => {
                assert_eq!(card, Card::new(CardColor::Red, CardKind::Five));
                assert_eq!(chosen_color, None);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn garbage_does_not_parse() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"TELEPORT"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }
}

#[cfg(test)]
mod outbound_tests {
    use super::*;

    #[test]
    fn room_created_uses_wire_names() {
        let json = serde_json::to_string(&ServerMessage::RoomCreated {
            room_code: "K7Q2M".to_string(),
            player_id: "alice".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"ROOM_CREATED""#));
        assert!(json.contains(r#""roomCode":"K7Q2M""#));
        assert!(json.contains(r#""playerId":"alice""#));
    }

    #[test]
    fn cards_serialize_with_numeral_strings() {
        let json = serde_json::to_string(&Card::new(CardColor::Green, CardKind::Zero)).unwrap();
        assert_eq!(json, r#"{"color":"GREEN","type":"0"}"#);
        let json = serde_json::to_string(&Card::new(CardColor::Wild, CardKind::Wild)).unwrap();
        assert_eq!(json, r#"{"color":"WILD","type":"WILD"}"#);
    }

    #[test]
    fn error_message_round_trips() {
        let json = serde_json::to_string(&ServerMessage::Error {
            message: "it is not your turn".to_string(),
        })
        .unwrap();
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ServerMessage::Error { message } if message == "it is not your turn"));
    }
}
