use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use uno_rooms::protocol::{GameStateView, ServerMessage};
use uno_rooms::room::{room_code, RoomCmd, RoomHandle, Rooms};

async fn join(
    handle: &RoomHandle,
    conn_id: u64,
    player_id: &str,
    created: bool,
) -> mpsc::Receiver<ServerMessage> {
    let (tx, rx) = mpsc::channel(64);
    handle
        .tx
        .send(RoomCmd::Join {
            conn_id,
            player_id: player_id.to_string(),
            tx,
            created,
        })
        .await
        .unwrap();
    rx
}

async fn recv(rx: &mut mpsc::Receiver<ServerMessage>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("channel closed")
}

async fn recv_state(rx: &mut mpsc::Receiver<ServerMessage>) -> GameStateView {
    match recv(rx).await {
        ServerMessage::GameStateUpdate { game_state } => game_state,
        other => panic!("expected GAME_STATE_UPDATE, got {:?}", other),
    }
}

#[test]
fn room_codes_are_short_uppercase_alphanumerics() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..100 {
        let code = room_code(&mut rng);
        assert_eq!(code.len(), 5);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}

#[tokio::test]
async fn create_join_autostart_and_filtered_views() {
    let rooms = Rooms::new();
    let (code, handle) = rooms.create().await;
    assert!(rooms.contains(&code).await);

    let mut alice = join(&handle, 1, "alice", true).await;
    match recv(&mut alice).await {
        ServerMessage::RoomCreated {
            room_code,
            player_id,
        } => {
            assert_eq!(room_code, code);
            assert_eq!(player_id, "alice");
        }
        other => panic!("expected ROOM_CREATED, got {:?}", other),
    }

    let mut bob = join(&handle, 2, "bob", false).await;
    match recv(&mut bob).await {
        ServerMessage::RoomJoined {
            player_count,
            player_list,
            ..
        } => {
            assert_eq!(player_count, 2);
            assert_eq!(player_list, vec!["alice", "bob"]);
        }
        other => panic!("expected ROOM_JOINED, got {:?}", other),
    }

    // Alice hears about bob, then both see the auto-start.
    assert!(matches!(
        recv(&mut alice).await,
        ServerMessage::PlayerJoined { player_id, .. } if player_id == "bob"
    ));
    assert!(matches!(recv(&mut alice).await, ServerMessage::GameStarted { .. }));
    assert!(matches!(recv(&mut bob).await, ServerMessage::GameStarted { .. }));

    let alice_view = recv_state(&mut alice).await;
    let bob_view = recv_state(&mut bob).await;
    assert_eq!(alice_view.player_hand.len(), 7);
    assert_eq!(bob_view.player_hand.len(), 7);
    assert_eq!(alice_view.others.len(), 1);
    assert_eq!(alice_view.others[0].player_id, "bob");
    assert_eq!(alice_view.others[0].count, 7);
    assert_eq!(bob_view.others[0].player_id, "alice");
    assert_eq!(bob_view.others[0].count, 7);
    assert_eq!(alice_view.discard_pile.len(), 1);
    assert_eq!(alice_view.current_player_index, 0);
    assert_eq!(alice_view.direction, 1);
    assert!(!alice_view.messages.is_empty());
}

#[tokio::test]
async fn out_of_turn_draw_is_rejected_to_sender_only() {
    let rooms = Rooms::new();
    let (_code, handle) = rooms.create().await;
    let mut alice = join(&handle, 1, "alice", true).await;
    let mut bob = join(&handle, 2, "bob", false).await;

    // Drain setup traffic: alice sees created/joined/start/state, bob sees
    // joined/start/state.
    for _ in 0..4 {
        recv(&mut alice).await;
    }
    for _ in 0..3 {
        recv(&mut bob).await;
    }

    // Seat order is alice then bob, so bob is out of turn.
    handle
        .tx
        .send(RoomCmd::Draw {
            conn_id: 2,
            player_id: "bob".to_string(),
        })
        .await
        .unwrap();
    assert!(matches!(recv(&mut bob).await, ServerMessage::Error { .. }));

    // Alice's in-turn draw reaches everyone and grows her hand.
    handle
        .tx
        .send(RoomCmd::Draw {
            conn_id: 1,
            player_id: "alice".to_string(),
        })
        .await
        .unwrap();
    let alice_view = recv_state(&mut alice).await;
    let bob_view = recv_state(&mut bob).await;
    assert_eq!(alice_view.player_hand.len(), 8);
    assert_eq!(bob_view.others[0].count, 8);
    assert_eq!(alice_view.current_player_index, 1);
    // Only the drawer learns which card arrived.
    assert!(alice_view.last_drawn_card.is_some());
    assert!(bob_view.last_drawn_card.is_none());
}

#[tokio::test]
async fn spoofed_player_id_is_rejected() {
    let rooms = Rooms::new();
    let (_code, handle) = rooms.create().await;
    let mut alice = join(&handle, 1, "alice", true).await;
    let mut bob = join(&handle, 2, "bob", false).await;
    for _ in 0..4 {
        recv(&mut alice).await;
    }
    for _ in 0..3 {
        recv(&mut bob).await;
    }

    // Bob's connection claims to be alice.
    handle
        .tx
        .send(RoomCmd::Draw {
            conn_id: 2,
            player_id: "alice".to_string(),
        })
        .await
        .unwrap();
    assert!(matches!(recv(&mut bob).await, ServerMessage::Error { .. }));
}

#[tokio::test]
async fn eleventh_member_is_turned_away() {
    let rooms = Rooms::new();
    let (_code, handle) = rooms.create().await;
    let mut receivers = Vec::new();
    receivers.push(join(&handle, 0, "p0", true).await);
    for i in 1..10u64 {
        receivers.push(join(&handle, i, &format!("p{}", i), false).await);
    }
    let mut late = join(&handle, 10, "p10", false).await;

    match recv(&mut late).await {
        ServerMessage::Error { message } => assert!(message.contains("full")),
        other => panic!("expected ERROR, got {:?}", other),
    }
    // No membership change leaked to the room.
    match recv(&mut receivers[0]).await {
        ServerMessage::RoomCreated { .. } => {}
        other => panic!("expected ROOM_CREATED, got {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_player_id_is_turned_away() {
    let rooms = Rooms::new();
    let (_code, handle) = rooms.create().await;
    let _alice = join(&handle, 1, "alice", true).await;
    let mut imposter = join(&handle, 2, "alice", false).await;
    assert!(matches!(recv(&mut imposter).await, ServerMessage::Error { .. }));
}

#[tokio::test]
async fn last_leave_destroys_the_room() {
    let rooms = Rooms::new();
    let (code, handle) = rooms.create().await;
    let mut alice = join(&handle, 1, "alice", true).await;
    let bob = join(&handle, 2, "bob", false).await;
    recv(&mut alice).await;

    handle.tx.send(RoomCmd::Leave { conn_id: 2 }).await.unwrap();
    // Bob's departure is announced to those remaining.
    loop {
        match recv(&mut alice).await {
            ServerMessage::PlayerLeft {
                player_id,
                player_count,
                ..
            } => {
                assert_eq!(player_id, "bob");
                assert_eq!(player_count, 1);
                break;
            }
            _ => continue,
        }
    }
    drop(bob);

    handle.tx.send(RoomCmd::Leave { conn_id: 1 }).await.unwrap();
    // The room task deregisters itself once empty.
    for _ in 0..50 {
        if !rooms.contains(&code).await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("room was not removed after its last member left");
}

#[tokio::test]
async fn unknown_room_code_resolves_to_nothing() {
    let rooms = Rooms::new();
    assert!(rooms.get("ZZZZZ").await.is_none());
}
