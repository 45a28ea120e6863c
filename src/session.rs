//! Per-room session coordination: membership, turn authority, and the
//! per-player filtered broadcasts that follow every successful mutation.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::game::cards::{Card, Color};
use crate::game::state::{GameError, GameState, MAX_PLAYERS, MIN_PLAYERS};
use crate::protocol::{GameStateView, ServerMessage};
use crate::room::{ConnId, RoomCmd, RoomCode, Rooms};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no room with code {0}")]
    RoomNotFound(String),
    #[error("that room is already full")]
    RoomFull,
    #[error("that player id is already taken in this room")]
    NameTaken,
    #[error("you are already in a room")]
    AlreadyInRoom,
    #[error("you are not a member of that room")]
    NotInRoom,
    #[error("the game has not started yet")]
    GameNotStarted,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("player id does not match this connection")]
    PlayerMismatch,
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

impl SessionError {
    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Error {
            message: self.to_string(),
        }
    }
}

struct PlayerSlot {
    conn_id: ConnId,
    player_id: String,
    tx: mpsc::Sender<ServerMessage>,
}

/// One room's authoritative state. Owned exclusively by its task, which
/// drains commands in arrival order; that queue is the room's mutual
/// exclusion.
struct Session {
    code: RoomCode,
    slots: Vec<PlayerSlot>,
    game: Option<GameState>,
    rooms: Rooms,
}

/// Drives one room until its last member leaves, then deregisters it.
pub async fn room_task(code: RoomCode, mut rx: mpsc::Receiver<RoomCmd>, rooms: Rooms) {
    tracing::info!(room = %code, "room task started");
    let mut session = Session {
        code,
        slots: Vec::new(),
        game: None,
        rooms,
    };
    while let Some(cmd) = rx.recv().await {
        let done = match cmd {
            RoomCmd::Join {
                conn_id,
                player_id,
                tx,
                created,
            } => {
                session.handle_join(conn_id, player_id, tx, created).await;
                false
            }
            RoomCmd::Leave { conn_id } => session.handle_leave(conn_id).await,
            RoomCmd::Play {
                conn_id,
                player_id,
                card,
                chosen_color,
            } => {
                session
                    .handle_play(conn_id, &player_id, card, chosen_color)
                    .await;
                false
            }
            RoomCmd::Draw { conn_id, player_id } => {
                session.handle_draw(conn_id, &player_id).await;
                false
            }
        };
        if done {
            break;
        }
    }
    tracing::info!(room = %session.code, "room task ended");
}

impl Session {
    fn player_list(&self) -> Vec<String> {
        self.slots.iter().map(|s| s.player_id.clone()).collect()
    }

    fn slot(&self, conn_id: ConnId) -> Option<&PlayerSlot> {
        self.slots.iter().find(|s| s.conn_id == conn_id)
    }

    async fn handle_join(
        &mut self,
        conn_id: ConnId,
        player_id: String,
        tx: mpsc::Sender<ServerMessage>,
        created: bool,
    ) {
        if self.slots.len() >= MAX_PLAYERS {
            let _ = tx.send(SessionError::RoomFull.to_message()).await;
            return;
        }
        if self.slots.iter().any(|s| s.player_id == player_id) {
            let _ = tx.send(SessionError::NameTaken.to_message()).await;
            return;
        }
        tracing::info!(room = %self.code, conn = conn_id, player = %player_id, "join");
        self.slots.push(PlayerSlot {
            conn_id,
            player_id: player_id.clone(),
            tx,
        });

        let reply = if created {
            ServerMessage::RoomCreated {
                room_code: self.code.clone(),
                player_id: player_id.clone(),
            }
        } else {
            ServerMessage::RoomJoined {
                room_code: self.code.clone(),
                player_id: player_id.clone(),
                player_count: self.slots.len(),
                player_list: self.player_list(),
            }
        };
        self.send_to(conn_id, reply).await;
        self.broadcast_except(
            conn_id,
            ServerMessage::PlayerJoined {
                player_id,
                player_count: self.slots.len(),
                player_list: self.player_list(),
            },
        )
        .await;

        if self.game.is_none() && self.slots.len() >= MIN_PLAYERS {
            self.start_game().await;
        }
    }

    async fn start_game(&mut self) {
        let seats = self.player_list();
        let dealt = GameState::deal(seats, &mut rand::thread_rng());
        match dealt {
            Ok(game) => {
                tracing::info!(room = %self.code, players = self.slots.len(), "game started");
                self.game = Some(game);
                self.broadcast(ServerMessage::GameStarted {
                    message: "All players ready. The game begins!".to_string(),
                })
                .await;
                self.sync_state().await;
            }
            Err(err) => {
                // Unreachable with a standard deck and a legal player count.
                tracing::error!(room = %self.code, error = %err, "failed to deal");
                self.broadcast(SessionError::from(err).to_message()).await;
            }
        }
    }

    /// Returns true when the room emptied and the task should end. A
    /// departure never touches the game state; a vacated seat simply stops
    /// acting.
    async fn handle_leave(&mut self, conn_id: ConnId) -> bool {
        let Some(pos) = self.slots.iter().position(|s| s.conn_id == conn_id) else {
            return false;
        };
        let slot = self.slots.remove(pos);
        tracing::info!(room = %self.code, conn = conn_id, player = %slot.player_id, "leave");
        if self.slots.is_empty() {
            tracing::info!(room = %self.code, "room empty, removing");
            self.rooms.remove(&self.code).await;
            return true;
        }
        self.broadcast(ServerMessage::PlayerLeft {
            player_id: slot.player_id,
            player_count: self.slots.len(),
            player_list: self.player_list(),
        })
        .await;
        false
    }

    async fn handle_play(
        &mut self,
        conn_id: ConnId,
        player_id: &str,
        card: Card,
        chosen_color: Option<Color>,
    ) {
        let result = self.check_turn(conn_id, player_id).and_then(|_| {
            let game = self.game.as_mut().ok_or(SessionError::GameNotStarted)?;
            game.play_card(player_id, card, chosen_color, &mut rand::thread_rng())?;
            Ok(())
        });
        match result {
            Ok(()) => {
                tracing::debug!(room = %self.code, player = %player_id, card = %card, "card played");
                self.sync_state().await;
                self.announce_winner().await;
            }
            Err(err) => self.reject(conn_id, err).await,
        }
    }

    async fn handle_draw(&mut self, conn_id: ConnId, player_id: &str) {
        let result = self.check_turn(conn_id, player_id).and_then(|_| {
            let game = self.game.as_mut().ok_or(SessionError::GameNotStarted)?;
            game.draw_card(player_id, true, &mut rand::thread_rng())?;
            Ok(())
        });
        match result {
            Ok(()) => {
                tracing::debug!(room = %self.code, player = %player_id, "card drawn");
                self.sync_state().await;
            }
            Err(err) => self.reject(conn_id, err).await,
        }
    }

    /// A play or draw is honored only when it comes from the connection the
    /// player joined with, and only on that player's turn.
    fn check_turn(&self, conn_id: ConnId, player_id: &str) -> Result<(), SessionError> {
        let slot = self.slot(conn_id).ok_or(SessionError::NotInRoom)?;
        if slot.player_id != player_id {
            return Err(SessionError::PlayerMismatch);
        }
        let game = self.game.as_ref().ok_or(SessionError::GameNotStarted)?;
        if !game.is_current(player_id) {
            return Err(SessionError::NotYourTurn);
        }
        Ok(())
    }

    async fn reject(&self, conn_id: ConnId, err: SessionError) {
        tracing::debug!(room = %self.code, conn = conn_id, error = %err, "rejected");
        self.send_to(conn_id, err.to_message()).await;
    }

    async fn announce_winner(&mut self) {
        let Some(winner) = self.game.as_ref().and_then(|g| g.winner.clone()) else {
            return;
        };
        tracing::info!(room = %self.code, winner = %winner, "game over");
        self.broadcast(ServerMessage::GameOver {
            message: format!("{} wins the game!", winner),
            winner,
        })
        .await;
    }

    /// Drains the game's notice queue once and pushes each member their own
    /// filtered snapshot.
    async fn sync_state(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let messages = game.take_messages();
        let game = &*game;
        for slot in &self.slots {
            let view = GameStateView::for_player(game, &slot.player_id, &messages);
            if slot
                .tx
                .send(ServerMessage::GameStateUpdate { game_state: view })
                .await
                .is_err()
            {
                tracing::warn!(room = %self.code, conn = slot.conn_id, "failed to send state update");
            }
        }
    }

    async fn send_to(&self, conn_id: ConnId, msg: ServerMessage) {
        if let Some(slot) = self.slot(conn_id) {
            if slot.tx.send(msg).await.is_err() {
                tracing::warn!(room = %self.code, conn = conn_id, "failed to send");
            }
        }
    }

    async fn broadcast(&self, msg: ServerMessage) {
        for slot in &self.slots {
            if slot.tx.send(msg.clone()).await.is_err() {
                tracing::warn!(room = %self.code, conn = slot.conn_id, "failed to send broadcast");
            }
        }
    }

    async fn broadcast_except(&self, skip: ConnId, msg: ServerMessage) {
        for slot in self.slots.iter().filter(|s| s.conn_id != skip) {
            if slot.tx.send(msg.clone()).await.is_err() {
                tracing::warn!(room = %self.code, conn = slot.conn_id, "failed to send broadcast");
            }
        }
    }
}
