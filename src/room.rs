use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::{mpsc, RwLock};

use crate::game::cards::{Card, Color};
use crate::protocol::ServerMessage;

pub type RoomCode = String;
pub type ConnId = u64;

const ROOM_CODE_LEN: usize = 5;
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_CHANNEL_CAPACITY: usize = 256;

/// Commands into a room task. Everything that can mutate a room flows
/// through its single command channel, so mutations are serialized per room
/// while rooms stay independent of each other.
#[derive(Debug)]
pub enum RoomCmd {
    Join {
        conn_id: ConnId,
        player_id: String,
        tx: mpsc::Sender<ServerMessage>,
        /// True for the creator's implicit join, which answers with
        /// `ROOM_CREATED` instead of `ROOM_JOINED`.
        created: bool,
    },
    Leave {
        conn_id: ConnId,
    },
    Play {
        conn_id: ConnId,
        player_id: String,
        card: Card,
        chosen_color: Option<Color>,
    },
    Draw {
        conn_id: ConnId,
        player_id: String,
    },
}

#[derive(Clone)]
pub struct RoomHandle {
    pub tx: mpsc::Sender<RoomCmd>,
}

/// Registry of live rooms, `roomCode -> RoomHandle`. Creating a room spawns
/// its task; the task deregisters itself when its last member leaves.
#[derive(Clone, Default)]
pub struct Rooms {
    inner: Arc<RwLock<HashMap<RoomCode, RoomHandle>>>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a collision-checked room code, registers the room, and
    /// spawns its task. Returns the code and handle; the creator still has
    /// to send its `Join`.
    pub async fn create(&self) -> (RoomCode, RoomHandle) {
        let mut rooms = self.inner.write().await;
        let mut rng = rand::thread_rng();
        let code = loop {
            let candidate = room_code(&mut rng);
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let (tx, rx) = mpsc::channel(ROOM_CHANNEL_CAPACITY);
        let handle = RoomHandle { tx };
        rooms.insert(code.clone(), handle.clone());
        tokio::spawn(crate::session::room_task(code.clone(), rx, self.clone()));
        (code, handle)
    }

    pub async fn get(&self, code: &str) -> Option<RoomHandle> {
        self.inner.read().await.get(code).cloned()
    }

    pub async fn contains(&self, code: &str) -> bool {
        self.inner.read().await.contains_key(code)
    }

    pub async fn remove(&self, code: &str) {
        self.inner.write().await.remove(code);
    }
}

/// Short uppercase alphanumeric room code, e.g. `K7Q2M`.
pub fn room_code(rng: &mut impl Rng) -> RoomCode {
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}
