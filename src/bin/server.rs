use anyhow::Result;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing_subscriber::EnvFilter;

use uno_rooms::protocol::{ClientMessage, ServerMessage};
use uno_rooms::room::{ConnId, RoomCmd, Rooms};
use uno_rooms::session::SessionError;

const DEFAULT_ADDR: &str = "0.0.0.0:9000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::var("UNO_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "uno room server listening");

    let rooms = Rooms::new();
    let mut next_conn: ConnId = 0;
    loop {
        let (stream, peer) = listener.accept().await?;
        next_conn += 1;
        let conn_id = next_conn;
        tracing::info!(conn = conn_id, %peer, "accepted connection");
        let rooms = rooms.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(stream, rooms, conn_id).await {
                tracing::warn!(conn = conn_id, error = %err, "connection error");
            }
        });
    }
}

/// Reads newline-delimited JSON off one client connection and routes each
/// message. Room-targeted actions are resolved through the registry from the
/// message's explicit room code every time, never from leftover connection
/// state.
async fn handle_connection(stream: TcpStream, rooms: Rooms, conn_id: ConnId) -> Result<()> {
    let (reader, writer) = stream.into_split();
    let mut lines = FramedRead::new(reader, LinesCodec::new());
    let (tx_client, mut rx_client) = mpsc::channel::<ServerMessage>(256);

    // Dedicated write task; a slow or dead peer never blocks a room.
    tokio::spawn(async move {
        let mut writer = tokio::io::BufWriter::new(writer);
        while let Some(msg) = rx_client.recv().await {
            let Ok(line) = serde_json::to_string(&msg) else {
                continue;
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = writer.flush().await;
        }
    });

    // The room this connection joined, if any: (code, player id).
    let mut joined: Option<(String, String)> = None;

    while let Some(line) = lines.next().await {
        let line = line?;
        let msg: ClientMessage = match serde_json::from_str(&line) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::debug!(conn = conn_id, error = %err, "bad message");
                let reject = SessionError::MalformedMessage(err.to_string());
                let _ = tx_client.send(reject.to_message()).await;
                continue;
            }
        };
        match msg {
            ClientMessage::CreateRoom { player_id } => {
                if joined.is_some() {
                    let _ = tx_client.send(SessionError::AlreadyInRoom.to_message()).await;
                    continue;
                }
                let (code, handle) = rooms.create().await;
                let _ = handle
                    .tx
                    .send(RoomCmd::Join {
                        conn_id,
                        player_id: player_id.clone(),
                        tx: tx_client.clone(),
                        created: true,
                    })
                    .await;
                joined = Some((code, player_id));
            }
            ClientMessage::JoinRoom {
                room_code,
                player_id,
            } => {
                if joined.is_some() {
                    let _ = tx_client.send(SessionError::AlreadyInRoom.to_message()).await;
                    continue;
                }
                let code = room_code.to_uppercase();
                let Some(handle) = rooms.get(&code).await else {
                    let reject = SessionError::RoomNotFound(code);
                    let _ = tx_client.send(reject.to_message()).await;
                    continue;
                };
                let _ = handle
                    .tx
                    .send(RoomCmd::Join {
                        conn_id,
                        player_id: player_id.clone(),
                        tx: tx_client.clone(),
                        created: false,
                    })
                    .await;
                joined = Some((code, player_id));
            }
            ClientMessage::DrawCard {
                room_code,
                player_id,
            } => {
                if let Some(handle) = resolve_room(&rooms, &joined, &room_code, &tx_client).await {
                    let _ = handle.tx.send(RoomCmd::Draw { conn_id, player_id }).await;
                }
            }
            ClientMessage::PlayCard {
                room_code,
                player_id,
                card,
                chosen_color,
            } => {
                if let Some(handle) = resolve_room(&rooms, &joined, &room_code, &tx_client).await {
                    let _ = handle
                        .tx
                        .send(RoomCmd::Play {
                            conn_id,
                            player_id,
                            card,
                            chosen_color,
                        })
                        .await;
                }
            }
        }
    }

    if let Some((code, _)) = joined {
        if let Some(handle) = rooms.get(&code).await {
            let _ = handle.tx.send(RoomCmd::Leave { conn_id }).await;
        }
    }
    Ok(())
}

/// Looks up the target room for a play or draw by its explicit code,
/// requiring that this connection actually joined that room. Errors go back
/// to the sender only.
async fn resolve_room(
    rooms: &Rooms,
    joined: &Option<(String, String)>,
    room_code: &str,
    tx_client: &mpsc::Sender<ServerMessage>,
) -> Option<uno_rooms::room::RoomHandle> {
    let code = room_code.to_uppercase();
    match joined {
        Some((joined_code, _)) if *joined_code == code => {}
        _ => {
            let _ = tx_client.send(SessionError::NotInRoom.to_message()).await;
            return None;
        }
    }
    match rooms.get(&code).await {
        Some(handle) => Some(handle),
        None => {
            let reject = SessionError::RoomNotFound(code);
            let _ = tx_client.send(reject.to_message()).await;
            None
        }
    }
}
