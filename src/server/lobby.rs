//! Room registry and per-connection WebSocket bridging.
//!
//! Each room is owned by one tokio task that `select!`s over its command
//! queue, the turn deadline and the earliest disconnect-grace deadline.
//! Deadlines are recomputed every iteration, so arming a new timer
//! implicitly cancels the old one and nothing ever double-fires.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::{RwLock, oneshot};
use tokio::time::{self, Instant};

use crate::action::Action;
use crate::error::RoomError;

use super::protocol::{ClientMessage, ServerMessage};
use super::room::{CODE_LENGTH, MemberId, Room, RoomConfig};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Sleep horizon used when a deadline is not armed.
const IDLE: Duration = Duration::from_secs(60 * 60 * 24);

/// Everything a room task can be asked to do.
pub enum RoomCommand {
    Join {
        name: String,
        tx: UnboundedSender<String>,
        reply: oneshot::Sender<Result<MemberId, RoomError>>,
    },
    Leave {
        member: MemberId,
    },
    Disconnect {
        member: MemberId,
    },
    Start {
        member: MemberId,
    },
    Action {
        member: MemberId,
        action: Action,
    },
}

/// Maps live room codes to their command queues and bridges WebSocket
/// connections onto them.
pub struct Lobby {
    config: RoomConfig,
    rooms: RwLock<HashMap<String, UnboundedSender<RoomCommand>>>,
    connections: AtomicUsize,
    next_connection: AtomicU64,
}

impl Lobby {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: RwLock::new(HashMap::new()),
            connections: AtomicUsize::new(0),
            next_connection: AtomicU64::new(1),
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    /// Opens a room with `name` as its host and spawns the room task.
    pub async fn create(
        self: &Arc<Self>,
        name: &str,
        tx: UnboundedSender<String>,
    ) -> Result<(String, UnboundedSender<RoomCommand>, MemberId), RoomError> {
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = random_code(&mut rand::thread_rng());
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        let mut room = Room::new(code.clone(), self.config);
        let member = room.join(name, tx)?;
        room.send_to(
            member,
            &ServerMessage::RoomCreated {
                code: code.clone(),
                room: room.snapshot(),
            },
        );
        let (cmd_tx, cmd_rx) = unbounded_channel();
        rooms.insert(code.clone(), cmd_tx.clone());
        drop(rooms);
        log::info!("[room {}] created by {}", code, name);

        let lobby = self.clone();
        let room_code = code.clone();
        tokio::spawn(async move {
            run_room(room, cmd_rx).await;
            lobby.rooms.write().await.remove(&room_code);
            log::info!("[room {}] closed", room_code);
        });
        Ok((code, cmd_tx, member))
    }

    /// Joins (or reconnects to) an existing room by code.
    pub async fn join(
        &self,
        code: &str,
        name: &str,
        tx: UnboundedSender<String>,
    ) -> Result<(UnboundedSender<RoomCommand>, MemberId), RoomError> {
        let sender = self
            .rooms
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or(RoomError::NotFound)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(RoomCommand::Join {
                name: name.to_string(),
                tx,
                reply: reply_tx,
            })
            .map_err(|_| RoomError::NotFound)?;
        let member = reply_rx.await.map_err(|_| RoomError::NotFound)??;
        Ok((sender, member))
    }

    /// Runs one WebSocket connection until it closes: outbound messages are
    /// relayed from the member channel, inbound frames are decoded and
    /// routed to the connection's room.
    pub async fn bridge(
        self: Arc<Self>,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) {
        self.connections.fetch_add(1, Ordering::Relaxed);
        let (tx, mut rx) = unbounded_channel::<String>();
        let mut conn = Connection {
            id: self.next_connection.fetch_add(1, Ordering::Relaxed),
            name: None,
            room: None,
        };
        'sesh: loop {
            tokio::select! {
                outbound = rx.recv() => match outbound {
                    Some(json) => {
                        if session.text(json).await.is_err() {
                            break 'sesh;
                        }
                    }
                    None => break 'sesh,
                },
                inbound = stream.next() => match inbound {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        self.route(&text, &tx, &mut conn).await;
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) | None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }
        if let Some((room, member)) = conn.room.take() {
            let _ = room.send(RoomCommand::Disconnect { member });
        }
        self.connections.fetch_sub(1, Ordering::Relaxed);
    }

    async fn route(
        self: &Arc<Self>,
        text: &str,
        tx: &UnboundedSender<String>,
        conn: &mut Connection,
    ) {
        let reply = |message: ServerMessage| {
            let _ = tx.send(message.to_json());
        };
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(err) => {
                reply(ServerMessage::error(format!("malformed message: {err}")));
                return;
            }
        };
        match message {
            ClientMessage::Identify { name } => {
                log::debug!("[lobby] client {} identified as {}", conn.id, name);
                conn.name = Some(name.clone());
                reply(ServerMessage::Connected {
                    player_id: conn.id,
                    name,
                });
            }
            ClientMessage::CreateRoom => {
                let Some(name) = conn.name.clone() else {
                    reply(ServerMessage::error("identify before creating a room"));
                    return;
                };
                if conn.room.is_some() {
                    reply(ServerMessage::error("already in a room"));
                    return;
                }
                match self.create(&name, tx.clone()).await {
                    Ok((_code, sender, member)) => conn.room = Some((sender, member)),
                    Err(err) => reply(ServerMessage::error(err.to_string())),
                }
            }
            ClientMessage::JoinRoom { code } => {
                let Some(name) = conn.name.clone() else {
                    reply(ServerMessage::error("identify before joining a room"));
                    return;
                };
                if conn.room.is_some() {
                    reply(ServerMessage::error("already in a room"));
                    return;
                }
                let code = code.to_uppercase();
                match self.join(&code, &name, tx.clone()).await {
                    Ok((sender, member)) => conn.room = Some((sender, member)),
                    Err(RoomError::NotFound) => reply(ServerMessage::RoomNotFound { code }),
                    Err(RoomError::Full) => reply(ServerMessage::RoomFull { code }),
                    Err(err) => reply(ServerMessage::error(err.to_string())),
                }
            }
            ClientMessage::LeaveRoom => {
                if let Some((sender, member)) = conn.room.take() {
                    let _ = sender.send(RoomCommand::Leave { member });
                }
            }
            ClientMessage::StartGame => {
                let Some((sender, member)) = &conn.room else {
                    reply(ServerMessage::error("not in a room"));
                    return;
                };
                let _ = sender.send(RoomCommand::Start { member: *member });
            }
            intent => {
                let Some((sender, member)) = &conn.room else {
                    reply(ServerMessage::error("not in a room"));
                    return;
                };
                if let Some(action) = intent.action() {
                    let _ = sender.send(RoomCommand::Action {
                        member: *member,
                        action,
                    });
                }
            }
        }
    }
}

fn random_code<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Per-connection state held by the bridge task.
struct Connection {
    id: u64,
    name: Option<String>,
    room: Option<(UnboundedSender<RoomCommand>, MemberId)>,
}

/// Single-owner event loop for one room. Exits when the room empties or
/// every command sender is gone.
async fn run_room(mut room: Room, mut commands: UnboundedReceiver<RoomCommand>) {
    loop {
        let turn_at = room
            .turn_deadline()
            .unwrap_or_else(|| Instant::now() + IDLE);
        let grace_at = room
            .next_grace_deadline()
            .unwrap_or_else(|| Instant::now() + IDLE);
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => handle(&mut room, command),
                None => break,
            },
            _ = time::sleep_until(turn_at) => room.on_turn_timeout(),
            _ = time::sleep_until(grace_at) => room.on_grace_expiry(),
        }
        if room.is_empty() {
            break;
        }
    }
}

fn handle(room: &mut Room, command: RoomCommand) {
    match command {
        RoomCommand::Join { name, tx, reply } => {
            let result = room.join(&name, tx);
            if let Ok(member) = result {
                room.send_to(
                    member,
                    &ServerMessage::RoomJoined {
                        code: room.code().to_string(),
                        room: room.snapshot(),
                    },
                );
            }
            let _ = reply.send(result);
        }
        RoomCommand::Leave { member } => room.leave(member),
        RoomCommand::Disconnect { member } => room.disconnect(member),
        RoomCommand::Start { member } => {
            if let Err(err) = room.start(member, rand::random()) {
                room.send_to(member, &ServerMessage::error(err.to_string()));
            }
        }
        RoomCommand::Action { member, action } => {
            if let Err(err) = room.handle_action(member, action) {
                room.send_to(member, &ServerMessage::error(err.to_string()));
            }
        }
    }
}
