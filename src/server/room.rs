//! Per-room bookkeeping: roster, host, the running match, turn and
//! disconnect deadlines. Everything here is synchronous; the owning task
//! (see [`super::lobby`]) serializes all access, so no locking is needed.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use crate::action::{Action, PlayerId};
use crate::bots::scripted::preferred_suit;
use crate::card::{MAX_PLAYERS, MIN_PLAYERS};
use crate::error::RoomError;
use crate::game::Game;
use crate::rules::JackEffect;
use crate::state::{Effect, Pending};

use super::protocol::{PlayerSummary, RoomSnapshot, ServerMessage};

pub const CODE_LENGTH: usize = 6;

/// Tunable room behavior; shared by every room a lobby creates.
#[derive(Clone, Copy, Debug)]
pub struct RoomConfig {
    pub max_players: usize,
    pub turn_timeout: Duration,
    pub grace_period: Duration,
    pub jack_effect: JackEffect,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            turn_timeout: Duration::from_secs(30),
            grace_period: Duration::from_secs(30),
            jack_effect: JackEffect::default(),
        }
    }
}

/// Stable member handle; survives roster reordering.
pub type MemberId = u64;

struct Member {
    id: MemberId,
    name: String,
    tx: UnboundedSender<String>,
    connected: bool,
    grace_until: Option<Instant>,
    seat: Option<PlayerId>,
}

/// One game room. The first roster entry is always the host; when the host
/// leaves, the oldest remaining member inherits the role.
pub struct Room {
    code: String,
    config: RoomConfig,
    members: Vec<Member>,
    next_member: MemberId,
    game: Option<Game>,
    paused: bool,
    turn_deadline: Option<Instant>,
}

impl Room {
    pub fn new(code: String, config: RoomConfig) -> Self {
        Self {
            code,
            config,
            members: Vec::new(),
            next_member: 0,
            game: None,
            paused: false,
            turn_deadline: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn turn_deadline(&self) -> Option<Instant> {
        self.turn_deadline
    }

    /// Earliest pending disconnect-grace deadline, if any.
    pub fn next_grace_deadline(&self) -> Option<Instant> {
        self.members.iter().filter_map(|m| m.grace_until).min()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            players: self
                .members
                .iter()
                .enumerate()
                .map(|(index, m)| PlayerSummary {
                    name: m.name.clone(),
                    host: index == 0,
                    connected: m.connected,
                    seat: m.seat,
                })
                .collect(),
            max_players: self.config.max_players,
            in_game: self.game.is_some(),
        }
    }

    /// Adds a member, or reattaches a disconnected member of the same name
    /// while a match is running (reconnect). Mid-match joins by anyone else
    /// are rejected.
    pub fn join(
        &mut self,
        name: &str,
        tx: UnboundedSender<String>,
    ) -> Result<MemberId, RoomError> {
        if self.game.is_some() {
            let reconnect = self
                .members
                .iter()
                .position(|m| !m.connected && m.name == name);
            let Some(index) = reconnect else {
                return Err(RoomError::AlreadyStarted);
            };
            let member = &mut self.members[index];
            member.tx = tx;
            member.connected = true;
            member.grace_until = None;
            let id = member.id;
            log::info!("[room {}] {} reconnected", self.code, name);
            self.resume_if_whole();
            self.push_state(index, &[]);
            self.broadcast(&ServerMessage::PlayerUpdate {
                room: self.snapshot(),
            });
            return Ok(id);
        }

        if self.members.len() >= self.config.max_players {
            return Err(RoomError::Full);
        }
        let id = self.next_member;
        self.next_member += 1;
        self.members.push(Member {
            id,
            name: name.to_string(),
            tx,
            connected: true,
            grace_until: None,
            seat: None,
        });
        log::info!("[room {}] {} joined ({} members)", self.code, name, self.members.len());
        self.broadcast(&ServerMessage::PlayerUpdate {
            room: self.snapshot(),
        });
        Ok(id)
    }

    /// Starts a match. Host only, at least two members, one seat per member
    /// in roster order.
    pub fn start(&mut self, member: MemberId, seed: u64) -> Result<(), RoomError> {
        if self.game.is_some() {
            return Err(RoomError::AlreadyStarted);
        }
        if self.members.first().map(|m| m.id) != Some(member) {
            return Err(RoomError::NotHost);
        }
        if self.members.len() < MIN_PLAYERS {
            return Err(RoomError::NotEnoughPlayers);
        }

        let game = Game::builder(self.members.len())?
            .with_seed(seed)
            .with_jack_effect(self.config.jack_effect)
            .build()?;
        for (seat, m) in self.members.iter_mut().enumerate() {
            m.seat = Some(seat);
        }
        log::info!(
            "[room {}] match started with {} players",
            self.code,
            self.members.len()
        );
        for index in 0..self.members.len() {
            if let Some(seat) = self.members[index].seat {
                if let Ok(state) = game.state_view(seat) {
                    self.send(index, &ServerMessage::GameStart { state });
                }
            }
        }
        self.game = Some(game);
        self.arm_turn_timer();
        Ok(())
    }

    /// Applies an engine intent from a member. Errors are answered to that
    /// member only; success broadcasts fresh state to every seat.
    pub fn handle_action(&mut self, member: MemberId, action: Action) -> Result<(), RoomError> {
        let index = self.member_index(member).ok_or(RoomError::NotAMember)?;
        if self.game.is_none() {
            return Err(RoomError::NotStarted);
        }
        if self.paused {
            return Err(RoomError::Paused);
        }
        let seat = self.members[index].seat.ok_or(RoomError::NotAMember)?;
        let (before, effects) = {
            let game = self.game.as_mut().ok_or(RoomError::NotStarted)?;
            let before = game.current_player();
            (before, game.apply(seat, &action)?)
        };
        if self.winner().is_some() {
            self.finish_match(&effects);
        } else {
            self.push_state_all(&effects);
            let current = self.game.as_ref().map(Game::current_player);
            // Off-turn calls leave the running turn timer alone.
            if seat == before || current != Some(before) {
                self.arm_turn_timer();
            }
        }
        Ok(())
    }

    /// Forced action for the current player whose timer expired: resolve a
    /// pending suit choice by majority, otherwise draw.
    pub fn on_turn_timeout(&mut self) {
        let Some(game) = self.game.as_mut() else {
            self.turn_deadline = None;
            return;
        };
        if self.paused {
            self.turn_deadline = None;
            return;
        }
        let current = game.current_player();
        let result = match game.pending() {
            Pending::SuitChoice => game
                .state_view(current)
                .map(|view| preferred_suit(&view.hand))
                .and_then(|suit| game.choose_suit(current, suit)),
            _ => game.draw(current),
        };
        match result {
            Ok(effects) => {
                log::info!("[room {}] player {} timed out", self.code, current);
                self.broadcast(&ServerMessage::TurnTimeout { player_id: current });
                self.push_state_all(&effects);
                self.arm_turn_timer();
            }
            Err(err) => {
                log::debug!("[room {}] timeout had no effect: {}", self.code, err);
                self.turn_deadline = None;
            }
        }
    }

    /// Drops a member for good. A seated member forfeits: their cards return
    /// to the draw pile, and a last remaining opponent wins on the spot.
    pub fn leave(&mut self, member: MemberId) {
        let Some(index) = self.member_index(member) else {
            return;
        };
        let removed = self.members.remove(index);
        log::info!("[room {}] {} left", self.code, removed.name);
        if let Some(seat) = removed.seat {
            let effects = self
                .game
                .as_mut()
                .filter(|game| !game.is_finished())
                .and_then(|game| game.remove_player(seat).ok());
            if let Some(effects) = effects {
                if self.winner().is_some() {
                    self.finish_match(&effects);
                } else {
                    self.push_state_all(&effects);
                    self.resume_if_whole();
                    if !self.paused {
                        self.arm_turn_timer();
                    }
                }
            }
        }
        self.broadcast(&ServerMessage::PlayerUpdate {
            room: self.snapshot(),
        });
    }

    /// Socket dropped. Mid-match this pauses the room and starts the grace
    /// window; in the lobby the member is simply removed.
    pub fn disconnect(&mut self, member: MemberId) {
        let Some(index) = self.member_index(member) else {
            return;
        };
        let seat = self.members[index].seat.filter(|_| self.game.is_some());
        let Some(seat) = seat else {
            self.leave(member);
            return;
        };
        let m = &mut self.members[index];
        m.connected = false;
        m.grace_until = Some(Instant::now() + self.config.grace_period);
        let name = m.name.clone();
        log::info!("[room {}] {} disconnected, match paused", self.code, name);
        self.paused = true;
        self.turn_deadline = None;
        self.broadcast(&ServerMessage::PlayerDisconnected {
            player_id: seat,
            name,
            grace_seconds: self.config.grace_period.as_secs(),
        });
        self.broadcast(&ServerMessage::PlayerUpdate {
            room: self.snapshot(),
        });
    }

    /// Removes every member whose grace window has expired.
    pub fn on_grace_expiry(&mut self) {
        let now = Instant::now();
        let expired: Vec<MemberId> = self
            .members
            .iter()
            .filter(|m| m.grace_until.is_some_and(|at| at <= now))
            .map(|m| m.id)
            .collect();
        for member in expired {
            log::info!("[room {}] grace expired for member {}", self.code, member);
            self.leave(member);
        }
    }

    pub fn send_to(&self, member: MemberId, message: &ServerMessage) {
        if let Some(index) = self.member_index(member) {
            self.send(index, message);
        }
    }

    fn member_index(&self, member: MemberId) -> Option<usize> {
        self.members.iter().position(|m| m.id == member)
    }

    fn winner(&self) -> Option<PlayerId> {
        self.game.as_ref().and_then(Game::winner)
    }

    fn arm_turn_timer(&mut self) {
        self.turn_deadline = Some(Instant::now() + self.config.turn_timeout);
    }

    /// Clears the pause once every member is connected again.
    fn resume_if_whole(&mut self) {
        if self.paused && self.members.iter().all(|m| m.connected) {
            self.paused = false;
            log::info!("[room {}] match resumed", self.code);
            self.arm_turn_timer();
        }
    }

    /// Ends the match: announce the winner, clear seats, drop members whose
    /// sockets are gone, and return the room to its lobby state.
    fn finish_match(&mut self, effects: &[Effect]) {
        self.push_state_all(effects);
        let Some(game) = self.game.take() else {
            return;
        };
        let Some(winner) = game.winner() else {
            return;
        };
        let scores = effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Won { scores, .. } => Some(scores.clone()),
                _ => None,
            })
            .unwrap_or_default();
        let winner_name = self
            .members
            .iter()
            .find(|m| m.seat == Some(winner))
            .map(|m| m.name.clone())
            .unwrap_or_default();
        log::info!("[room {}] match over, {} wins", self.code, winner_name);
        self.broadcast(&ServerMessage::GameEnd {
            winner,
            winner_name,
            scores,
        });
        for m in &mut self.members {
            m.seat = None;
            m.grace_until = None;
        }
        self.members.retain(|m| m.connected);
        self.paused = false;
        self.turn_deadline = None;
        self.broadcast(&ServerMessage::PlayerUpdate {
            room: self.snapshot(),
        });
    }

    fn send(&self, index: usize, message: &ServerMessage) {
        // A dead socket just drops the message; disconnect handling catches
        // up when the bridge task exits.
        let _ = self.members[index].tx.send(message.to_json());
    }

    fn broadcast(&self, message: &ServerMessage) {
        for index in 0..self.members.len() {
            self.send(index, message);
        }
    }

    /// Sends one member their redacted view.
    fn push_state(&self, index: usize, effects: &[Effect]) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        let Some(seat) = self.members[index].seat else {
            return;
        };
        if let Ok(state) = game.state_view(seat) {
            self.send(
                index,
                &ServerMessage::GameStateUpdate {
                    state,
                    effects: effects.to_vec(),
                },
            );
        }
    }

    fn push_state_all(&self, effects: &[Effect]) {
        for index in 0..self.members.len() {
            self.push_state(index, effects);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn room() -> Room {
        Room::new("AB12CD".into(), RoomConfig::default())
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        while let Ok(json) = rx.try_recv() {
            messages.push(serde_json::from_str(&json).unwrap());
        }
        messages
    }

    fn join(room: &mut Room, name: &str) -> (MemberId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        (room.join(name, tx).unwrap(), rx)
    }

    #[test]
    fn capacity_is_four() {
        let mut room = room();
        for name in ["a", "b", "c", "d"] {
            join(&mut room, name);
        }
        let (tx, _rx) = unbounded_channel();
        assert!(matches!(room.join("e", tx), Err(RoomError::Full)));
    }

    #[test]
    fn only_the_host_starts_and_needs_company() {
        let mut room = room();
        let (host, _rx) = join(&mut room, "host");
        assert!(matches!(
            room.start(host, 1),
            Err(RoomError::NotEnoughPlayers)
        ));
        let (guest, _rx) = join(&mut room, "guest");
        assert!(matches!(room.start(guest, 1), Err(RoomError::NotHost)));
        assert!(room.start(host, 1).is_ok());
        assert!(matches!(room.start(host, 1), Err(RoomError::AlreadyStarted)));
    }

    #[test]
    fn host_migrates_to_the_oldest_remaining_member() {
        let mut room = room();
        let (host, _rx) = join(&mut room, "first");
        join(&mut room, "second");
        room.leave(host);
        let snapshot = room.snapshot();
        assert_eq!(snapshot.players.len(), 1);
        assert!(snapshot.players[0].host);
        assert_eq!(snapshot.players[0].name, "second");
    }

    #[test]
    fn broadcasts_are_redacted_per_seat() {
        let mut room = room();
        let (host, mut rx_a) = join(&mut room, "ada");
        let (_guest, mut rx_b) = join(&mut room, "bob");
        room.start(host, 42).unwrap();

        let start_a = drain(&mut rx_a)
            .into_iter()
            .find_map(|m| match m {
                ServerMessage::GameStart { state } => Some(state),
                _ => None,
            })
            .unwrap();
        let start_b = drain(&mut rx_b)
            .into_iter()
            .find_map(|m| match m {
                ServerMessage::GameStart { state } => Some(state),
                _ => None,
            })
            .unwrap();

        assert_eq!(start_a.self_player, 0);
        assert_eq!(start_b.self_player, 1);
        assert_eq!(start_a.hand.len(), 8);
        // Opponents appear as counts only, and the two private hands differ.
        assert!(start_a.players.iter().all(|p| p.card_count == 8));
        assert_ne!(start_a.hand, start_b.hand);
    }

    #[test]
    fn mid_match_join_is_rejected_but_reconnect_reattaches() {
        let mut room = room();
        let (host, _rx_a) = join(&mut room, "ada");
        let (guest, _rx_b) = join(&mut room, "bob");
        room.start(host, 7).unwrap();

        let (tx, _rx) = unbounded_channel();
        assert!(matches!(
            room.join("carol", tx),
            Err(RoomError::AlreadyStarted)
        ));

        room.disconnect(guest);
        assert!(room.next_grace_deadline().is_some());
        assert!(matches!(
            room.handle_action(host, Action::Draw),
            Err(RoomError::Paused)
        ));

        let (tx, mut rx) = unbounded_channel();
        let rejoined = room.join("bob", tx).unwrap();
        assert_eq!(rejoined, guest);
        assert!(room.next_grace_deadline().is_none());
        assert!(room.turn_deadline().is_some());
        // The reconnecting client is caught up with a fresh view.
        assert!(drain(&mut rx)
            .iter()
            .any(|m| matches!(m, ServerMessage::GameStateUpdate { .. })));
    }

    #[test]
    fn grace_expiry_forfeits_and_the_survivor_wins() {
        let config = RoomConfig {
            grace_period: Duration::ZERO,
            ..RoomConfig::default()
        };
        let mut room = Room::new("AB12CD".into(), config);
        let (tx, mut rx_a) = unbounded_channel();
        let host = room.join("ada", tx).unwrap();
        let (tx, _rx_b) = unbounded_channel();
        let guest = room.join("bob", tx).unwrap();
        room.start(host, 9).unwrap();

        room.disconnect(guest);
        room.on_grace_expiry();

        let messages = drain(&mut rx_a);
        let end = messages
            .iter()
            .find_map(|m| match m {
                ServerMessage::GameEnd { winner, winner_name, .. } => {
                    Some((*winner, winner_name.clone()))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(end, (0, "ada".to_string()));
        assert_eq!(room.snapshot().players.len(), 1);
        assert!(!room.snapshot().in_game);
    }
}
