//! Crazy Eights game engine with scripted opponents and a room-based
//! multiplayer server.

pub mod action;
pub mod bot;
pub mod bots;
pub mod card;
pub mod error;
pub mod game;
pub mod rules;
pub mod score;
pub mod server;
pub mod session;
pub mod state;

pub use crate::action::{Action, PlayerId};
pub use crate::bot::Bot;
pub use crate::bots::{RandomBot, ScriptedBot};
pub use crate::card::{Card, DeckComposition, Rank, Suit};
pub use crate::error::{GameError, InvalidMove, RoomError};
pub use crate::game::{Game, GameBuilder, GameConfig};
pub use crate::rules::JackEffect;
pub use crate::session::{Seat, Session};
pub use crate::state::{
    Effect, GameSettings, GameStateView, Pending, Phase, PlayerPublicState,
};
