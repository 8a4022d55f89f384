use serde::{Deserialize, Serialize};

use crate::card::{Card, Suit};

/// Zero-based seat index of a player within a match.
pub type PlayerId = usize;

/// Intent a player (human, bot, or network client) can submit on their turn.
///
/// `CallGame` is the one intent that is also legal off-turn: a player may
/// declare their final-card intent whenever their hand is down to one card.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Play one or more cards of the same rank onto the discard pile.
    Play { cards: Vec<Card> },
    /// Draw from the draw pile, or take the pending penalty stack.
    Draw,
    /// Declare the intent to go out on the next play.
    CallGame,
    /// Resolve the suit of a wild 8 that was just played.
    ChooseSuit { suit: Suit },
}
