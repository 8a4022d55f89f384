use serde::{Deserialize, Serialize};

use crate::action::PlayerId;
use crate::card::{Card, DeckComposition, Suit};
use crate::rules::JackEffect;

/// Fixed parameters of a running match.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    pub num_players: usize,
    pub hand_size: usize,
    pub composition: DeckComposition,
    pub jack_effect: JackEffect,
    pub deck_size: usize,
}

/// Lifecycle of a match. `Ended` is terminal: no engine operation is legal
/// afterwards; a new match is built from scratch instead.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum Phase {
    InProgress,
    Ended { winner: PlayerId },
}

/// What, if anything, blocks the normal flow of the current turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Pending {
    /// Nothing pending; the current player may play or draw.
    None,
    /// A wild 8 was played and its suit has not been chosen yet. No other
    /// intent from that player is legal until the choice arrives.
    SuitChoice,
    /// A forced-draw stack is owed. The current player must draw it or play
    /// a counter card.
    Penalty,
}

/// Public portion of one player's state, as every opponent sees it: card
/// count only, never the cards themselves.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPublicState {
    pub id: PlayerId,
    pub card_count: usize,
    pub called_game: bool,
    pub is_current: bool,
}

/// Snapshot of a match from one player's perspective. Only `hand` is
/// private; everything else is table-public.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub settings: GameSettings,
    pub phase: Phase,
    pub pending: Pending,
    pub self_player: PlayerId,
    pub current_player: PlayerId,
    pub current_suit: Suit,
    pub top_card: Card,
    pub stack_count: u32,
    pub draw_pile_count: usize,
    pub discard_pile: Vec<Card>,
    pub hand: Vec<Card>,
    pub called_game: bool,
    pub players: Vec<PlayerPublicState>,
}

impl GameStateView {
    /// Smallest opponent hand, used by the scripted AI's pressure heuristic.
    pub fn opponent_min_hand(&self) -> usize {
        self.players
            .iter()
            .filter(|p| p.id != self.self_player)
            .map(|p| p.card_count)
            .min()
            .unwrap_or(usize::MAX)
    }
}

/// Structured side effects of a successful engine operation, for rendering
/// and broadcasting. The engine state itself is already updated when these
/// are returned.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum Effect {
    /// A card landed on the discard pile.
    Played { player: PlayerId, card: Card },
    /// The forced-draw stack grew.
    StackIncreased { by: u32, total: u32 },
    /// A wild 8 awaits its suit choice from `player`.
    SuitPending { player: PlayerId },
    /// The active suit changed (by a suit choice or a non-8 play).
    SuitChanged { suit: Suit },
    /// Jack under the play-again policy: the player keeps the turn.
    PlaysAgain { player: PlayerId },
    /// Jack under the skip-next policy: `player` loses their turn.
    TurnSkipped { player: PlayerId },
    /// A voluntary draw of `count` cards (0 when both piles were empty).
    Drew { player: PlayerId, count: usize, playable: bool },
    /// A forced penalty draw; the stack is reset afterwards.
    PenaltyDrawn { player: PlayerId, count: usize },
    /// The discard pile (minus its top card) was shuffled back into the
    /// draw pile.
    Reshuffled { draw_pile_count: usize },
    /// `player` declared final-card intent.
    GameCalled { player: PlayerId },
    /// `player` forfeited; their cards returned to the draw pile.
    PlayerRemoved { player: PlayerId },
    /// The match ended; `scores` holds each player's penalty points.
    Won { player: PlayerId, scores: Vec<u32> },
}
