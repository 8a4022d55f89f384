//! The scripted opponent used for local single-player matches.
//!
//! The whole policy lives in pure functions over (hand, table, policy
//! inputs) so it can be unit-tested without a match and reused verbatim for
//! server-side bots.

use crate::action::Action;
use crate::bot::Bot;
use crate::card::{Card, Rank, Suit};
use crate::rules;
use crate::state::{GameStateView, Pending};

/// Opponent hand size at or below which the bot starts spending its special
/// cards instead of saving them.
const PRESSURE_THRESHOLD: usize = 3;

/// Suit most represented in `hand`; ties break by the fixed suit order
/// (spades, hearts, diamonds, clubs).
pub fn preferred_suit(hand: &[Card]) -> Suit {
    let mut best = Suit::Spades;
    let mut best_count = 0;
    for suit in Suit::ALL {
        let count = hand.iter().filter(|card| card.suit == suit).count();
        if count > best_count {
            best = suit;
            best_count = count;
        }
    }
    best
}

/// Decides one turn. Policy:
/// - with a penalty pending, play a legal counter card or draw the stack;
/// - prefer special cards when the shortest opponent hand is at or below
///   the pressure threshold, otherwise play the first playable card;
/// - never voluntarily end the hand on a 2 or an 8 (draw instead);
/// - at one card, call game before making the winning play.
pub fn choose_turn_action(
    hand: &[Card],
    top_card: Card,
    current_suit: Suit,
    stack_count: u32,
    opponent_min_hand: usize,
    called_game: bool,
) -> Action {
    if stack_count > 0 {
        let counter = hand
            .iter()
            .copied()
            .find(|&card| rules::is_counter(card) && rules::can_play(card, top_card, current_suit));
        return match counter {
            // A lone counter card would end the hand: a 2 is a forbidden
            // final card, and any win needs game called first.
            Some(card) if hand.len() == 1 => {
                if card.rank == Rank::Two {
                    Action::Draw
                } else if !called_game {
                    Action::CallGame
                } else {
                    Action::Play { cards: vec![card] }
                }
            }
            Some(card) => Action::Play { cards: vec![card] },
            None => Action::Draw,
        };
    }

    let playable: Vec<Card> = hand
        .iter()
        .copied()
        .filter(|&card| rules::can_play(card, top_card, current_suit))
        .collect();
    let Some(&first) = playable.first() else {
        return Action::Draw;
    };

    let mut choice = first;
    if opponent_min_hand <= PRESSURE_THRESHOLD {
        if let Some(&special) = playable.iter().find(|card| card.is_special()) {
            choice = special;
        }
    }

    if hand.len() == 1 {
        if matches!(choice.rank, Rank::Two | Rank::Eight) {
            return Action::Draw;
        }
        if !called_game {
            return Action::CallGame;
        }
    }

    Action::Play {
        cards: vec![choice],
    }
}

/// [`Bot`] wrapper over the pure policy above.
pub struct ScriptedBot;

impl ScriptedBot {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScriptedBot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot for ScriptedBot {
    fn select_action(&mut self, state: &GameStateView) -> Action {
        if state.pending == Pending::SuitChoice && state.current_player == state.self_player {
            return Action::ChooseSuit {
                suit: preferred_suit(&state.hand),
            };
        }
        choose_turn_action(
            &state.hand,
            state.top_card,
            state.current_suit,
            state.stack_count,
            state.opponent_min_hand(),
            state.called_game,
        )
    }
}
