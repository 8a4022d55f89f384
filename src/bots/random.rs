use rand::Rng;
use rand::seq::SliceRandom;

use crate::action::Action;
use crate::bot::Bot;
use crate::card::{Card, Rank};
use crate::rules;
use crate::state::{GameStateView, Pending};

/// Baseline bot that samples uniformly from its legal intents. Useful for
/// simulations and as a sanity check that the engine never deadlocks.
pub struct RandomBot<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomBot<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn legal_intents(state: &GameStateView) -> Vec<Action> {
        let mut intents = Vec::new();
        let would_empty = |card: &Card| state.hand.len() == 1 && *card == state.hand[0];
        for &card in &state.hand {
            if !rules::can_play(card, state.top_card, state.current_suit) {
                continue;
            }
            if state.stack_count > 0 && !rules::is_counter(card) {
                continue;
            }
            if would_empty(&card) {
                if matches!(card.rank, Rank::Two | Rank::Eight) || !state.called_game {
                    continue;
                }
            }
            intents.push(Action::Play { cards: vec![card] });
        }
        if state.hand.len() == 1 && !state.called_game {
            intents.push(Action::CallGame);
        }
        intents.push(Action::Draw);
        intents
    }
}

impl<R: Rng> Bot for RandomBot<R> {
    fn select_action(&mut self, state: &GameStateView) -> Action {
        if state.pending == Pending::SuitChoice && state.current_player == state.self_player {
            let suit = *crate::card::Suit::ALL
                .choose(&mut self.rng)
                .expect("suit list is non-empty");
            return Action::ChooseSuit { suit };
        }
        Self::legal_intents(state)
            .choose(&mut self.rng)
            .cloned()
            .expect("draw is always a legal intent")
    }
}
