//! Pure decision logic for Crazy Eights plays.
//!
//! Nothing in this module mutates state; the match state machine in
//! [`crate::game`] calls into these functions and applies their verdicts.

use serde::{Deserialize, Serialize};

use crate::card::{Card, Rank, Suit};
use crate::error::InvalidMove;

/// Rank 8 is wild: it may be played regardless of the current suit or the
/// top card's rank. House variants disagree on this; the constant locks the
/// choice for this implementation and tests assert it.
pub const EIGHT_IS_ALWAYS_PLAYABLE: bool = true;

/// What playing a Jack does to the turn order. The two common variants are
/// indistinguishable in a two-player game.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
pub enum JackEffect {
    /// The player who played the Jack immediately takes another turn.
    #[default]
    PlayAgain,
    /// The next player's turn is skipped.
    SkipNext,
}

/// True iff `card` may legally land on `top_card` under `current_suit`.
///
/// `current_suit` is usually the top card's suit, but diverges after a wild
/// 8 whose player chose a different suit.
pub fn can_play(card: Card, top_card: Card, current_suit: Suit) -> bool {
    if EIGHT_IS_ALWAYS_PLAYABLE && card.rank == Rank::Eight {
        return true;
    }
    card.suit == current_suit || card.rank == top_card.rank
}

/// True for the cards that may be chained onto a pending draw penalty
/// instead of drawing it: any 2, or the Queen of Spades.
pub fn is_counter(card: Card) -> bool {
    card.rank == Rank::Two || (card.rank == Rank::Queen && card.suit == Suit::Spades)
}

/// How many forced-draw cards a single card adds to the stack.
pub fn stack_penalty(card: Card) -> u32 {
    match (card.rank, card.suit) {
        (Rank::Two, _) => 2,
        (Rank::Queen, Suit::Spades) => 5,
        _ => 0,
    }
}

/// Validates a multi-card selection against the hand and the table.
///
/// Rules, in rejection order:
/// - the selection is non-empty and all cards share one rank;
/// - every selected card is present in the hand (as a multiset);
/// - the first card is playable per [`can_play`];
/// - a selection that would empty the hand must not end on a 2 or an 8,
///   and requires a prior call-game declaration.
pub fn validate_selection(
    cards: &[Card],
    hand: &[Card],
    top_card: Card,
    current_suit: Suit,
    called_game: bool,
) -> Result<(), InvalidMove> {
    let first = match cards.first() {
        Some(card) => *card,
        None => return Err(InvalidMove::EmptySelection),
    };
    if cards.iter().any(|card| card.rank != first.rank) {
        return Err(InvalidMove::MixedRanks);
    }
    for card in cards {
        let in_selection = cards.iter().filter(|c| *c == card).count();
        let in_hand = hand.iter().filter(|c| *c == card).count();
        if in_selection > in_hand {
            return Err(InvalidMove::CardNotInHand);
        }
    }
    if !can_play(first, top_card, current_suit) {
        return Err(InvalidMove::NotPlayable);
    }
    if cards.len() == hand.len() {
        // `cards` is contained in `hand`, so equal length means the hand
        // would be emptied.
        let last = cards[cards.len() - 1];
        if matches!(last.rank, Rank::Two | Rank::Eight) {
            return Err(InvalidMove::CannotEndWithWild);
        }
        if !called_game {
            return Err(InvalidMove::MustCallGameFirst);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    #[test]
    fn matching_suit_or_rank_plays() {
        let top = card(Suit::Hearts, Rank::Seven);
        assert!(can_play(card(Suit::Hearts, Rank::King), top, Suit::Hearts));
        assert!(can_play(card(Suit::Clubs, Rank::Seven), top, Suit::Hearts));
        assert!(!can_play(card(Suit::Clubs, Rank::King), top, Suit::Hearts));
    }

    #[test]
    fn eight_is_wild_regardless_of_match() {
        let top = card(Suit::Hearts, Rank::Seven);
        assert!(can_play(card(Suit::Clubs, Rank::Eight), top, Suit::Hearts));
    }

    #[test]
    fn current_suit_overrides_top_card_suit() {
        // An 8 of hearts sits on top but the chosen suit is clubs.
        let top = card(Suit::Hearts, Rank::Eight);
        assert!(can_play(card(Suit::Clubs, Rank::Four), top, Suit::Clubs));
        assert!(!can_play(card(Suit::Hearts, Rank::Four), top, Suit::Clubs));
    }

    #[test]
    fn counters_are_twos_and_queen_of_spades() {
        assert!(is_counter(card(Suit::Diamonds, Rank::Two)));
        assert!(is_counter(card(Suit::Spades, Rank::Queen)));
        assert!(!is_counter(card(Suit::Hearts, Rank::Queen)));
        assert!(!is_counter(card(Suit::Spades, Rank::Eight)));
    }

    #[test]
    fn selection_must_share_rank() {
        let top = card(Suit::Hearts, Rank::Seven);
        let hand = vec![card(Suit::Hearts, Rank::Four), card(Suit::Clubs, Rank::Five)];
        let err = validate_selection(&hand.clone(), &hand, top, Suit::Hearts, false);
        assert_eq!(err, Err(InvalidMove::MixedRanks));
    }

    #[test]
    fn selection_may_not_exceed_hand_multiset() {
        let top = card(Suit::Hearts, Rank::Seven);
        let hand = vec![card(Suit::Hearts, Rank::Four), card(Suit::Clubs, Rank::Nine)];
        let double = vec![card(Suit::Hearts, Rank::Four), card(Suit::Hearts, Rank::Four)];
        let err = validate_selection(&double, &hand, top, Suit::Hearts, false);
        assert_eq!(err, Err(InvalidMove::CardNotInHand));
    }

    #[test]
    fn ending_on_wild_is_rejected_before_call_game_gate() {
        let top = card(Suit::Hearts, Rank::Seven);
        let hand = vec![card(Suit::Hearts, Rank::Eight)];
        // Even with the call made, the wild-8 finish is rejected.
        let err = validate_selection(&hand.clone(), &hand, top, Suit::Hearts, true);
        assert_eq!(err, Err(InvalidMove::CannotEndWithWild));
    }

    #[test]
    fn emptying_hand_requires_call_game() {
        let top = card(Suit::Hearts, Rank::Seven);
        let hand = vec![card(Suit::Hearts, Rank::King)];
        let err = validate_selection(&hand.clone(), &hand, top, Suit::Hearts, false);
        assert_eq!(err, Err(InvalidMove::MustCallGameFirst));
        assert!(validate_selection(&hand.clone(), &hand, top, Suit::Hearts, true).is_ok());
    }
}
