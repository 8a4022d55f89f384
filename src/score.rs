//! End-of-match scoring.
//!
//! Penalty points over a player's remaining hand:
//!   8 = 50, J/Q/K = 10, A = 1, numerals = face value.
//! The winner holds no cards and therefore scores 0.

use crate::card::{Card, Rank};

/// Point value of a single card left in hand at game end.
pub fn card_points(card: Card) -> u32 {
    match card.rank {
        Rank::Eight => 50,
        Rank::Jack | Rank::Queen | Rank::King => 10,
        Rank::Ace => 1,
        rank => rank.value() as u32,
    }
}

/// Penalty points for one remaining hand.
pub fn hand_points(hand: &[Card]) -> u32 {
    hand.iter().copied().map(card_points).sum()
}

/// Per-player penalty points over all remaining hands, indexed by seat.
pub fn final_scores(hands: &[Vec<Card>]) -> Vec<u32> {
    hands.iter().map(|hand| hand_points(hand)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Suit;

    fn card(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    #[test]
    fn point_table() {
        assert_eq!(card_points(card(Suit::Clubs, Rank::Eight)), 50);
        assert_eq!(card_points(card(Suit::Hearts, Rank::Jack)), 10);
        assert_eq!(card_points(card(Suit::Spades, Rank::Queen)), 10);
        assert_eq!(card_points(card(Suit::Diamonds, Rank::King)), 10);
        assert_eq!(card_points(card(Suit::Spades, Rank::Ace)), 1);
        assert_eq!(card_points(card(Suit::Clubs, Rank::Two)), 2);
        assert_eq!(card_points(card(Suit::Hearts, Rank::Ten)), 10);
        assert_eq!(card_points(card(Suit::Diamonds, Rank::Seven)), 7);
    }

    #[test]
    fn hand_points_sum() {
        let hand = vec![
            card(Suit::Clubs, Rank::Eight),  // 50
            card(Suit::Hearts, Rank::Ace),   // 1
            card(Suit::Spades, Rank::Four),  // 4
            card(Suit::Diamonds, Rank::King), // 10
        ];
        assert_eq!(hand_points(&hand), 65);
    }

    #[test]
    fn final_scores_indexed_by_seat() {
        let hands = vec![
            vec![],
            vec![card(Suit::Hearts, Rank::Nine), card(Suit::Clubs, Rank::Jack)],
        ];
        assert_eq!(final_scores(&hands), vec![0, 19]);
    }
}
