use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of cards dealt to each player at the start of a match.
pub const HAND_SIZE: usize = 8;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const STANDARD_DECK_SIZE: usize = 52;

/// Suit of a French-deck playing card.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spades,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♦")]
    Diamonds,
    #[serde(rename = "♣")]
    Clubs,
}

impl Suit {
    /// Fixed suit ordering, also used as the AI's tie-break order.
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    #[inline]
    pub fn is_red(&self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Rank of a playing card, Ace low.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Numeric value, Ace = 1 through King = 13.
    #[inline]
    pub fn value(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single playing card. Equality is by (suit, rank); the numeric value is
/// derived from the rank.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    #[inline]
    pub fn is_red(&self) -> bool {
        self.suit.is_red()
    }

    /// True for the ranks that carry a table effect: 8 (wild), 2 (+2 draw),
    /// Jack (repeat/skip) and the Queen of Spades (+5 draw).
    #[inline]
    pub fn is_special(&self) -> bool {
        matches!(self.rank, Rank::Eight | Rank::Two | Rank::Jack)
            || (self.rank == Rank::Queen && self.suit == Suit::Spades)
    }

    /// Static hint text for UI layers. Empty for plain cards.
    pub fn effect_description(&self) -> &'static str {
        match (self.rank, self.suit) {
            (Rank::Eight, _) => "Wild card - choose any suit",
            (Rank::Jack, _) => "Jack - repeat or skip a turn",
            (Rank::Queen, Suit::Spades) => "Queen of Spades - next player draws 5",
            (Rank::Two, _) => "Two - next player draws 2",
            _ => "",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Which physical deck a match is played with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub enum DeckComposition {
    /// The plain 52-card deck.
    #[default]
    Standard,
    /// 52 cards plus four duplicate strategic cards (2♠ 2♥ 8♦ 8♣) for a
    /// faster, more tactical game.
    Extended,
}

impl DeckComposition {
    pub fn deck_size(&self) -> usize {
        match self {
            DeckComposition::Standard => STANDARD_DECK_SIZE,
            DeckComposition::Extended => STANDARD_DECK_SIZE + EXTENDED_EXTRAS.len(),
        }
    }
}

const EXTENDED_EXTRAS: [Card; 4] = [
    Card { suit: Suit::Spades, rank: Rank::Two },
    Card { suit: Suit::Hearts, rank: Rank::Two },
    Card { suit: Suit::Diamonds, rank: Rank::Eight },
    Card { suit: Suit::Clubs, rank: Rank::Eight },
];

/// Builds a deck in deterministic order (unshuffled).
pub fn build_deck(composition: DeckComposition) -> Vec<Card> {
    let mut deck = Vec::with_capacity(composition.deck_size());
    for suit in Suit::ALL {
        for rank in Rank::ALL {
            deck.push(Card::new(suit, rank));
        }
    }
    if composition == DeckComposition::Extended {
        deck.extend(EXTENDED_EXTRAS);
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_deck_is_52_unique_cards() {
        let deck = build_deck(DeckComposition::Standard);
        assert_eq!(deck.len(), 52);
        for (i, a) in deck.iter().enumerate() {
            for b in deck.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn extended_deck_appends_fixed_duplicates() {
        let deck = build_deck(DeckComposition::Extended);
        assert_eq!(deck.len(), 56);
        assert_eq!(&deck[52..], &EXTENDED_EXTRAS);
    }

    #[test]
    fn special_classification() {
        for card in build_deck(DeckComposition::Standard) {
            let expected = matches!(card.rank, Rank::Eight | Rank::Two | Rank::Jack)
                || (card.rank == Rank::Queen && card.suit == Suit::Spades);
            assert_eq!(card.is_special(), expected, "card {card}");
        }
    }

    #[test]
    fn rank_values_follow_rank_order() {
        assert_eq!(Rank::Ace.value(), 1);
        assert_eq!(Rank::Ten.value(), 10);
        assert_eq!(Rank::King.value(), 13);
    }
}
