use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::action::{Action, PlayerId};
use crate::card::{
    Card, DeckComposition, HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS, Rank, Suit, build_deck,
};
use crate::error::{GameError, InvalidMove};
use crate::rules::{self, JackEffect};
use crate::score;
use crate::state::{Effect, GameSettings, GameStateView, Pending, Phase, PlayerPublicState};

const DEFAULT_SEED: u64 = 0x8888_8888_8888_8888;

/// Configuration required to bootstrap a match.
#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub num_players: usize,
    pub seed: u64,
    pub hand_size: usize,
    pub composition: DeckComposition,
    pub jack_effect: JackEffect,
}

impl GameConfig {
    pub fn new(num_players: usize, seed: u64) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
            return Err(GameError::InvalidConfiguration(
                "players must be between 2 and 4",
            ));
        }
        Ok(Self {
            num_players,
            seed,
            hand_size: HAND_SIZE,
            composition: DeckComposition::Standard,
            jack_effect: JackEffect::PlayAgain,
        })
    }
}

/// Builder that enables deterministic deck injection for tests.
pub struct GameBuilder {
    config: GameConfig,
    deck: Option<Vec<Card>>,
}

impl GameBuilder {
    pub fn new(num_players: usize) -> Result<Self, GameError> {
        Ok(Self {
            config: GameConfig::new(num_players, DEFAULT_SEED)?,
            deck: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Overrides the 8-card deal. Small hands keep test scenarios short.
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.config.hand_size = hand_size;
        self
    }

    pub fn with_composition(mut self, composition: DeckComposition) -> Self {
        self.config.composition = composition;
        self
    }

    pub fn with_jack_effect(mut self, jack_effect: JackEffect) -> Self {
        self.config.jack_effect = jack_effect;
        self
    }

    /// Injects a pre-ordered deck and skips the shuffle. Cards are dealt by
    /// popping from the end.
    pub fn with_deck(mut self, deck: Vec<Card>) -> Self {
        self.deck = Some(deck);
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        Game::from_builder(self)
    }
}

/// Authoritative state of one Crazy Eights match.
///
/// All mutation goes through the intent operations (`play_cards`, `draw`,
/// `call_game`, `choose_suit`); a rejected intent is a strict no-op. The
/// whole-deck invariant holds at every point between operations:
/// |draw pile| + |discard pile| + Σ|hands| = deck size.
pub struct Game {
    settings: GameSettings,
    phase: Phase,
    current_player: PlayerId,
    hands: Vec<Vec<Card>>,
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    current_suit: Suit,
    stack_count: u32,
    called_game: Vec<bool>,
    active: Vec<bool>,
    suit_pending: bool,
    rng: StdRng,
}

impl Game {
    pub fn builder(num_players: usize) -> Result<GameBuilder, GameError> {
        GameBuilder::new(num_players)
    }

    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        GameBuilder { config, deck: None }.build()
    }

    fn from_builder(builder: GameBuilder) -> Result<Self, GameError> {
        let GameBuilder { config, deck } = builder;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut draw_pile = match deck {
            Some(deck) => deck,
            None => {
                let mut deck = build_deck(config.composition);
                deck.shuffle(&mut rng);
                deck
            }
        };
        let deck_size = draw_pile.len();

        if config.hand_size == 0 {
            return Err(GameError::InvalidConfiguration(
                "hand size must be at least one card",
            ));
        }
        if deck_size < config.num_players * config.hand_size + 1 {
            return Err(GameError::InvalidConfiguration(
                "deck does not contain enough cards to deal",
            ));
        }

        let mut hands = Vec::with_capacity(config.num_players);
        for _ in 0..config.num_players {
            let split = draw_pile.len() - config.hand_size;
            hands.push(draw_pile.split_off(split));
        }

        // Seed the discard pile with the first non-special card; any special
        // cards skipped over return to the bottom of the draw pile so no
        // card ever leaves play.
        let mut rejected = Vec::new();
        let seed_card = loop {
            match draw_pile.pop() {
                Some(card) if card.is_special() => rejected.push(card),
                Some(card) => break card,
                None => {
                    return Err(GameError::InvalidConfiguration(
                        "deck has no non-special card to seed the discard pile",
                    ));
                }
            }
        };
        if !rejected.is_empty() {
            rejected.extend(draw_pile.drain(..));
            draw_pile = rejected;
        }

        Ok(Game {
            settings: GameSettings {
                num_players: config.num_players,
                hand_size: config.hand_size,
                composition: config.composition,
                jack_effect: config.jack_effect,
                deck_size,
            },
            phase: Phase::InProgress,
            current_player: 0,
            hands,
            draw_pile,
            current_suit: seed_card.suit,
            discard_pile: vec![seed_card],
            stack_count: 0,
            called_game: vec![false; config.num_players],
            active: vec![true; config.num_players],
            suit_pending: false,
            rng,
        })
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending(&self) -> Pending {
        if self.suit_pending {
            Pending::SuitChoice
        } else if self.stack_count > 0 {
            Pending::Penalty
        } else {
            Pending::None
        }
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn current_suit(&self) -> Suit {
        self.current_suit
    }

    pub fn stack_count(&self) -> u32 {
        self.stack_count
    }

    pub fn top_card(&self) -> Card {
        *self
            .discard_pile
            .last()
            .expect("discard pile is seeded at deal time")
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::Ended { winner } => Some(winner),
            Phase::InProgress => None,
        }
    }

    /// Snapshot from one player's perspective; opponent hands are reduced
    /// to counts.
    pub fn state_view(&self, perspective: PlayerId) -> Result<GameStateView, GameError> {
        self.ensure_player(perspective)?;
        let players = self
            .hands
            .iter()
            .enumerate()
            .map(|(id, hand)| PlayerPublicState {
                id,
                card_count: hand.len(),
                called_game: self.called_game[id],
                is_current: id == self.current_player,
            })
            .collect();
        Ok(GameStateView {
            settings: self.settings,
            phase: self.phase,
            pending: self.pending(),
            self_player: perspective,
            current_player: self.current_player,
            current_suit: self.current_suit,
            top_card: self.top_card(),
            stack_count: self.stack_count,
            draw_pile_count: self.draw_pile.len(),
            discard_pile: self.discard_pile.clone(),
            hand: self.hands[perspective].clone(),
            called_game: self.called_game[perspective],
            players,
        })
    }

    /// Dispatches an intent to the matching operation.
    pub fn apply(&mut self, player: PlayerId, action: &Action) -> Result<Vec<Effect>, GameError> {
        match action {
            Action::Play { cards } => self.play_cards(player, cards),
            Action::Draw => self.draw(player),
            Action::CallGame => self.call_game(player),
            Action::ChooseSuit { suit } => self.choose_suit(player, *suit),
        }
    }

    /// Plays one or more same-rank cards onto the discard pile, folding in
    /// each card's effect in order. Cumulative for stacking ranks: two 2s
    /// in one selection add 4 to the stack.
    pub fn play_cards(&mut self, player: PlayerId, cards: &[Card]) -> Result<Vec<Effect>, GameError> {
        self.ensure_turn(player)?;
        rules::validate_selection(
            cards,
            &self.hands[player],
            self.top_card(),
            self.current_suit,
            self.called_game[player],
        )?;
        if self.stack_count > 0 && !cards.iter().copied().any(rules::is_counter) {
            return Err(InvalidMove::MustResolvePenalty {
                stack: self.stack_count,
            }
            .into());
        }

        let mut effects = Vec::with_capacity(cards.len() + 2);
        let mut jack = false;
        let mut eight = false;
        for &card in cards {
            self.remove_from_hand(player, card);
            self.discard_pile.push(card);
            effects.push(Effect::Played { player, card });
            let penalty = rules::stack_penalty(card);
            if penalty > 0 {
                self.stack_count += penalty;
                effects.push(Effect::StackIncreased {
                    by: penalty,
                    total: self.stack_count,
                });
            }
            match card.rank {
                Rank::Jack => jack = true,
                // Suit stays unresolved until the choose-suit intent lands.
                Rank::Eight => eight = true,
                _ => {
                    if self.current_suit != card.suit {
                        self.current_suit = card.suit;
                        effects.push(Effect::SuitChanged { suit: card.suit });
                    }
                }
            }
        }

        if self.hands[player].is_empty() {
            let scores = score::final_scores(&self.hands);
            self.phase = Phase::Ended { winner: player };
            effects.push(Effect::Won { player, scores });
            return Ok(effects);
        }

        if eight {
            self.suit_pending = true;
            effects.push(Effect::SuitPending { player });
            return Ok(effects);
        }

        self.finish_turn(jack, &mut effects);
        Ok(effects)
    }

    /// Resolves the suit of a pending wild 8 and advances the turn.
    pub fn choose_suit(&mut self, player: PlayerId, suit: Suit) -> Result<Vec<Effect>, GameError> {
        self.ensure_active()?;
        self.ensure_player(player)?;
        if player != self.current_player {
            return Err(GameError::NotPlayersTurn);
        }
        if !self.suit_pending {
            return Err(InvalidMove::NoSuitChoicePending.into());
        }
        self.suit_pending = false;
        self.current_suit = suit;
        let mut effects = vec![Effect::SuitChanged { suit }];
        // A wild-8 selection is uniform in rank, so no Jack can ride along;
        // the turn always advances normally here.
        self.finish_turn(false, &mut effects);
        Ok(effects)
    }

    /// Draws from the draw pile. With a penalty pending this draws the whole
    /// stack and resets it; otherwise it draws a single card, and the turn
    /// is kept when that card is immediately playable.
    pub fn draw(&mut self, player: PlayerId) -> Result<Vec<Effect>, GameError> {
        self.ensure_turn(player)?;
        let mut effects = Vec::new();
        if self.stack_count > 0 {
            let owed = self.stack_count as usize;
            let mut drawn = 0;
            for _ in 0..owed {
                match self.draw_one(&mut effects) {
                    Some(card) => {
                        self.hands[player].push(card);
                        drawn += 1;
                    }
                    // Both piles exhausted: the penalty stops short.
                    None => break,
                }
            }
            self.stack_count = 0;
            effects.push(Effect::PenaltyDrawn {
                player,
                count: drawn,
            });
            self.advance_turn();
        } else {
            match self.draw_one(&mut effects) {
                Some(card) => {
                    self.hands[player].push(card);
                    let playable = rules::can_play(card, self.top_card(), self.current_suit);
                    effects.push(Effect::Drew {
                        player,
                        count: 1,
                        playable,
                    });
                    if !playable {
                        self.advance_turn();
                    }
                }
                None => {
                    effects.push(Effect::Drew {
                        player,
                        count: 0,
                        playable: false,
                    });
                    self.advance_turn();
                }
            }
        }
        Ok(effects)
    }

    /// Declares final-card intent. Legal off-turn, but only at hand size 1,
    /// and never from the player suspended on a wild-8 suit choice.
    pub fn call_game(&mut self, player: PlayerId) -> Result<Vec<Effect>, GameError> {
        self.ensure_active()?;
        self.ensure_player(player)?;
        if self.suit_pending && player == self.current_player {
            return Err(InvalidMove::SuitChoicePending.into());
        }
        if self.hands[player].len() != 1 {
            return Err(InvalidMove::CannotCallGame.into());
        }
        if self.called_game[player] {
            return Err(InvalidMove::AlreadyCalledGame.into());
        }
        self.called_game[player] = true;
        Ok(vec![Effect::GameCalled { player }])
    }

    /// Removes a forfeiting player from the match. Their cards go to the
    /// bottom of the draw pile so the whole-deck invariant holds. When one
    /// active player remains they win on the spot.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<Vec<Effect>, GameError> {
        self.ensure_active()?;
        self.ensure_player(player)?;
        if !self.active[player] {
            return Err(GameError::InvalidPlayer(player));
        }
        self.active[player] = false;
        let mut returned = std::mem::take(&mut self.hands[player]);
        returned.extend(self.draw_pile.drain(..));
        self.draw_pile = returned;

        let mut effects = vec![Effect::PlayerRemoved { player }];
        // A pending suit choice always belongs to the current player; the
        // penalty stack transfers to whoever is on turn next.
        if player == self.current_player {
            self.suit_pending = false;
        }

        let mut remaining = (0..self.settings.num_players).filter(|&p| self.active[p]);
        match (remaining.next(), remaining.next()) {
            (Some(winner), None) => {
                let scores = score::final_scores(&self.hands);
                self.phase = Phase::Ended { winner };
                effects.push(Effect::Won {
                    player: winner,
                    scores,
                });
            }
            _ => {
                if player == self.current_player {
                    self.advance_turn();
                }
            }
        }
        Ok(effects)
    }

    pub fn is_active(&self, player: PlayerId) -> bool {
        self.active.get(player).copied().unwrap_or(false)
    }

    fn ensure_active(&self) -> Result<(), GameError> {
        if self.is_finished() {
            return Err(GameError::MatchOver);
        }
        Ok(())
    }

    fn ensure_player(&self, player: PlayerId) -> Result<(), GameError> {
        if player >= self.settings.num_players {
            return Err(GameError::InvalidPlayer(player));
        }
        Ok(())
    }

    fn ensure_turn(&self, player: PlayerId) -> Result<(), GameError> {
        self.ensure_active()?;
        self.ensure_player(player)?;
        if player != self.current_player {
            return Err(GameError::NotPlayersTurn);
        }
        if self.suit_pending {
            return Err(InvalidMove::SuitChoicePending.into());
        }
        Ok(())
    }

    fn finish_turn(&mut self, jack: bool, effects: &mut Vec<Effect>) {
        match (jack, self.settings.jack_effect) {
            (true, JackEffect::PlayAgain) => {
                effects.push(Effect::PlaysAgain {
                    player: self.current_player,
                });
            }
            (true, JackEffect::SkipNext) => {
                self.advance_turn();
                effects.push(Effect::TurnSkipped {
                    player: self.current_player,
                });
                self.advance_turn();
            }
            _ => self.advance_turn(),
        }
    }

    fn advance_turn(&mut self) {
        let num_players = self.settings.num_players;
        let mut next = (self.current_player + 1) % num_players;
        // At least one other seat is active whenever this is reached.
        while !self.active[next] {
            next = (next + 1) % num_players;
        }
        self.current_player = next;
    }

    fn remove_from_hand(&mut self, player: PlayerId, card: Card) {
        let hand = &mut self.hands[player];
        if let Some(index) = hand.iter().position(|&c| c == card) {
            hand.swap_remove(index);
        }
    }

    fn draw_one(&mut self, effects: &mut Vec<Effect>) -> Option<Card> {
        if self.draw_pile.is_empty() {
            self.reshuffle(effects);
        }
        self.draw_pile.pop()
    }

    /// Moves all but the top discard card into a freshly shuffled draw pile.
    fn reshuffle(&mut self, effects: &mut Vec<Effect>) {
        if self.discard_pile.len() <= 1 {
            return;
        }
        let top = self
            .discard_pile
            .pop()
            .expect("discard pile is seeded at deal time");
        self.draw_pile.append(&mut self.discard_pile);
        self.discard_pile.push(top);
        self.draw_pile.shuffle(&mut self.rng);
        effects.push(Effect::Reshuffled {
            draw_pile_count: self.draw_pile.len(),
        });
    }
}
