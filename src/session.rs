use crate::action::{Action, PlayerId};
use crate::bot::Bot;
use crate::error::GameError;
use crate::game::Game;
use crate::state::{Effect, GameStateView};

/// Who controls a seat in a [`Session`].
pub enum Seat {
    /// Driven from outside through [`Session::apply`].
    Human,
    /// Driven internally whenever the turn reaches this seat.
    Bot(Box<dyn Bot>),
}

impl Seat {
    pub fn bot(bot: impl Bot + 'static) -> Self {
        Seat::Bot(Box::new(bot))
    }
}

/// Bot turns resolved per [`Session::run_bots`] call before the match is
/// declared stuck.
const MAX_BOT_TURNS: usize = 1_000;

/// A match plus its seat assignments. Human intents are forwarded to the
/// engine, after which every consecutive bot turn is resolved immediately,
/// so control only returns with a human on turn or the match over.
pub struct Session {
    game: Game,
    seats: Vec<Seat>,
}

impl Session {
    pub fn new(game: Game, seats: Vec<Seat>) -> Result<Self, GameError> {
        if seats.len() != game.settings().num_players {
            return Err(GameError::InvalidConfiguration(
                "one seat assignment is required per player",
            ));
        }
        Ok(Self { game, seats })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_finished(&self) -> bool {
        self.game.is_finished()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.game.winner()
    }

    pub fn view(&self, player: PlayerId) -> Result<GameStateView, GameError> {
        self.game.state_view(player)
    }

    /// Applies a human intent. A rejected intent returns the error without
    /// touching the match; a successful one also resolves any bot turns
    /// that follow, and the returned effects cover both.
    pub fn apply(&mut self, player: PlayerId, action: &Action) -> Result<Vec<Effect>, GameError> {
        let mut effects = self.game.apply(player, action)?;
        effects.extend(self.run_bots()?);
        Ok(effects)
    }

    /// Resolves bot turns until a human is on turn or the match ends. Called
    /// automatically after [`Session::apply`]; call it once up front when a
    /// bot holds the opening turn.
    ///
    /// An all-bot match where no seat can play or draw would cycle no-op
    /// draws forever, so the loop is bounded and reports
    /// [`GameError::Stalled`] when the bound is hit.
    pub fn run_bots(&mut self) -> Result<Vec<Effect>, GameError> {
        let mut effects = Vec::new();
        for _ in 0..MAX_BOT_TURNS {
            if self.game.is_finished() {
                return Ok(effects);
            }
            let current = self.game.current_player();
            let view = self.game.state_view(current)?;
            let action = match &mut self.seats[current] {
                Seat::Human => return Ok(effects),
                Seat::Bot(bot) => bot.select_action(&view),
            };
            effects.extend(self.game.apply(current, &action)?);
        }
        Err(GameError::Stalled)
    }
}
