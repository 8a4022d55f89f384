use crate::action::Action;
use crate::state::GameStateView;

/// Interface for scripted opponents. A bot sees exactly what a human player
/// at the same seat would see (its own hand plus public table state) and
/// returns one intent per call.
pub trait Bot {
    fn select_action(&mut self, state: &GameStateView) -> Action;
}
