use thiserror::Error;

use crate::action::PlayerId;

/// Errors that can occur when manipulating a match. All variants are
/// recoverable: a rejected operation leaves the game state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("player index {0} is out of range")]
    InvalidPlayer(PlayerId),
    #[error("not the specified player's turn")]
    NotPlayersTurn,
    #[error("invalid move: {0}")]
    InvalidMove(#[from] InvalidMove),
    #[error("the match is already over")]
    MatchOver,
    #[error("no seat can make progress")]
    Stalled,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
}

/// Rule-level rejections for play/draw/call intents.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidMove {
    #[error("no cards selected")]
    EmptySelection,
    #[error("all selected cards must share one rank")]
    MixedRanks,
    #[error("selected card is not in hand")]
    CardNotInHand,
    #[error("selection does not match the current suit or rank")]
    NotPlayable,
    #[error("cannot end the game on a 2 or an 8")]
    CannotEndWithWild,
    #[error("must call game before playing the final card")]
    MustCallGameFirst,
    #[error("must draw the {stack} penalty cards or play a counter card")]
    MustResolvePenalty { stack: u32 },
    #[error("a suit choice is pending for the wild 8")]
    SuitChoicePending,
    #[error("no wild 8 is awaiting a suit choice")]
    NoSuitChoicePending,
    #[error("game can only be called with exactly one card in hand")]
    CannotCallGame,
    #[error("game was already called")]
    AlreadyCalledGame,
}

/// Failures of room and lobby operations on the multiplayer server.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,
    #[error("room is full")]
    Full,
    #[error("only the host can start the game")]
    NotHost,
    #[error("need at least two players to start")]
    NotEnoughPlayers,
    #[error("a game is already running in this room")]
    AlreadyStarted,
    #[error("no game is running in this room")]
    NotStarted,
    #[error("the match is paused while a player reconnects")]
    Paused,
    #[error("player is not a member of this room")]
    NotAMember,
    #[error(transparent)]
    Game(#[from] GameError),
}
