//! Room-based multiplayer relay: rooms apply the same engine as local play,
//! clients only ever submit intents and receive redacted views.

pub mod lobby;
pub mod protocol;
pub mod room;

pub use lobby::{Lobby, RoomCommand};
pub use protocol::{ClientMessage, PlayerSummary, RoomSnapshot, ServerMessage};
pub use room::{MemberId, Room, RoomConfig};
