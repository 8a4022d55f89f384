pub mod random;
pub mod scripted;

pub use random::RandomBot;
pub use scripted::ScriptedBot;
