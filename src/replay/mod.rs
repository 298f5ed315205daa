//! Replay engine: cursor, lifecycle, auto-play pacing and the message log.

pub mod autoplay;
pub mod controller;
pub mod message_log;

pub use autoplay::{AutoPlay, PlayMode};
pub use controller::{AdvanceOutcome, ControllerState, CurrentView, ReplayController, ReplayError};
pub use message_log::{MessageLog, WELCOME_MESSAGE};
