//! Timer state for auto-play.
//!
//! The host loop calls [`AutoPlay::is_due`] on every tick. Switching to
//! step mode or pausing drops the pending deadline, so nothing scheduled
//! before the switch can fire afterwards.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Rounds advance only on explicit request
    Step,
    /// Rounds advance every `delay`
    Auto,
}

impl PlayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayMode::Step => "step",
            PlayMode::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutoPlay {
    mode: PlayMode,
    delay: Duration,
    /// Set while an auto-advance is scheduled
    last_advance: Option<Instant>,
}

impl AutoPlay {
    pub fn new(delay: Duration, step_mode: bool) -> Self {
        Self {
            mode: if step_mode { PlayMode::Step } else { PlayMode::Auto },
            delay,
            last_advance: None,
        }
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.last_advance.is_some()
    }

    /// Schedule the next advance `delay` after `now`. No-op in step mode.
    pub fn arm(&mut self, now: Instant) {
        if self.mode == PlayMode::Auto {
            self.last_advance = Some(now);
        }
    }

    /// Drop any scheduled advance
    pub fn cancel(&mut self) {
        self.last_advance = None;
    }

    /// Restart the delay after an advance, if auto-play is running
    pub fn note_advance(&mut self, now: Instant) {
        if self.last_advance.is_some() {
            self.last_advance = Some(now);
        }
    }

    pub fn set_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
        if mode == PlayMode::Step {
            self.cancel();
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.mode == PlayMode::Auto
            && self
                .last_advance
                .is_some_and(|last| now.saturating_duration_since(last) >= self.delay)
    }
}
