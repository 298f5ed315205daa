//! Timeline over parsed rounds.
//!
//! The controller owns the cursor, the lifecycle state and the "current"
//! view a renderer draws. Rounds are parsed once per [`ReplayController::initialize`]
//! and never mutated afterwards; everything the view shows is copied out of
//! the round under the cursor.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::ReplaySettings;
use crate::producer::{ProducerError, TraceProducer};
use crate::replay::autoplay::{AutoPlay, PlayMode};
use crate::replay::message_log::MessageLog;
use crate::trace::{
    parse_trace, EndStatus, KnowledgeAccumulator, KnowledgeSnapshot, Location, ParseWarning,
    ParsedTrace, PerceptVector, RoundRecord, TraceError, WumpusStatus,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Uninitialized,
    Ready,
    Playing,
    Won,
    LostWumpus,
    LostPit,
    Finished,
    Error,
}

impl ControllerState {
    /// Game-over states; sticky until `reset`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ControllerState::Won
                | ControllerState::LostWumpus
                | ControllerState::LostPit
                | ControllerState::Finished
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerState::Uninitialized => "uninitialized",
            ControllerState::Ready => "ready",
            ControllerState::Playing => "playing",
            ControllerState::Won => "won",
            ControllerState::LostWumpus => "lost_wumpus",
            ControllerState::LostPit => "lost_pit",
            ControllerState::Finished => "finished",
            ControllerState::Error => "error",
        }
    }
}

impl From<EndStatus> for ControllerState {
    fn from(status: EndStatus) -> Self {
        match status {
            EndStatus::Playing => ControllerState::Playing,
            EndStatus::Won => ControllerState::Won,
            EndStatus::LostWumpus => ControllerState::LostWumpus,
            EndStatus::LostPit => ControllerState::LostPit,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced,
    /// Cursor already on the last round, or the game is over
    NoFurtherRounds,
}

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Producer(#[from] ProducerError),

    #[error("Could not parse trace: {0}")]
    Trace(#[from] TraceError),

    #[error("Could not read trace {}: {source}", .path.display())]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: ControllerState,
    },
}

/// What the renderer shows right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentView {
    pub location: Location,
    pub percepts: Option<PerceptVector>,
    pub score: i64,
    pub time: u64,
    pub wumpus_status: WumpusStatus,
    pub wumpus_location: Option<Location>,
    pub knowledge: KnowledgeSnapshot,
    /// Distinct consecutive positions walked so far
    pub path: Vec<Location>,
}

impl CurrentView {
    fn initial(start: Location) -> Self {
        Self {
            location: start,
            percepts: None,
            score: 0,
            time: 0,
            wumpus_status: WumpusStatus::Alive,
            wumpus_location: None,
            knowledge: KnowledgeAccumulator::new(start).snapshot(),
            path: vec![start],
        }
    }

    fn adopt(&mut self, round: &RoundRecord) {
        self.location = round.start_location;
        self.percepts = Some(round.percepts);
        self.score = round.score;
        self.time = round.time;
        self.wumpus_status = round.wumpus_status;
        self.wumpus_location = round.wumpus_location;
        self.knowledge = round.knowledge.clone();
        if self.path.last() != Some(&round.start_location) {
            self.path.push(round.start_location);
        }
    }
}

pub struct ReplayController {
    producer: Arc<dyn TraceProducer>,
    timeout: Duration,
    settings: ReplaySettings,
    rounds: Arc<[RoundRecord]>,
    warnings: Vec<ParseWarning>,
    cursor: Option<usize>,
    state: ControllerState,
    current: CurrentView,
    autoplay: AutoPlay,
    messages: MessageLog,
}

impl ReplayController {
    pub fn new(
        producer: Arc<dyn TraceProducer>,
        timeout: Duration,
        settings: ReplaySettings,
    ) -> Self {
        Self {
            producer,
            timeout,
            settings,
            rounds: Arc::from(Vec::new()),
            warnings: Vec::new(),
            cursor: None,
            state: ControllerState::Uninitialized,
            current: CurrentView::initial(settings.start_location),
            autoplay: AutoPlay::new(settings.auto_step_delay, settings.step_mode),
            messages: MessageLog::new(settings.max_log_lines),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Round under the cursor; `None` before `start`
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Read-only handle on the rounds for a renderer running elsewhere
    pub fn shared_rounds(&self) -> Arc<[RoundRecord]> {
        Arc::clone(&self.rounds)
    }

    pub fn current_round(&self) -> Option<&RoundRecord> {
        self.cursor.and_then(|idx| self.rounds.get(idx))
    }

    pub fn current(&self) -> &CurrentView {
        &self.current
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn play_mode(&self) -> PlayMode {
        self.autoplay.mode()
    }

    pub fn is_auto_playing(&self) -> bool {
        self.autoplay.is_running()
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.messages.push(message);
    }

    /// Run the producer and parse its trace.
    ///
    /// Accepted from any state: the previous collection is discarded first.
    /// On failure the controller is left in `Error`.
    pub async fn initialize(&mut self) -> Result<usize, ReplayError> {
        self.discard();
        self.log("--- Initializing Simulation ---");
        let result = match self.produce_trace().await {
            Ok(content) => parse_trace(&content, self.settings.start_location).map_err(Into::into),
            Err(err) => Err(err),
        };
        self.finish_load(result)
    }

    /// Parse `content` directly, bypassing the producer
    pub fn load_trace(&mut self, content: &str) -> Result<usize, ReplayError> {
        self.discard();
        let result = parse_trace(content, self.settings.start_location).map_err(Into::into);
        self.finish_load(result)
    }

    async fn produce_trace(&mut self) -> Result<String, ReplayError> {
        let producer = Arc::clone(&self.producer);
        self.log(format!("Running producer: {}", producer.describe()));

        let output = match tokio::time::timeout(self.timeout, producer.produce()).await {
            Ok(result) => result?,
            Err(_) => return Err(ProducerError::Timeout(self.timeout).into()),
        };
        self.log("Producer executed successfully.");

        if !output.trace_path.exists() {
            return Err(ProducerError::ArtifactMissing {
                path: output.trace_path,
                stdout: output.stdout,
                stderr: output.stderr,
            }
            .into());
        }

        tokio::fs::read_to_string(&output.trace_path)
            .await
            .map_err(|source| ReplayError::ReadArtifact {
                path: output.trace_path.clone(),
                source,
            })
    }

    fn finish_load(&mut self, result: Result<ParsedTrace, ReplayError>) -> Result<usize, ReplayError> {
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        let incomplete: Vec<String> = parsed
            .warnings
            .iter()
            .filter(|w| matches!(w, ParseWarning::IncompleteRound { .. }))
            .map(|w| format!("Warning: {w}"))
            .collect();
        for warning in incomplete {
            self.log(warning);
        }

        let count = parsed.rounds.len();
        self.rounds = Arc::from(parsed.rounds);
        self.warnings = parsed.warnings;
        self.state = ControllerState::Ready;
        self.log(format!("Successfully parsed {count} rounds"));
        self.log(format!(
            "Initialization complete. Agent at {}. Press start.",
            self.current.location
        ));
        tracing::info!(rounds = count, "Replay ready");
        Ok(count)
    }

    fn fail(&mut self, err: &ReplayError) {
        tracing::warn!(error = %err, "Replay initialization failed");
        self.state = ControllerState::Error;
        self.messages.retain_errors();
        self.log(format!("ERROR: {err}"));
        if let ReplayError::Producer(producer_err) = err {
            if let Some((stdout, stderr)) = producer_err.captured_output() {
                let stdout = non_empty(stdout);
                let stderr = non_empty(stderr);
                self.log(format!("ERROR: --- Producer stdout: --- {stdout}"));
                self.log(format!("ERROR: --- Producer stderr: --- {stderr}"));
            }
        }
        self.log("ERROR: Initialization failed.");
    }

    /// Forget rounds and replay progress, keeping the message log
    fn discard(&mut self) {
        self.rounds = Arc::from(Vec::new());
        self.warnings.clear();
        self.cursor = None;
        self.state = ControllerState::Uninitialized;
        self.current = CurrentView::initial(self.settings.start_location);
        self.autoplay.cancel();
    }

    /// Move onto round 0. Requires `Ready`.
    pub fn start(&mut self) -> Result<(), ReplayError> {
        self.start_at(Instant::now())
    }

    /// [`start`](Self::start) with auto-play armed from `now`
    pub fn start_at(&mut self, now: Instant) -> Result<(), ReplayError> {
        if self.state != ControllerState::Ready {
            return Err(self.invalid("start"));
        }
        let Some(first) = self.rounds.first().cloned() else {
            return Err(self.invalid("start"));
        };

        self.cursor = Some(0);
        self.current = CurrentView::initial(first.start_location);
        self.current.adopt(&first);
        self.state = first.end_status.into();
        self.log_step(&first);
        for msg in first.messages.iter().filter(|m| !m.starts_with("I'm going to:")) {
            self.log(msg.clone());
        }

        if self.state.is_terminal() {
            self.log(format!("--- Simulation {} ---", self.state.as_str().to_uppercase()));
        } else if self.autoplay.mode() == PlayMode::Auto {
            self.autoplay.arm(now);
            self.log("Simulation started (Auto Mode).");
        } else {
            self.log("Simulation started (Step Mode). Advance to proceed.");
        }
        Ok(())
    }

    /// Step to the next round.
    ///
    /// Terminal states are sticky: once reached this only reports
    /// `NoFurtherRounds`.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, ReplayError> {
        self.advance_at(Instant::now())
    }

    /// [`advance`](Self::advance) with the auto-play timer restarted from `now`
    pub fn advance_at(&mut self, now: Instant) -> Result<AdvanceOutcome, ReplayError> {
        match self.state {
            ControllerState::Playing => {}
            state if state.is_terminal() => return Ok(AdvanceOutcome::NoFurtherRounds),
            _ => return Err(self.invalid("advance")),
        }

        let next = self.cursor.map_or(0, |idx| idx + 1);
        let Some(round) = self.rounds.get(next).cloned() else {
            self.log("End of simulation data reached.");
            let last = self
                .current_round()
                .map(|r| r.end_status)
                .unwrap_or(EndStatus::Playing);
            self.state = match last {
                EndStatus::Playing => ControllerState::Finished,
                other => other.into(),
            };
            self.autoplay.cancel();
            return Ok(AdvanceOutcome::NoFurtherRounds);
        };

        self.cursor = Some(next);
        self.current.adopt(&round);
        self.state = round.end_status.into();
        self.log_step(&round);
        for msg in &round.messages {
            self.log(msg.clone());
        }

        if self.state.is_terminal() {
            self.autoplay.cancel();
            self.log(format!("--- Simulation {} ---", self.state.as_str().to_uppercase()));
        } else {
            self.autoplay.note_advance(now);
        }
        Ok(AdvanceOutcome::Advanced)
    }

    /// Auto-play hook for the host loop. Advances when a scheduled step is due.
    pub fn tick(&mut self, now: Instant) -> Option<AdvanceOutcome> {
        if self.state != ControllerState::Playing || !self.autoplay.is_due(now) {
            return None;
        }
        let outcome = self.advance_at(now).ok()?;
        if outcome == AdvanceOutcome::NoFurtherRounds {
            self.log("Simulation stopped: End of steps or game over.");
        }
        Some(outcome)
    }

    /// Flip between step and auto mode. Entering step mode cancels any
    /// pending auto-advance.
    pub fn toggle_step_mode(&mut self, now: Instant) -> PlayMode {
        let mode = match self.autoplay.mode() {
            PlayMode::Step => PlayMode::Auto,
            PlayMode::Auto => PlayMode::Step,
        };
        let was_running = self.autoplay.is_running();
        self.autoplay.set_mode(mode);
        self.log(format!(
            "Step Mode toggled to {}.",
            if mode == PlayMode::Step { "ON" } else { "OFF" }
        ));

        match mode {
            PlayMode::Step if was_running => {
                self.log("Simulation paused due to Step Mode ON.");
            }
            PlayMode::Auto if self.state == ControllerState::Playing => {
                self.autoplay.arm(now);
                self.log("Simulation resumed in Auto Mode.");
            }
            _ => {}
        }
        mode
    }

    /// Pause or resume auto-play. Returns whether auto-play is now running.
    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        if self.state != ControllerState::Playing {
            return false;
        }
        if self.autoplay.mode() == PlayMode::Step {
            self.log("Use manual stepping in Step Mode.");
            return false;
        }
        if self.autoplay.is_running() {
            self.autoplay.cancel();
            self.log("Simulation paused.");
            false
        } else {
            self.autoplay.arm(now);
            self.log("Simulation resumed.");
            true
        }
    }

    /// Drop everything parsed and go back to `Uninitialized`
    pub fn reset(&mut self) {
        self.discard();
        self.messages.reset();
        tracing::info!("Replay reset");
    }

    fn log_step(&mut self, round: &RoundRecord) {
        self.log(format!(
            "Step {}: Agent at {}. Percepts: {}. Score: {}, Time: {}. Status: {}",
            round.index,
            round.start_location,
            round.percepts,
            round.score,
            round.time,
            ControllerState::from(round.end_status)
        ));
    }

    fn invalid(&self, operation: &'static str) -> ReplayError {
        ReplayError::InvalidState {
            operation,
            state: self.state,
        }
    }
}

fn non_empty(text: &str) -> &str {
    let text = text.trim();
    if text.is_empty() {
        "<empty>"
    } else {
        text
    }
}
