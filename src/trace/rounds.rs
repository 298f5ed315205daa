//! Groups a raw trace into replayable rounds.

use serde::Serialize;
use thiserror::Error;

use super::classify::{classify_line, TraceEvent};
use super::codec::{Location, PerceptVector};
use super::knowledge::{KnowledgeAccumulator, KnowledgeSnapshot, WumpusStatus};

/// Marker that opens every round block
pub const ROUND_DELIMITER: &str = "New Round:";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("Trace contains no 'New Round:' sections")]
    NoRoundMarker,
    #[error("No valid rounds in trace ({blocks} blocks dropped)")]
    EmptyTrace { blocks: usize },
}

/// Decision taken by the agent in one round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Move {
        target: Location,
    },
    Shoot {
        target: Location,
        killed: bool,
    },
    Grab,
    /// No explicit action reported this round
    #[default]
    None,
}

impl Action {
    pub fn is_none(&self) -> bool {
        matches!(self, Action::None)
    }
}

/// How the game stood at the end of a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndStatus {
    #[default]
    Playing,
    Won,
    LostWumpus,
    LostPit,
}

impl EndStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EndStatus::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EndStatus::Playing => "playing",
            EndStatus::Won => "won",
            EndStatus::LostWumpus => "lost_wumpus",
            EndStatus::LostPit => "lost_pit",
        }
    }
}

/// One decision cycle of the agent, ready for replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundRecord {
    pub index: usize,
    pub start_location: Location,
    pub percepts: PerceptVector,
    pub action: Action,
    pub next_location: Option<Location>,
    pub score: i64,
    pub time: u64,
    pub end_status: EndStatus,
    pub wumpus_status: WumpusStatus,
    pub wumpus_location: Option<Location>,
    pub knowledge: KnowledgeSnapshot,
    pub messages: Vec<String>,
    pub raw_text: String,
}

impl RoundRecord {
    /// True when percepts could not be read and are shown as `?`.
    pub fn percepts_ambiguous(&self) -> bool {
        self.percepts.is_ambiguous()
    }
}

/// Recoverable problems found while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParseWarning {
    /// Line matched no pattern; kept as a display message
    MalformedLine { block: usize, line: String },
    /// Block was missing required fields and was dropped
    IncompleteRound {
        block: usize,
        missing: Vec<&'static str>,
    },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::MalformedLine { block, line } => {
                write!(f, "Unrecognized line in block {}: {}", block, line)
            }
            ParseWarning::IncompleteRound { block, missing } => write!(
                f,
                "Incomplete data for block {} (missing {}). Skipping.",
                block,
                missing.join(", ")
            ),
        }
    }
}

/// Result of a successful parse pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedTrace {
    pub rounds: Vec<RoundRecord>,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedTrace {
    pub fn dropped_rounds(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ParseWarning::IncompleteRound { .. }))
            .count()
    }
}

/// Fields collected from one block before the completeness check
#[derive(Default)]
struct RoundDraft {
    start_location: Option<Location>,
    percepts: Option<PerceptVector>,
    action: Action,
    next_location: Option<Location>,
    score: Option<i64>,
    time: Option<u64>,
    end_status: EndStatus,
    messages: Vec<String>,
}

impl RoundDraft {
    fn fold(&mut self, event: &TraceEvent) {
        match *event {
            TraceEvent::PositionReport { location } => self.start_location = Some(location),
            TraceEvent::PerceptReport { percepts } => self.percepts = Some(percepts),
            TraceEvent::MoveIntent { target } => {
                self.action = Action::Move { target };
                self.next_location = Some(target);
            }
            TraceEvent::ShootAction { target } => {
                self.action = Action::Shoot {
                    target,
                    killed: false,
                };
            }
            TraceEvent::GrabAction => self.action = Action::Grab,
            TraceEvent::WumpusKilled { .. } => {
                if let Action::Shoot { killed, .. } = &mut self.action {
                    *killed = true;
                }
            }
            TraceEvent::LearnGotGold { .. } | TraceEvent::Won => {
                self.end_status = EndStatus::Won;
            }
            TraceEvent::LostWumpus => self.end_status = EndStatus::LostWumpus,
            TraceEvent::LostPit => self.end_status = EndStatus::LostPit,
            TraceEvent::TimeUpdate { time } => self.time = Some(time),
            TraceEvent::ScoreUpdate { score } => self.score = Some(score),
            _ => {}
        }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.start_location.is_none() {
            missing.push("location");
        }
        if self.percepts.is_none() {
            missing.push("percepts");
        }
        if self.action.is_none() && self.next_location.is_none() {
            missing.push("action");
        }
        if self.time.is_none() {
            missing.push("time");
        }
        if self.score.is_none() {
            missing.push("score");
        }
        missing
    }
}

/// Parse a full trace into rounds.
///
/// Text before the first delimiter is discarded. Knowledge accumulates
/// across all blocks, including dropped ones; only complete blocks receive
/// an index, so indices are always `0..rounds.len()`.
pub fn parse_trace(content: &str, start: Location) -> Result<ParsedTrace, TraceError> {
    let mut blocks = content.split(ROUND_DELIMITER);
    blocks.next();
    let blocks: Vec<&str> = blocks.collect();
    if blocks.is_empty() {
        return Err(TraceError::NoRoundMarker);
    }

    let mut knowledge = KnowledgeAccumulator::new(start);
    let mut parsed = ParsedTrace::default();

    for (block_idx, block) in blocks.iter().enumerate() {
        let block_no = block_idx + 1;
        let mut draft = RoundDraft::default();

        for line in block.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let event = classify_line(line);
            if event == TraceEvent::Unrecognized {
                tracing::debug!(block = block_no, line = %line, "Unrecognized trace line");
                parsed.warnings.push(ParseWarning::MalformedLine {
                    block: block_no,
                    line: line.to_string(),
                });
            }
            if event.updates_knowledge() {
                tracing::trace!(block = block_no, kind = event.kind_name(), "Knowledge update");
                knowledge.apply(&event);
            }
            draft.fold(&event);
            if let Some(message) = event.display_message(line) {
                draft.messages.push(message);
            }
        }

        let missing = draft.missing_fields();
        let (Some(start_location), Some(percepts), Some(score), Some(time), true) = (
            draft.start_location,
            draft.percepts,
            draft.score,
            draft.time,
            missing.is_empty(),
        ) else {
            tracing::warn!(block = block_no, missing = ?missing, "Dropping incomplete round");
            parsed.warnings.push(ParseWarning::IncompleteRound {
                block: block_no,
                missing,
            });
            continue;
        };

        parsed.rounds.push(RoundRecord {
            index: parsed.rounds.len(),
            start_location,
            percepts,
            action: draft.action,
            next_location: draft.next_location,
            score,
            time,
            end_status: draft.end_status,
            wumpus_status: knowledge.wumpus_status(),
            wumpus_location: knowledge.wumpus_location(),
            knowledge: knowledge.snapshot(),
            messages: draft.messages,
            raw_text: (*block).to_string(),
        });
    }

    if parsed.rounds.is_empty() {
        return Err(TraceError::EmptyTrace {
            blocks: blocks.len(),
        });
    }

    tracing::info!(
        rounds = parsed.rounds.len(),
        dropped = parsed.dropped_rounds(),
        "Parsed trace"
    );
    Ok(parsed)
}
