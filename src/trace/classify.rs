//! Line classification for agent traces.
//!
//! Every trace line maps to exactly one [`TraceEvent`]. Matching runs
//! through a fixed, ordered pattern table; the first pattern whose regex
//! matches decides the event kind. Lines no pattern claims (and lines whose
//! payload fails to parse) become [`TraceEvent::Unrecognized`].

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

use super::codec::{Location, PerceptVector};

/// Typed event carried by a single trace line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    PositionReport { location: Location },
    PerceptReport { percepts: PerceptVector },
    MoveIntent { target: Location },
    ShootAction { target: Location },
    GrabAction,
    WumpusKilled { location: Location },
    LearnSafe { location: Location },
    LearnMaybeWumpus { location: Location },
    LearnNoWumpus { location: Location },
    LearnWumpusConfirmed { location: Location },
    LearnMaybePit { location: Location },
    LearnNoPit { location: Location },
    LearnGlitter { location: Location },
    LearnGotGold { location: Location },
    Won,
    LostWumpus,
    LostPit,
    TimeUpdate { time: u64 },
    ScoreUpdate { score: i64 },
    /// Line kept verbatim for display, ignored otherwise
    Unrecognized,
}

impl TraceEvent {
    /// Event kind name for logs and diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            TraceEvent::PositionReport { .. } => "PositionReport",
            TraceEvent::PerceptReport { .. } => "PerceptReport",
            TraceEvent::MoveIntent { .. } => "MoveIntent",
            TraceEvent::ShootAction { .. } => "ShootAction",
            TraceEvent::GrabAction => "GrabAction",
            TraceEvent::WumpusKilled { .. } => "WumpusKilled",
            TraceEvent::LearnSafe { .. } => "LearnSafe",
            TraceEvent::LearnMaybeWumpus { .. } => "LearnMaybeWumpus",
            TraceEvent::LearnNoWumpus { .. } => "LearnNoWumpus",
            TraceEvent::LearnWumpusConfirmed { .. } => "LearnWumpusConfirmed",
            TraceEvent::LearnMaybePit { .. } => "LearnMaybePit",
            TraceEvent::LearnNoPit { .. } => "LearnNoPit",
            TraceEvent::LearnGlitter { .. } => "LearnGlitter",
            TraceEvent::LearnGotGold { .. } => "LearnGotGold",
            TraceEvent::Won => "Won",
            TraceEvent::LostWumpus => "LostWumpus",
            TraceEvent::LostPit => "LostPit",
            TraceEvent::TimeUpdate { .. } => "TimeUpdate",
            TraceEvent::ScoreUpdate { .. } => "ScoreUpdate",
            TraceEvent::Unrecognized => "Unrecognized",
        }
    }

    /// Whether the event feeds the knowledge accumulator
    pub fn updates_knowledge(&self) -> bool {
        matches!(
            self,
            TraceEvent::PositionReport { .. }
                | TraceEvent::WumpusKilled { .. }
                | TraceEvent::LearnSafe { .. }
                | TraceEvent::LearnMaybeWumpus { .. }
                | TraceEvent::LearnNoWumpus { .. }
                | TraceEvent::LearnWumpusConfirmed { .. }
                | TraceEvent::LearnMaybePit { .. }
                | TraceEvent::LearnNoPit { .. }
        )
    }

    /// Display text for the round's message list, `None` for bookkeeping
    /// lines (position, percepts, time, score) the viewer shows elsewhere.
    pub fn display_message(&self, line: &str) -> Option<String> {
        match self {
            TraceEvent::PositionReport { .. }
            | TraceEvent::PerceptReport { .. }
            | TraceEvent::TimeUpdate { .. }
            | TraceEvent::ScoreUpdate { .. } => None,
            TraceEvent::LearnSafe { location } => Some(format!("KB learn {location} is OK")),
            TraceEvent::LearnWumpusConfirmed { location } => {
                Some(format!("KB learn Wumpus is definitely at {location}"))
            }
            TraceEvent::Won if line.contains("AGENT GRABBED THE GOLD!!") => {
                Some("AGENT GRABBED THE GOLD!!".to_string())
            }
            _ => Some(line.to_string()),
        }
    }
}

type Build = fn(&Captures<'_>) -> Option<TraceEvent>;

struct Pattern {
    regex: Regex,
    build: Build,
}

const COORD: &str = r"(\[\d+,\d+\])";

fn pattern_table() -> &'static [Pattern] {
    static TABLE: OnceLock<Vec<Pattern>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let raw: [(String, Build); 20] = [
            (format!(r"^I am at {COORD}"), |c| {
                loc(c).map(|location| TraceEvent::PositionReport { location })
            }),
            (r"seeing: (\[.*?\])".to_string(), |c| {
                Some(TraceEvent::PerceptReport {
                    percepts: PerceptVector::parse(&c[1]),
                })
            }),
            (format!(r"^I'm going to: {COORD}"), |c| {
                loc(c).map(|target| TraceEvent::MoveIntent { target })
            }),
            (format!(r"^I shoot an arrow at {COORD}!"), |c| {
                loc(c).map(|target| TraceEvent::ShootAction { target })
            }),
            (r"^I grab the gold!".to_string(), |_| {
                Some(TraceEvent::GrabAction)
            }),
            (format!(r"^Wumpus at {COORD} is killed!"), |c| {
                loc(c).map(|location| TraceEvent::WumpusKilled { location })
            }),
            (format!(r"^KB learn {COORD} (?:is now OK|is OK)"), |c| {
                loc(c).map(|location| TraceEvent::LearnSafe { location })
            }),
            (format!(r"^KB learn {COORD} - maybe there is a Wumpus!"), |c| {
                loc(c).map(|location| TraceEvent::LearnMaybeWumpus { location })
            }),
            (format!(r"^KB learn {COORD} - no Wumpus there!"), |c| {
                loc(c).map(|location| TraceEvent::LearnNoWumpus { location })
            }),
            (format!(r"^KB learn Wumpus is definitely at {COORD}"), |c| {
                loc(c).map(|location| TraceEvent::LearnWumpusConfirmed { location })
            }),
            (format!(r"^KB learn {COORD} - maybe there is a Pit!"), |c| {
                loc(c).map(|location| TraceEvent::LearnMaybePit { location })
            }),
            (format!(r"^KB learn {COORD} - there is no Pit there!"), |c| {
                loc(c).map(|location| TraceEvent::LearnNoPit { location })
            }),
            (format!(r"^KB learn {COORD} - glitter detected!"), |c| {
                loc(c).map(|location| TraceEvent::LearnGlitter { location })
            }),
            (format!(r"^KB learn {COORD} - GOT THE GOLD!!!"), |c| {
                loc(c).map(|location| TraceEvent::LearnGotGold { location })
            }),
            (r"^WON!$".to_string(), |_| Some(TraceEvent::Won)),
            (r"AGENT GRABBED THE GOLD!!".to_string(), |_| {
                Some(TraceEvent::Won)
            }),
            (
                r"Lost: Wumpus eats you!|eaten by the wumpus!".to_string(),
                |_| Some(TraceEvent::LostWumpus),
            ),
            (
                r"Lost: you fell into the pit!|fallen into a pit!".to_string(),
                |_| Some(TraceEvent::LostPit),
            ),
            (r"^New time: (\d+)".to_string(), |c| {
                c[1].parse().ok().map(|time| TraceEvent::TimeUpdate { time })
            }),
            (r"^New score: (-?\d+)".to_string(), |c| {
                c[1].parse().ok().map(|score| TraceEvent::ScoreUpdate { score })
            }),
        ];

        raw.into_iter()
            .filter_map(|(pattern, build)| match Regex::new(&pattern) {
                Ok(regex) => Some(Pattern { regex, build }),
                Err(err) => {
                    tracing::error!(pattern = %pattern, error = %err, "Invalid trace pattern");
                    None
                }
            })
            .collect()
    })
}

fn loc(captures: &Captures<'_>) -> Option<Location> {
    Location::parse(&captures[1])
}

/// Classify one trace line. Surrounding whitespace is ignored.
pub fn classify_line(line: &str) -> TraceEvent {
    let line = line.trim();
    for pattern in pattern_table() {
        if let Some(captures) = pattern.regex.captures(line) {
            return (pattern.build)(&captures).unwrap_or(TraceEvent::Unrecognized);
        }
    }
    TraceEvent::Unrecognized
}
