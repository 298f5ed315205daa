//! Cumulative agent knowledge reconstructed from `KB learn` lines.

use serde::Serialize;

use super::classify::TraceEvent;
use super::codec::Location;

/// Insertion-ordered set of locations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LocationSet(Vec<Location>);

impl LocationSet {
    pub fn contains(&self, loc: &Location) -> bool {
        self.0.contains(loc)
    }

    /// Append `loc` unless already present. Returns whether it was added.
    pub fn insert(&mut self, loc: Location) -> bool {
        if self.contains(&loc) {
            return false;
        }
        self.0.push(loc);
        true
    }

    /// Remove `loc` if present. Returns whether it was removed.
    pub fn remove(&mut self, loc: &Location) -> bool {
        let before = self.0.len();
        self.0.retain(|l| l != loc);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Location] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WumpusStatus {
    #[default]
    Alive,
    Dead,
}

/// Frozen copy of the accumulator's sets at the end of one round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KnowledgeSnapshot {
    pub safe: LocationSet,
    pub maybe_wumpus: LocationSet,
    pub no_wumpus: LocationSet,
    pub maybe_pit: LocationSet,
    pub no_pit: LocationSet,
    pub visited: LocationSet,
}

/// Live knowledge state for one parse pass.
///
/// Never reset between rounds; a new parse builds a new accumulator.
#[derive(Debug, Clone)]
pub struct KnowledgeAccumulator {
    sets: KnowledgeSnapshot,
    wumpus_status: WumpusStatus,
    wumpus_location: Option<Location>,
}

impl KnowledgeAccumulator {
    /// Start a parse pass with the agent standing on `start`.
    pub fn new(start: Location) -> Self {
        let mut sets = KnowledgeSnapshot::default();
        sets.visited.insert(start);
        Self {
            sets,
            wumpus_status: WumpusStatus::Alive,
            wumpus_location: None,
        }
    }

    /// Fold one classified event. Events that carry no knowledge are ignored.
    pub fn apply(&mut self, event: &TraceEvent) {
        let sets = &mut self.sets;
        match *event {
            TraceEvent::PositionReport { location } => {
                sets.visited.insert(location);
            }
            TraceEvent::LearnSafe { location } => {
                sets.safe.insert(location);
            }
            TraceEvent::LearnMaybeWumpus { location } => {
                if !sets.no_wumpus.contains(&location) {
                    sets.maybe_wumpus.insert(location);
                }
            }
            TraceEvent::LearnNoWumpus { location } => {
                sets.no_wumpus.insert(location);
                sets.maybe_wumpus.remove(&location);
            }
            TraceEvent::LearnWumpusConfirmed { location } => {
                sets.maybe_wumpus.clear();
                sets.maybe_wumpus.insert(location);
                sets.no_wumpus.remove(&location);
                self.wumpus_location = Some(location);
            }
            TraceEvent::WumpusKilled { .. } => {
                self.wumpus_status = WumpusStatus::Dead;
                sets.maybe_wumpus.clear();
            }
            TraceEvent::LearnMaybePit { location } => {
                if !sets.no_pit.contains(&location) {
                    sets.maybe_pit.insert(location);
                }
            }
            TraceEvent::LearnNoPit { location } => {
                sets.no_pit.insert(location);
                sets.maybe_pit.remove(&location);
            }
            _ => {}
        }
    }

    /// Deep copy of the current sets.
    pub fn snapshot(&self) -> KnowledgeSnapshot {
        self.sets.clone()
    }

    pub fn knowledge(&self) -> &KnowledgeSnapshot {
        &self.sets
    }

    pub fn wumpus_status(&self) -> WumpusStatus {
        self.wumpus_status
    }

    /// Last location the agent proved the wumpus to be at
    pub fn wumpus_location(&self) -> Option<Location> {
        self.wumpus_location
    }
}
