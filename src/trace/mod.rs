//! Trace parsing: literals, line classification, knowledge accumulation and
//! round building.

pub mod classify;
pub mod codec;
pub mod knowledge;
pub mod rounds;

pub use classify::{classify_line, TraceEvent};
pub use codec::{Location, Percept, PerceptVector};
pub use knowledge::{KnowledgeAccumulator, KnowledgeSnapshot, LocationSet, WumpusStatus};
pub use rounds::{
    parse_trace, Action, EndStatus, ParseWarning, ParsedTrace, RoundRecord, TraceError,
    ROUND_DELIMITER,
};
