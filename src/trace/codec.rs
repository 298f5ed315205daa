//! Primitive literals found in agent traces: `[X,Y]` coordinates and
//! `[stench,breeze,glitter]` percept vectors.

use std::fmt;

use serde::Serialize;

/// Grid location, 1-indexed. `x` grows rightward, `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub x: u32,
    pub y: u32,
}

impl Location {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Parse a `[<int>,<int>]` token.
    ///
    /// Returns `None` for any other shape, including zero components,
    /// signs, whitespace inside the brackets and trailing text.
    pub fn parse(token: &str) -> Option<Self> {
        let inner = token.trim().strip_prefix('[')?.strip_suffix(']')?;
        let (x, y) = inner.split_once(',')?;
        let x = parse_positive(x)?;
        let y = parse_positive(y)?;
        Some(Self { x, y })
    }
}

fn parse_positive(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse::<u32>().ok().filter(|v| *v > 0)
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.x, self.y)
    }
}

/// Three-valued percept reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Percept {
    Yes,
    No,
    Unknown,
}

impl Percept {
    pub fn as_str(&self) -> &'static str {
        match self {
            Percept::Yes => "yes",
            Percept::No => "no",
            Percept::Unknown => "?",
        }
    }
}

/// Ordered `(stench, breeze, glitter)` triple reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PerceptVector {
    pub stench: Percept,
    pub breeze: Percept,
    pub glitter: Percept,
}

impl PerceptVector {
    pub const NONE: Self = Self::uniform(Percept::No);
    pub const UNKNOWN: Self = Self::uniform(Percept::Unknown);

    pub const fn new(stench: Percept, breeze: Percept, glitter: Percept) -> Self {
        Self {
            stench,
            breeze,
            glitter,
        }
    }

    const fn uniform(value: Percept) -> Self {
        Self::new(value, value, value)
    }

    /// Parse a `[p1,p2,p3]` percept token.
    ///
    /// `yes`/`no` fields map directly. A token made entirely of unbound
    /// Prolog variables (`_123`, `_G42`) reads as `(No, No, No)` because
    /// the log cannot tell "false" from "not evaluated yet". Any other
    /// shape yields [`PerceptVector::UNKNOWN`].
    pub fn parse(token: &str) -> Self {
        let Some(fields) = bracket_fields(token) else {
            return Self::UNKNOWN;
        };
        let [a, b, c] = fields.as_slice() else {
            return Self::UNKNOWN;
        };

        if let (Some(s), Some(br), Some(g)) = (yes_no(a), yes_no(b), yes_no(c)) {
            return Self::new(s, br, g);
        }
        if fields.iter().all(|f| is_unbound_variable(f)) {
            return Self::NONE;
        }
        Self::UNKNOWN
    }

    /// True when at least one field could not be read.
    pub fn is_ambiguous(&self) -> bool {
        [self.stench, self.breeze, self.glitter]
            .iter()
            .any(|p| *p == Percept::Unknown)
    }
}

impl fmt::Display for PerceptVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{},{}]",
            self.stench.as_str(),
            self.breeze.as_str(),
            self.glitter.as_str()
        )
    }
}

fn bracket_fields(token: &str) -> Option<Vec<&str>> {
    let inner = token.trim().strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.split(',').collect())
}

fn yes_no(field: &str) -> Option<Percept> {
    match field {
        "yes" => Some(Percept::Yes),
        "no" => Some(Percept::No),
        _ => None,
    }
}

/// SWI-Prolog prints fresh variables as `_` followed by an identifier
/// (`_123`, `_G123`, `_12345`).
fn is_unbound_variable(field: &str) -> bool {
    field
        .strip_prefix('_')
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric()))
}
