//! Trace fixtures in the agent's output format

/// One plain round
pub const SINGLE_ROUND: &str = "\
New Round:
I am at [1,1]
seeing: [no,no,no]
I'm going to: [1,2]
New time: 1
New score: -1
";

/// Wumpus suspicion raised in round 0, cleared in round 1
pub const SUSPICION_CLEARED: &str = "\
New Round:
I am at [2,2]
seeing: [yes,no,no]
KB learn [2,3] - maybe there is a Wumpus!
KB learn [3,2] - maybe there is a Wumpus!
I'm going to: [2,1]
New time: 1
New score: -1
New Round:
I am at [2,1]
seeing: [no,no,no]
KB learn [2,3] - no Wumpus there!
KB learn [3,1] is OK
I'm going to: [3,1]
New time: 2
New score: -2
";

/// First block lacks `New time:`
pub const FIRST_BLOCK_INCOMPLETE: &str = "\
New Round:
I am at [1,1]
seeing: [no,no,no]
I'm going to: [1,2]
New score: -1
New Round:
I am at [1,2]
seeing: [no,yes,no]
KB learn [1,3] - maybe there is a Pit!
I'm going to: [1,1]
New time: 2
New score: -2
";

/// Three rounds ending in a win
pub const WINNING_GAME: &str = "\
Agent starting
New Round:
I am at [1,1]
seeing: [no,no,no]
KB learn [1,2] is OK
KB learn [2,1] is OK
I'm going to: [2,1]
New time: 1
New score: -1
New Round:
I am at [2,1]
seeing: [yes,no,no]
KB learn Wumpus is definitely at [3,1]
I shoot an arrow at [3,1]!
Wumpus at [3,1] is killed!
New time: 2
New score: -11
New Round:
I am at [2,1]
seeing: [no,no,yes]
I grab the gold!
New time: 3
New score: 989
WON!
";

/// Delimiter present but no round survives
pub const NO_VALID_ROUNDS: &str = "\
New Round:
garbage
New Round:
I am at [1,1]
";
