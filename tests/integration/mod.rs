//! Integration tests for wumpus-replay
//!
//! These tests drive the replay controller through the producer seam and
//! the binary through its CLI.

#[path = "../common/mod.rs"]
pub mod common;

pub mod cli_dump;
pub mod replay_flow;
