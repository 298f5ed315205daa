//! Integration tests for the replay flow
//!
//! Tests the flow: MockProducer -> trace artifact -> parse -> ReplayController
//! stepping, including the error states a failed producer run leaves behind.

use std::time::{Duration, Instant};

use wumpus_replay::config::ReplaySettings;
use wumpus_replay::producer::mock::{MockConfig, MockFailure};
use wumpus_replay::producer::ProducerError;
use wumpus_replay::replay::{PlayMode, WELCOME_MESSAGE};
use wumpus_replay::trace::{
    Action, EndStatus, Location, ParseWarning, Percept, TraceError, WumpusStatus,
};
use wumpus_replay::{AdvanceOutcome, ControllerState, ReplayError};

use super::common::traces;
use super::common::{mock_controller, mock_controller_with};

const TIMEOUT: Duration = Duration::from_secs(5);

fn at(x: u32, y: u32) -> Location {
    Location::new(x, y)
}

/// A single-round trace parses into one playable round
#[tokio::test]
async fn test_single_round_trace() {
    let (_dir, producer, mut controller) =
        mock_controller(MockConfig::default().with_trace(traces::SINGLE_ROUND), TIMEOUT);

    let count = controller.initialize().await.expect("initialize failed");
    assert_eq!(count, 1);
    assert_eq!(producer.calls(), 1);
    assert_eq!(controller.state(), ControllerState::Ready);

    let round = &controller.rounds()[0];
    assert_eq!(round.index, 0);
    assert_eq!(round.start_location, at(1, 1));
    assert_eq!(round.percepts.stench, Percept::No);
    assert_eq!(round.percepts.breeze, Percept::No);
    assert_eq!(round.percepts.glitter, Percept::No);
    assert_eq!(round.action, Action::Move { target: at(1, 2) });
    assert_eq!(round.time, 1);
    assert_eq!(round.score, -1);
    assert_eq!(round.end_status, EndStatus::Playing);

    controller.start().expect("start failed");
    assert_eq!(controller.cursor(), Some(0));
    assert_eq!(controller.advance().unwrap(), AdvanceOutcome::NoFurtherRounds);
    assert_eq!(controller.state(), ControllerState::Finished);
}

/// A later "no wumpus" line clears an earlier suspicion in the snapshot
#[tokio::test]
async fn test_wumpus_suspicion_is_cleared() {
    let (_dir, _producer, mut controller) = mock_controller(
        MockConfig::default().with_trace(traces::SUSPICION_CLEARED),
        TIMEOUT,
    );
    controller.initialize().await.unwrap();

    let first = &controller.rounds()[0].knowledge;
    assert!(first.maybe_wumpus.contains(&at(2, 3)));

    let last = controller.rounds()[1].knowledge.clone();
    assert!(last.no_wumpus.contains(&at(2, 3)));
    assert!(!last.maybe_wumpus.contains(&at(2, 3)));
    assert!(last.maybe_wumpus.contains(&at(3, 2)));

    controller.start().unwrap();
    controller.advance().unwrap();
    assert_eq!(controller.current().knowledge, last);
}

/// An incomplete block is dropped and the next round takes index 0
#[tokio::test]
async fn test_incomplete_block_is_dropped() {
    let (_dir, _producer, mut controller) = mock_controller(
        MockConfig::default().with_trace(traces::FIRST_BLOCK_INCOMPLETE),
        TIMEOUT,
    );
    assert_eq!(controller.initialize().await.unwrap(), 1);

    let round = &controller.rounds()[0];
    assert_eq!(round.index, 0);
    assert_eq!(round.start_location, at(1, 2));
    assert!(controller.warnings().iter().any(|w| matches!(
        w,
        ParseWarning::IncompleteRound { block: 1, missing } if missing == &vec!["time"]
    )));
    assert!(controller
        .messages()
        .iter()
        .any(|m| m.starts_with("Warning: Incomplete data for block 1")));
}

/// WON! ends the game; further advances are no-ops
#[tokio::test]
async fn test_won_state_is_sticky() {
    let (_dir, _producer, mut controller) =
        mock_controller(MockConfig::default().with_trace(traces::WINNING_GAME), TIMEOUT);
    controller.initialize().await.unwrap();
    assert_eq!(controller.rounds().len(), 3);

    controller.start().unwrap();
    assert_eq!(controller.advance().unwrap(), AdvanceOutcome::Advanced);
    assert_eq!(controller.advance().unwrap(), AdvanceOutcome::Advanced);
    assert_eq!(controller.state(), ControllerState::Won);

    assert_eq!(controller.advance().unwrap(), AdvanceOutcome::NoFurtherRounds);
    assert_eq!(controller.state(), ControllerState::Won);
    assert_eq!(controller.cursor(), Some(2));
    assert!(controller
        .messages()
        .iter()
        .any(|m| m == "--- Simulation WON ---"));
}

/// The shot that kills the wumpus is recorded on the action and the view
#[tokio::test]
async fn test_wumpus_kill_is_tracked() {
    let (_dir, _producer, mut controller) =
        mock_controller(MockConfig::default().with_trace(traces::WINNING_GAME), TIMEOUT);
    controller.initialize().await.unwrap();

    let shot = &controller.rounds()[1];
    assert_eq!(
        shot.action,
        Action::Shoot {
            target: at(3, 1),
            killed: true
        }
    );
    assert_eq!(shot.wumpus_status, WumpusStatus::Dead);
    assert_eq!(shot.wumpus_location, Some(at(3, 1)));
    assert_eq!(controller.rounds()[0].wumpus_status, WumpusStatus::Alive);

    controller.start().unwrap();
    controller.advance().unwrap();
    assert_eq!(controller.current().wumpus_status, WumpusStatus::Dead);
    assert_eq!(controller.current().path, vec![at(1, 1), at(2, 1)]);
}

/// A producer slower than the timeout leaves the controller in Error
#[tokio::test]
async fn test_producer_timeout() {
    let (_dir, _producer, mut controller) = mock_controller(
        MockConfig::default()
            .with_trace(traces::SINGLE_ROUND)
            .with_delay(Duration::from_secs(10)),
        Duration::from_millis(50),
    );

    let err = controller.initialize().await.unwrap_err();
    assert!(
        matches!(err, ReplayError::Producer(ProducerError::Timeout(_))),
        "{err:?}"
    );
    assert_eq!(controller.state(), ControllerState::Error);
    assert!(controller.rounds().is_empty());
}

/// Clean exit without a trace file is reported as a missing artifact
#[tokio::test]
async fn test_missing_artifact() {
    let (_dir, _producer, mut controller) = mock_controller(
        MockConfig::default().failing_with(MockFailure::NoArtifact),
        TIMEOUT,
    );

    let err = controller.initialize().await.unwrap_err();
    assert!(
        matches!(
            err,
            ReplayError::Producer(ProducerError::ArtifactMissing { .. })
        ),
        "{err:?}"
    );
    assert_eq!(controller.state(), ControllerState::Error);
}

/// A failing producer surfaces its output and filters the message log
#[tokio::test]
async fn test_non_zero_exit_surfaces_output() {
    let (_dir, _producer, mut controller) = mock_controller(
        MockConfig::default().failing_with(MockFailure::NonZeroExit {
            code: 1,
            stderr: "Unknown procedure: start/0".to_string(),
        }),
        TIMEOUT,
    );

    let err = controller.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Producer(ProducerError::NonZeroExit { code: Some(1), .. })
    ));
    assert_eq!(controller.state(), ControllerState::Error);

    let messages: Vec<&str> = controller.messages().iter().collect();
    assert!(messages
        .iter()
        .all(|m| *m == WELCOME_MESSAGE || m.contains("ERROR")));
    assert!(messages
        .iter()
        .any(|m| m.contains("stderr") && m.contains("Unknown procedure: start/0")));
    assert!(messages.iter().any(|m| m.ends_with("stdout: --- <empty>")));
}

/// Unavailable producer fails initialization without touching the disk
#[tokio::test]
async fn test_unavailable_producer() {
    let (_dir, producer, mut controller) = mock_controller(
        MockConfig::default().failing_with(MockFailure::Unavailable("swipl missing".to_string())),
        TIMEOUT,
    );

    let err = controller.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Producer(ProducerError::Unavailable(_))
    ));
    assert!(!producer.trace_path().exists());
    assert!(matches!(
        controller.start(),
        Err(ReplayError::InvalidState {
            state: ControllerState::Error,
            ..
        })
    ));
}

/// A trace with delimiters but no complete round is an error
#[tokio::test]
async fn test_trace_without_valid_rounds() {
    let (_dir, _producer, mut controller) = mock_controller(
        MockConfig::default().with_trace(traces::NO_VALID_ROUNDS),
        TIMEOUT,
    );

    let err = controller.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        ReplayError::Trace(TraceError::EmptyTrace { blocks: 2 })
    ));
    assert_eq!(controller.state(), ControllerState::Error);
}

/// Re-running the same trace yields the same rounds and views
#[tokio::test]
async fn test_reinitialize_is_deterministic() {
    let (_dir, producer, mut controller) =
        mock_controller(MockConfig::default().with_trace(traces::WINNING_GAME), TIMEOUT);

    controller.initialize().await.unwrap();
    let first_rounds = controller.rounds().to_vec();
    controller.start().unwrap();
    controller.advance().unwrap();
    let first_view = controller.current().clone();

    controller.reset();
    assert_eq!(controller.state(), ControllerState::Uninitialized);
    assert_eq!(controller.messages().latest(), Some(WELCOME_MESSAGE));

    controller.initialize().await.unwrap();
    assert_eq!(producer.calls(), 2);
    assert_eq!(controller.rounds(), first_rounds.as_slice());
    controller.start().unwrap();
    controller.advance().unwrap();
    assert_eq!(controller.current(), &first_view);
}

/// Initialize from a finished game starts over without an explicit reset
#[tokio::test]
async fn test_initialize_from_terminal_state() {
    let (_dir, _producer, mut controller) =
        mock_controller(MockConfig::default().with_trace(traces::SINGLE_ROUND), TIMEOUT);
    controller.initialize().await.unwrap();
    controller.start().unwrap();
    controller.advance().unwrap();
    assert_eq!(controller.state(), ControllerState::Finished);

    controller.initialize().await.unwrap();
    assert_eq!(controller.state(), ControllerState::Ready);
    assert_eq!(controller.cursor(), None);
}

/// Auto-play advances on due ticks and stops at the end of the game
#[tokio::test]
async fn test_auto_play_runs_to_completion() {
    let settings = ReplaySettings {
        step_mode: false,
        auto_step_delay: Duration::from_millis(100),
        ..ReplaySettings::default()
    };
    let (_dir, _producer, mut controller) = mock_controller_with(
        MockConfig::default().with_trace(traces::WINNING_GAME),
        TIMEOUT,
        settings,
    );
    controller.initialize().await.unwrap();
    controller.start().unwrap();
    assert_eq!(controller.play_mode(), PlayMode::Auto);
    assert!(controller.is_auto_playing());

    let base = Instant::now();
    assert_eq!(controller.tick(base), None);

    let mut now = base;
    let mut steps = 0;
    while controller.is_auto_playing() {
        now += Duration::from_millis(100);
        if controller.tick(now) == Some(AdvanceOutcome::Advanced) {
            steps += 1;
        }
        assert!(steps <= 2, "auto-play overran the trace");
    }
    assert_eq!(steps, 2);
    assert_eq!(controller.state(), ControllerState::Won);
    assert_eq!(controller.tick(now + Duration::from_secs(1)), None);
}

/// Switching to step mode cancels the pending auto-advance
#[tokio::test]
async fn test_step_mode_cancels_auto_advance() {
    let settings = ReplaySettings {
        step_mode: false,
        ..ReplaySettings::default()
    };
    let (_dir, _producer, mut controller) = mock_controller_with(
        MockConfig::default().with_trace(traces::WINNING_GAME),
        TIMEOUT,
        settings,
    );
    controller.initialize().await.unwrap();
    controller.start().unwrap();

    let now = Instant::now();
    assert_eq!(controller.toggle_step_mode(now), PlayMode::Step);
    assert_eq!(controller.tick(now + Duration::from_secs(5)), None);
    assert_eq!(controller.cursor(), Some(0));

    assert_eq!(controller.advance().unwrap(), AdvanceOutcome::Advanced);
    assert_eq!(controller.cursor(), Some(1));
}
