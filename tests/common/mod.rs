//! Shared test utilities for wumpus-replay
//!
//! Trace fixtures and controller construction helpers used by the
//! integration tests.

pub mod traces;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use wumpus_replay::config::ReplaySettings;
use wumpus_replay::producer::mock::{MockConfig, MockProducer};
use wumpus_replay::ReplayController;

/// Controller over a mock producer writing into a fresh temp dir.
///
/// The `TempDir` must outlive the controller.
pub fn mock_controller(config: MockConfig, timeout: Duration) -> (TempDir, Arc<MockProducer>, ReplayController) {
    mock_controller_with(config, timeout, ReplaySettings::default())
}

pub fn mock_controller_with(
    config: MockConfig,
    timeout: Duration,
    settings: ReplaySettings,
) -> (TempDir, Arc<MockProducer>, ReplayController) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let producer = Arc::new(MockProducer::new(dir.path()).with_config(config));
    let controller = ReplayController::new(producer.clone(), timeout, settings);
    (dir, producer, controller)
}
