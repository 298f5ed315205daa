//! Mock trace producer for deterministic testing
//!
//! Implements [`TraceProducer`] by writing a pre-configured trace to disk
//! instead of running the Prolog agent. Failure modes and slow producers can
//! be simulated to exercise the replay controller's error paths.
//!
//! # Example
//! ```no_run
//! use wumpus_replay::producer::mock::{MockConfig, MockProducer};
//!
//! let producer = MockProducer::new("/tmp/run")
//!     .with_config(MockConfig::default().with_trace("New Round:\n"));
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::producer::error::ProducerError;
use crate::producer::runner::{ProducerOutput, TraceProducer};

/// Failure to simulate when `produce` is called
#[derive(Clone, Debug)]
pub enum MockFailure {
    Unavailable(String),
    NonZeroExit { code: i32, stderr: String },
    /// Exit cleanly without writing the trace
    NoArtifact,
}

/// Configuration for mock producer behavior
#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    /// Trace text written on success
    pub trace: String,
    /// Delay before completing (simulates a slow agent)
    pub delay: Duration,
    /// Failure to return instead of producing
    pub failure: Option<MockFailure>,
}

impl MockConfig {
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_with(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }
}

pub struct MockProducer {
    working_dir: PathBuf,
    trace_file: PathBuf,
    config: MockConfig,
    calls: AtomicUsize,
}

impl MockProducer {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            trace_file: PathBuf::from("kb.txt"),
            config: MockConfig::default(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_config(mut self, config: MockConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_trace_file(mut self, trace_file: impl Into<PathBuf>) -> Self {
        self.trace_file = trace_file.into();
        self
    }

    /// Number of times `produce` has been called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn trace_path(&self) -> PathBuf {
        self.working_dir.join(&self.trace_file)
    }
}

#[async_trait]
impl TraceProducer for MockProducer {
    async fn produce(&self) -> Result<ProducerOutput, ProducerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }

        match &self.config.failure {
            Some(MockFailure::Unavailable(msg)) => {
                return Err(ProducerError::Unavailable(msg.clone()));
            }
            Some(MockFailure::NonZeroExit { code, stderr }) => {
                return Err(ProducerError::NonZeroExit {
                    code: Some(*code),
                    stdout: String::new(),
                    stderr: stderr.clone(),
                });
            }
            Some(MockFailure::NoArtifact) => {
                let path = self.trace_path();
                if path.exists() {
                    tokio::fs::remove_file(&path).await?;
                }
                return Ok(ProducerOutput::new(path));
            }
            None => {}
        }

        let path = self.trace_path();
        tokio::fs::write(&path, &self.config.trace).await?;
        Ok(ProducerOutput {
            trace_path: path,
            stdout: "mock producer finished".to_string(),
            stderr: String::new(),
        })
    }

    fn is_available(&self) -> bool {
        !matches!(self.config.failure, Some(MockFailure::Unavailable(_)))
    }

    fn describe(&self) -> String {
        format!("mock producer in {}", self.working_dir.display())
    }
}
