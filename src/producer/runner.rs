use std::path::PathBuf;

use async_trait::async_trait;

use crate::producer::error::ProducerError;

/// What a successful producer run leaves behind
#[derive(Debug, Clone, Default)]
pub struct ProducerOutput {
    /// Where the trace artifact is expected
    pub trace_path: PathBuf,
    pub stdout: String,
    pub stderr: String,
}

impl ProducerOutput {
    pub fn new(trace_path: PathBuf) -> Self {
        Self {
            trace_path,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Source of agent traces.
///
/// `produce` is the only suspension point of a replay run. Callers bound it
/// with a timeout and drop the future when it expires, so implementations
/// must release their resources on drop (e.g. `kill_on_drop`).
#[async_trait]
pub trait TraceProducer: Send + Sync {
    /// Run the producer to completion
    async fn produce(&self) -> Result<ProducerOutput, ProducerError>;

    /// Check if the producer can run at all
    fn is_available(&self) -> bool;

    /// Short human-readable description for the message log
    fn describe(&self) -> String;
}
