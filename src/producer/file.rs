use std::path::PathBuf;

use async_trait::async_trait;

use crate::producer::error::ProducerError;
use crate::producer::runner::{ProducerOutput, TraceProducer};

/// Replays a trace some earlier run already wrote, without spawning anything.
pub struct FileProducer {
    path: PathBuf,
}

impl FileProducer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TraceProducer for FileProducer {
    async fn produce(&self) -> Result<ProducerOutput, ProducerError> {
        if !self.path.exists() {
            return Err(ProducerError::Unavailable(format!(
                "trace file '{}' not found",
                self.path.display()
            )));
        }
        Ok(ProducerOutput::new(self.path.clone()))
    }

    fn is_available(&self) -> bool {
        self.path.exists()
    }

    fn describe(&self) -> String {
        format!("existing trace {}", self.path.display())
    }
}
