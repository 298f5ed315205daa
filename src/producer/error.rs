use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures of the external trace producer. All of them end the run.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Producer unavailable: {0}")]
    Unavailable(String),

    #[error("Producer timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("Producer exited with {}", describe_code(.code))]
    NonZeroExit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Producer finished but trace artifact {} was not created", .path.display())]
    ArtifactMissing {
        path: PathBuf,
        stdout: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProducerError {
    /// Captured `(stdout, stderr)` when the process ran far enough to produce output
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            ProducerError::NonZeroExit { stdout, stderr, .. }
            | ProducerError::ArtifactMissing { stdout, stderr, .. } => Some((stdout, stderr)),
            _ => None,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("error code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
