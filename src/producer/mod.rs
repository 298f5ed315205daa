pub mod error;
pub mod file;
pub mod mock;
pub mod process;
pub mod runner;

pub use error::ProducerError;
pub use file::FileProducer;
pub use process::ProcessProducer;
pub use runner::{ProducerOutput, TraceProducer};
