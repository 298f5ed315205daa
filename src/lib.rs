pub mod app;
pub mod config;
pub mod producer;
pub mod replay;
pub mod trace;
pub mod util;

pub use app::App;
pub use config::Config;
pub use producer::{FileProducer, ProcessProducer, ProducerError, TraceProducer};
pub use replay::{AdvanceOutcome, ControllerState, ReplayController, ReplayError};
pub use trace::{parse_trace, ParsedTrace, RoundRecord, TraceError};
