mod settings;

pub use settings::{Config, ProducerConfig, ReplaySettings, TomlConfig, EXAMPLE_CONFIG};
