use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::trace::Location;
use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// How the external agent is run
    pub producer: ProducerConfig,
    /// Replay pacing and display
    pub replay: ReplaySettings,
}

/// Invocation of the external reasoning process
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Interpreter binary, looked up in PATH
    pub executable: String,
    /// Agent script, relative to `working_dir`
    pub script: PathBuf,
    /// Flag placed before the script (`-s` for SWI-Prolog)
    pub script_flag: Option<String>,
    /// Arguments after the script
    pub args: Vec<String>,
    /// Directory the agent runs in
    pub working_dir: PathBuf,
    /// Trace artifact, relative to `working_dir`
    pub trace_file: PathBuf,
    /// Upper bound on a producer run
    pub timeout: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            executable: "swipl".to_string(),
            script: PathBuf::from("wumpus_agent.pl"),
            script_flag: Some("-s".to_string()),
            args: vec![
                "-g".to_string(),
                "start.".to_string(),
                "-t".to_string(),
                "halt.".to_string(),
            ],
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            trace_file: PathBuf::from("kb.txt"),
            timeout: Duration::from_secs(15),
        }
    }
}

impl ProducerConfig {
    /// Arguments passed to the interpreter, script included
    pub fn command_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 2);
        if let Some(flag) = &self.script_flag {
            args.push(flag.clone());
        }
        args.push(self.script.to_string_lossy().into_owned());
        args.extend(self.args.iter().cloned());
        args
    }

    /// Absolute location of the trace artifact
    pub fn trace_path(&self) -> PathBuf {
        self.working_dir.join(&self.trace_file)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplaySettings {
    /// Minimum time between auto-play advances
    pub auto_step_delay: Duration,
    /// Message log capacity
    pub max_log_lines: usize,
    /// Agent location before the first round
    pub start_location: Location,
    /// Start in manual stepping mode
    pub step_mode: bool,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            auto_step_delay: Duration::from_millis(700),
            max_log_lines: 15,
            start_location: Location::new(1, 1),
            step_mode: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlProducerConfig {
    pub executable: Option<String>,
    pub script: Option<PathBuf>,
    pub script_flag: Option<String>,
    pub args: Option<Vec<String>>,
    pub working_dir: Option<PathBuf>,
    pub trace_file: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlReplayConfig {
    pub auto_step_delay_ms: Option<u64>,
    pub max_log_lines: Option<usize>,
    pub start_location: Option<[u32; 2]>,
    pub step_mode: Option<bool>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub producer: Option<TomlProducerConfig>,
    pub replay: Option<TomlReplayConfig>,
}

impl Config {
    /// Load configuration from file, merging with defaults
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        let Ok(contents) = fs::read_to_string(&config_file) else {
            return Config::default();
        };

        match Self::from_toml_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %config_file.display(),
                    error = %err,
                    "Invalid config file, using defaults"
                );
                Config::default()
            }
        }
    }

    /// Parse config file contents and merge them over the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(producer) = toml_config.producer {
            let target = &mut config.producer;
            if let Some(executable) = producer.executable {
                target.executable = executable;
            }
            if let Some(script) = producer.script {
                target.script = script;
            }
            if let Some(flag) = producer.script_flag {
                target.script_flag = (!flag.is_empty()).then_some(flag);
            }
            if let Some(args) = producer.args {
                target.args = args;
            }
            if let Some(dir) = producer.working_dir {
                target.working_dir = dir;
            }
            if let Some(trace_file) = producer.trace_file {
                target.trace_file = trace_file;
            }
            if let Some(secs) = producer.timeout_secs {
                target.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(replay) = toml_config.replay {
            let target = &mut config.replay;
            if let Some(ms) = replay.auto_step_delay_ms {
                target.auto_step_delay = Duration::from_millis(ms);
            }
            if let Some(max) = replay.max_log_lines {
                target.max_log_lines = max.max(1);
            }
            if let Some([x, y]) = replay.start_location {
                match Location::parse(&format!("[{x},{y}]")) {
                    Some(loc) => target.start_location = loc,
                    None => tracing::warn!(x, y, "Ignoring invalid start_location"),
                }
            }
            if let Some(step_mode) = replay.step_mode {
                target.step_mode = step_mode;
            }
        }

        Ok(config)
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.producer.working_dir = dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.producer.timeout = timeout;
        self
    }

    pub fn with_auto_step_delay(mut self, delay: Duration) -> Self {
        self.replay.auto_step_delay = delay;
        self
    }

    pub fn with_step_mode(mut self, step_mode: bool) -> Self {
        self.replay.step_mode = step_mode;
        self
    }
}
