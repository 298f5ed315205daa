use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wumpus_replay::{parse_trace, util, App, Config, FileProducer, ProcessProducer, TraceProducer};

/// Step through a Wumpus World agent's reasoning trace
#[derive(Parser, Debug)]
#[command(name = "wumpus-replay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Data directory for config and logs (default ~/.wumpus-replay)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory the agent runs in and writes its trace to
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    /// Upper bound on a producer run, in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Start playing immediately instead of stepping manually
    #[arg(long, global = true)]
    auto: bool,

    /// Delay between auto-play steps, in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the configured agent and replay its trace (default)
    Run,
    /// Replay an existing trace file
    Replay { trace: PathBuf },
    /// Parse a trace file and print its rounds as JSON
    Dump { trace: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    // Initialize logging to file (~/.wumpus-replay/logs/wumpus-replay.log)
    fs::create_dir_all(util::logs_dir())?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let config = apply_overrides(Config::load(), &cli);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let producer: Arc<dyn TraceProducer> =
                Arc::new(ProcessProducer::new(config.producer.clone()));
            if !producer.is_available() {
                tracing::warn!(producer = %producer.describe(), "Trace producer not available");
            }
            let mut app = App::new(&config, producer);
            app.run().await
        }
        Command::Replay { trace } => {
            let producer: Arc<dyn TraceProducer> = Arc::new(FileProducer::new(trace));
            let mut app = App::new(&config, producer);
            app.run().await
        }
        Command::Dump { trace } => dump(&config, &trace),
    }
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(dir) = &cli.working_dir {
        config = config.with_working_dir(dir.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(ms) = cli.delay_ms {
        config = config.with_auto_step_delay(Duration::from_millis(ms));
    }
    if cli.auto {
        config = config.with_step_mode(false);
    }
    config
}

fn dump(config: &Config, trace: &Path) -> Result<()> {
    let content = fs::read_to_string(trace)
        .with_context(|| format!("Failed to read trace {}", trace.display()))?;
    let parsed = parse_trace(&content, config.replay.start_location)?;

    for warning in &parsed.warnings {
        eprintln!("warning: {warning}");
    }
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
