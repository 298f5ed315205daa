//! Line-oriented host for the replay controller.
//!
//! Reads single-letter commands from stdin and drives auto-play from a
//! fixed tick, printing the board and latest messages after every change.

use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::producer::TraceProducer;
use crate::replay::{AdvanceOutcome, ControllerState, PlayMode, ReplayController, ReplayError};
use crate::trace::{Location, WumpusStatus};

const TICK: Duration = Duration::from_millis(50);
const MIN_GRID: u32 = 4;
const SHOWN_MESSAGES: usize = 6;

const HELP: &str = "Commands: [Enter]/n next, s start, a toggle auto, p pause, r restart, q quit";

pub struct App {
    controller: ReplayController,
    start_immediately: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, producer: Arc<dyn TraceProducer>) -> Self {
        Self {
            controller: ReplayController::new(
                producer,
                config.producer.timeout,
                config.replay,
            ),
            start_immediately: !config.replay.step_mode,
            should_quit: false,
        }
    }

    pub fn controller(&self) -> &ReplayController {
        &self.controller
    }

    /// Initialize, then run the command loop until `q`, end of input in
    /// step mode, or the end of an auto-played game.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.initialize().await;
        self.print_status()?;

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(outcome) = self.controller.tick(Instant::now()) {
                        self.print_status()?;
                        if outcome == AdvanceOutcome::NoFurtherRounds && !stdin_open {
                            self.should_quit = true;
                        }
                    }
                }

                line = stdin.next_line(), if stdin_open => {
                    match line? {
                        Some(line) => {
                            self.handle_command(line.trim()).await;
                            self.print_status()?;
                        }
                        None => stdin_open = false,
                    }
                }
            }

            if self.should_quit {
                break;
            }
            if !stdin_open && !self.controller.is_auto_playing() {
                break;
            }
        }

        Ok(())
    }

    async fn initialize(&mut self) {
        match self.controller.initialize().await {
            Ok(_) if self.start_immediately => {
                let result = self.controller.start();
                self.report(result);
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "Initialization failed"),
        }
    }

    pub async fn handle_command(&mut self, command: &str) {
        let now = Instant::now();
        match command {
            "" | "n" => {
                let result = if self.controller.state() == ControllerState::Ready {
                    self.controller.start_at(now)
                } else {
                    self.controller.advance_at(now).map(|_| ())
                };
                self.report(result);
            }
            "s" => {
                let result = self.controller.start_at(now);
                self.report(result);
            }
            "a" => {
                self.controller.toggle_step_mode(now);
            }
            "p" => {
                self.controller.toggle_pause(now);
            }
            "r" => {
                self.controller.reset();
                self.initialize().await;
            }
            "q" => self.should_quit = true,
            "h" | "?" => self.controller.log(HELP),
            other => self.controller.log(format!("Unknown command '{other}'. {HELP}")),
        }
    }

    fn report(&mut self, result: Result<(), ReplayError>) {
        if let Err(err) = result {
            self.controller.log(err.to_string());
        }
    }

    fn print_status(&self) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(render(&self.controller).as_bytes())?;
        stdout.flush()
    }
}

/// Text frame for the controller's current view
pub fn render(controller: &ReplayController) -> String {
    let view = controller.current();
    let mut out = String::new();

    let step = controller
        .cursor()
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    let percepts = view
        .percepts
        .map_or_else(|| "-".to_string(), |p| p.to_string());
    let mode = controller.play_mode();
    let paused = if mode == PlayMode::Auto && !controller.is_auto_playing() {
        " (paused)"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "\n== {} | step {} of {} | mode {}{} ==",
        controller.state(),
        step,
        controller.rounds().len(),
        mode.as_str(),
        paused
    );
    let _ = writeln!(
        out,
        "Agent {}  Percepts {}  Score {}  Time {}",
        view.location, percepts, view.score, view.time
    );
    let wumpus = match (view.wumpus_status, view.wumpus_location) {
        (WumpusStatus::Dead, Some(loc)) => format!("dead at {loc}"),
        (WumpusStatus::Dead, None) => "dead".to_string(),
        (WumpusStatus::Alive, Some(loc)) => format!("at {loc}"),
        (WumpusStatus::Alive, None) => "unknown".to_string(),
    };
    let _ = writeln!(out, "Wumpus {wumpus}");

    let size = grid_size(controller);
    for y in (1..=size).rev() {
        let row: Vec<&str> = (1..=size).map(|x| cell(controller, Location::new(x, y))).collect();
        let _ = writeln!(out, "{y:>2} | {}", row.join(" "));
    }
    let _ = writeln!(
        out,
        "     {}",
        (1..=size).map(|x| x.to_string()).collect::<Vec<_>>().join(" ")
    );

    for message in controller.messages().iter().take(SHOWN_MESSAGES) {
        let _ = writeln!(out, "  {message}");
    }
    out
}

fn cell(controller: &ReplayController, loc: Location) -> &'static str {
    let view = controller.current();
    let kb = &view.knowledge;
    if view.location == loc {
        "A"
    } else if view.wumpus_location == Some(loc) {
        match view.wumpus_status {
            WumpusStatus::Alive => "W",
            WumpusStatus::Dead => "x",
        }
    } else if kb.maybe_wumpus.contains(&loc) {
        "w"
    } else if kb.maybe_pit.contains(&loc) {
        "p"
    } else if view.path.contains(&loc) || kb.visited.contains(&loc) {
        "*"
    } else if kb.safe.contains(&loc) {
        "."
    } else {
        "?"
    }
}

fn grid_size(controller: &ReplayController) -> u32 {
    let view = controller.current();
    let kb = &view.knowledge;
    [
        &kb.safe,
        &kb.maybe_wumpus,
        &kb.no_wumpus,
        &kb.maybe_pit,
        &kb.no_pit,
        &kb.visited,
    ]
    .into_iter()
    .flat_map(|set| set.iter())
    .chain(view.path.iter())
    .chain(std::iter::once(&view.location))
    .map(|loc| loc.x.max(loc.y))
    .max()
    .unwrap_or(MIN_GRID)
    .max(MIN_GRID)
}
