#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Maze Chase headlessly.
//!
//! The runner builds a session from an optional TOML file and flags, then
//! lets a greedy autopilot play for a fixed number of frames.

mod autopilot;
mod layout_transfer;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use maze_chase_core::GameStatus;
use maze_chase_session::{Session, SessionConfig, SessionEvent};
use maze_chase_world::query;
use tracing_subscriber::EnvFilter;

use autopilot::Autopilot;

/// Headless Maze Chase runner.
#[derive(Debug, Parser)]
#[command(name = "maze-chase", version, about)]
struct Args {
    /// Seed for maze generation and ghost choices; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file holding a session configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Print the first maze as a transfer string and exit.
    #[arg(long)]
    export_maze: bool,
    /// Play the first level on a maze transfer string.
    #[arg(long, value_name = "STRING")]
    maze: Option<String>,
}

/// Entry point for the Maze Chase command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut session = match args.maze.as_deref() {
        Some(encoded) => {
            let maze = layout_transfer::decode(encoded).context("failed to decode --maze")?;
            Session::with_maze(maze, config)
        }
        None => Session::new(config),
    }
    .context("invalid session configuration")?;

    if args.export_maze {
        let encoded = layout_transfer::encode(session.current_maze())
            .context("failed to encode the maze")?;
        println!("{encoded}");
        return Ok(());
    }

    println!("{}", query::welcome_banner(session.world()));
    session.subscribe(|event| match event {
        SessionEvent::LevelAdvanced { level } => println!("level {level}"),
        SessionEvent::GameOver { score } => println!("game over with {score} points"),
        SessionEvent::Paused | SessionEvent::Resumed | SessionEvent::Restarted => {}
    });

    tracing::info!(seed = session.seed(), ticks = args.ticks, "starting autopilot");
    play(&mut session, args.ticks, Duration::from_millis(args.frame_ms));

    let state = session.game_state();
    println!(
        "{}",
        serde_json::to_string_pretty(&state).context("failed to render the final state")?
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn play(session: &mut Session, ticks: u32, frame: Duration) {
    let mut autopilot = Autopilot::default();
    let mut elapsed = Duration::ZERO;
    for _ in 0..ticks {
        if session.game_state().status == GameStatus::GameOver {
            break;
        }
        let heading = autopilot.steer(session.current_maze(), &session.player(), &session.ghosts());
        if heading.is_some() {
            session.set_next_direction(heading);
        }
        elapsed += frame;
        let _ = session.tick(elapsed, frame);
    }
}
