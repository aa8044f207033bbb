#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Harvest Defence experience.

mod config;
mod session;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use harvest_defence_rendering_crossterm::{Terminal, TerminalGuard};
use harvest_defence_system_spawning::Spawning;
use harvest_defence_world::{parse_map, query, World, DEFAULT_MAP};

use config::GameConfig;
use session::Session;

/// Harvest Defence: hold the field, grow the wheat, mind the rats.
#[derive(Debug, Parser)]
#[command(name = "harvest-defence")]
struct Args {
    /// Seed for deterministic runs; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Path to a TOML tuning file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path to a symbolic map file replacing the built-in layout.
    #[arg(long)]
    map: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging()?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let map_text = match &args.map {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading map file {}", path.display()))?,
        None => DEFAULT_MAP.to_owned(),
    };
    // An unrecognised tile code is a fatal configuration error: abort here,
    // before any terminal state changes.
    let map = parse_map(&map_text).context("world map is invalid")?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut seeds = ChaCha8Rng::seed_from_u64(seed);
    tracing::info!(seed, "booting");

    let world = World::from_map(&map, config.world_config(seeds.next_u64()));
    let spawning = Spawning::new(config.spawning_config(seeds.next_u64()));
    tracing::info!("{}", query::welcome_banner(&world));

    let _terminal_guard = TerminalGuard;
    let terminal = Terminal::init()?;
    Session::new(world, spawning, config, terminal).run()
}

/// Routes tracing output to a log file; the terminal belongs to the game.
fn init_logging() -> Result<WorkerGuard> {
    fs::create_dir_all("logs").context("creating log directory")?;
    let appender = tracing_appender::rolling::never("logs", "harvest-defence.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}
