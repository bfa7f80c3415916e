//! Asteroids Sim headless runner
//!
//! Drives a session with a scripted pilot and logs the event stream.

use std::path::PathBuf;

use clap::Parser;

use asteroids_sim::sim::{GameEvent, InputEvent, TickInput};
use asteroids_sim::{JsonFileStore, MemoryStore, Session, SessionStore, Tuning};

#[derive(Parser)]
#[command(version, about = "Run the asteroid-field simulation without a display")]
struct Cli {
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of ticks to simulate (60 per second)
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// JSON file holding saved progress and hi score
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// JSON file overriding tuning values
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,

    /// Start a fresh game instead of resuming saved progress
    #[arg(long)]
    new_game: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let tuning = cli
        .tuning
        .as_deref()
        .map(Tuning::load_or_default)
        .unwrap_or_default();

    match cli.save {
        Some(path) => run(JsonFileStore::new(path), tuning, cli.seed, cli.ticks, cli.new_game),
        None => run(MemoryStore::new(), tuning, cli.seed, cli.ticks, cli.new_game),
    }
}

fn run<S: SessionStore>(store: S, tuning: Tuning, seed: u64, ticks: u64, new_game: bool) {
    let mut session = Session::start(store, tuning, seed);
    if new_game {
        session.new_game(seed);
    }

    for t in 0..ticks {
        let frame = session.step(&pilot(t));
        for event in &frame.events {
            log_event(event);
        }
        if session.is_over() {
            break;
        }
    }

    let world = session.world();
    log::info!(
        "Finished after {} ticks: level {}, score {}, hi score {}, lives {}",
        world.time_ticks,
        world.level,
        world.score,
        world.hi_score,
        world.lives
    );
}

/// Scripted pilot: sweep the guns around, nudge forward, jump now and then
fn pilot(t: u64) -> TickInput {
    let mut events = Vec::new();
    match t % 240 {
        0 => events.push(InputEvent::BeginRotateLeft),
        90 => events.push(InputEvent::EndRotate),
        100 => events.push(InputEvent::BeginThrust),
        115 => events.push(InputEvent::EndThrust),
        150 => events.push(InputEvent::BeginRotateRight),
        200 => events.push(InputEvent::EndRotate),
        _ => {}
    }
    if t % 8 == 0 {
        events.push(InputEvent::Fire);
    }
    if t % 1800 == 1799 {
        events.push(InputEvent::Hyperspace);
    }
    TickInput::new(events)
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::AsteroidBroken { .. }
        | GameEvent::EntityDestroyed { .. }
        | GameEvent::PlayerFired
        | GameEvent::EnemyFired => log::debug!("{event:?}"),
        _ => log::info!("{event:?}"),
    }
}
