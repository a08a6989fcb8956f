//! vsq CLI: offline rendering and real-time playback of RON scores.
//!
//! Usage:
//!   vsq-cli render path/to/score.ron --duration-ms 4000
//!   vsq-cli play path/to/score.ron --seconds 10
//!
//! Set `RUST_LOG=vsq_engine=debug` to see every fired event.

use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vsq_device::{boot, TracingBus};
use vsq_engine::{Engine, EngineConfig, ExhaustionPolicy};
use vsq_master::{render, Controller, Score, SystemClock};

#[derive(Parser)]
#[command(name = "vsq-cli", version, about = "VS1053 pattern sequencer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a score offline and print the timed MIDI message log.
    Render {
        score: PathBuf,
        /// How long to simulate.
        #[arg(long, default_value_t = 4_000)]
        duration_ms: u32,
        /// Simulated tick interval.
        #[arg(long, default_value_t = 1)]
        step_ms: u32,
    },
    /// Play a score in real time against a logging bus.
    Play {
        score: PathBuf,
        #[arg(long, default_value_t = 10)]
        seconds: u64,
        /// Tick interval of the playback loop.
        #[arg(long, default_value_t = 1)]
        tick_ms: u64,
        /// When all voices are busy, release a new note right away instead
        /// of leaving it sounding.
        #[arg(long)]
        force_off: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Render { score, duration_ms, step_ms } => render_score(&score, duration_ms, step_ms),
        Command::Play { score, seconds, tick_ms, force_off } => {
            play_score(&score, seconds, tick_ms, force_off)
        }
    }
}

fn load_score(path: &Path) -> Result<Score, Box<dyn Error>> {
    let text = fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(Score::from_ron(&text)?)
}

fn render_score(path: &Path, duration_ms: u32, step_ms: u32) -> Result<(), Box<dyn Error>> {
    let score = load_score(path)?;
    let log = render(&score, duration_ms, step_ms)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in &log {
        writeln!(out, "{line}")?;
    }
    info!(messages = log.len(), duration_ms, "render done");
    Ok(())
}

fn play_score(path: &Path, seconds: u64, tick_ms: u64, force_off: bool) -> Result<(), Box<dyn Error>> {
    let score = load_score(path)?;

    let mut bus = TracingBus::new();
    boot(&mut bus)?;

    let exhaustion = if force_off { ExhaustionPolicy::ForceOff } else { ExhaustionPolicy::Drop };
    let config = EngineConfig::default().with_exhaustion(exhaustion);
    let mut engine: Engine<_, _> = Engine::new(bus, SystemClock::new(), config);
    score.apply(&mut engine)?;

    let mut ctrl = Controller::new();
    ctrl.play(engine, score.loop_ms, Duration::from_millis(tick_ms.max(1)));
    println!("Playing {}...", path.display());

    let deadline = Instant::now() + Duration::from_secs(seconds);
    while Instant::now() < deadline {
        if let Some(pos) = ctrl.position() {
            print!("\rPosition: {pos:>6} ms");
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let engine = ctrl.stop().ok_or("playback thread panicked")?;
    let bus = engine.into_bus();
    println!(
        "\rDone. {} register writes, {} MIDI messages.",
        bus.register_writes(),
        bus.messages()
    );
    Ok(())
}
