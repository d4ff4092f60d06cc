//! # Intonation - Headless Scoring Front-End
//!
//! Command-line host for the intonation scorer. It plays the part of the
//! presentation layer: it feeds expected-note and detected-pitch events to the
//! core and prints the live readout and running score.
//!
//! ## Architecture
//! - **replay**: events from a JSON-lines script are applied in file order on
//!   the main thread
//! - **listen**: events arrive on stdin and are routed into two producer
//!   channels feeding a `Session` on its own scoring thread
//! - **Communication**: crossbeam channels for events and snapshots

mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use intonation_core::{
    MissedNotePolicy, ScoreEvent, ScoreState, ScorerConfig, ScoringEngine, Session,
    SessionInputs, Snapshot, events,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use ui::main_display::{format_readout, format_score, render_snapshot};

#[derive(Parser)]
#[command(name = "intonation", version, about = "Real-time intonation scoring")]
struct Cli {
    /// Scorer config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// In-tune window half-width in cents
    #[arg(long, global = true)]
    tolerance: Option<f64>,

    /// Stability window length in frames
    #[arg(long, global = true)]
    window: Option<usize>,

    /// In-tune frames required within the window
    #[arg(long, global = true)]
    quorum: Option<usize>,

    /// Minimum spacing between credits in milliseconds
    #[arg(long, global = true)]
    cooldown_ms: Option<f64>,

    /// Count uncredited notes as missed when their beat ends
    #[arg(long, global = true)]
    record_missed: bool,

    /// Write a JSON summary of the final score here
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a recorded JSON-lines event script
    Replay {
        /// Script path, one event per line
        script: PathBuf,

        /// Print the readout for every detected frame
        #[arg(long)]
        show_frames: bool,
    },

    /// Score events streamed on stdin until EOF
    Listen,
}

/// Summary written by `--report`.
#[derive(Serialize)]
struct Report<'a> {
    score: ScoreState,
    accuracy: Option<f64>,
    config: &'a ScorerConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = resolve_config(&cli);
    log::info!("Scorer config: {:?}", config);

    let engine = ScoringEngine::new(config.clone()).context("Invalid scorer configuration")?;

    let score = match &cli.command {
        Commands::Replay {
            script,
            show_frames,
        } => replay(engine, script, *show_frames)?,
        Commands::Listen => listen(engine)?,
    };

    println!("Score: {}", format_score(&score));

    if let Some(path) = &cli.report {
        write_report(path, &score, &config)?;
        log::info!("Report written to {}", path.display());
    }
    Ok(())
}

/// Config file (or defaults), then command-line overrides.
fn resolve_config(cli: &Cli) -> ScorerConfig {
    let mut config = match &cli.config {
        Some(path) => ScorerConfig::load_or_default(path),
        None => ScorerConfig::default(),
    };
    if let Some(tolerance) = cli.tolerance {
        config.tolerance_cents = tolerance;
    }
    if let Some(window) = cli.window {
        config.window_size = window;
    }
    if let Some(quorum) = cli.quorum {
        config.required_ok_count = quorum;
    }
    if let Some(cooldown_ms) = cli.cooldown_ms {
        config.cooldown_ms = cooldown_ms;
    }
    if cli.record_missed {
        config.missed_notes = MissedNotePolicy::Record;
    }
    config
}

fn replay(engine: ScoringEngine, script: &Path, show_frames: bool) -> Result<ScoreState> {
    let file = File::open(script)
        .with_context(|| format!("Failed to open script {}", script.display()))?;
    replay_events(engine, BufReader::new(file), show_frames)
        .with_context(|| format!("Failed to replay script {}", script.display()))
}

/// Applies a whole event script in order on the calling thread.
fn replay_events<R: BufRead>(
    mut engine: ScoringEngine,
    reader: R,
    show_frames: bool,
) -> Result<ScoreState> {
    let events = events::read_script(reader)?;
    log::info!("Replaying {} events", events.len());

    for event in &events {
        match event {
            ScoreEvent::Expected(expected) => engine.on_expected(expected),
            ScoreEvent::Detected(detected) => {
                let outcome = engine.on_detected(detected);
                if show_frames {
                    println!(
                        "{:>8.3}s  {:<18} {}{}",
                        detected.t_sec,
                        format_readout(&outcome.readout),
                        format_score(&engine.score()),
                        if outcome.credit.is_some() { "  +1" } else { "" }
                    );
                }
            }
        }
    }

    engine.stop();
    Ok(engine.score())
}

fn listen(engine: ScoringEngine) -> Result<ScoreState> {
    let tolerance = engine.config().tolerance_cents;
    let stdin = io::stdin();
    route_events(engine, stdin.lock(), |snapshot| {
        println!("{}", render_snapshot(snapshot, tolerance));
    })
}

/// Routes script lines to the two producer channels of a `Session`.
///
/// A piped script is not paced like live producers, so each event waits for
/// its snapshot before the next one is sent. This keeps the file order across
/// the two channels and gives the same score as `replay_events`.
fn route_events<R: BufRead, F: FnMut(&Snapshot)>(
    engine: ScoringEngine,
    reader: R,
    mut on_snapshot: F,
) -> Result<ScoreState> {
    let (expected_tx, expected_rx) = crossbeam_channel::unbounded();
    let (detected_tx, detected_rx) = crossbeam_channel::unbounded();
    let (snapshot_tx, snapshot_rx) = crossbeam_channel::unbounded();

    let session = Session::spawn(
        engine,
        SessionInputs {
            expected: expected_rx,
            detected: detected_rx,
        },
        snapshot_tx,
    )?;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read event stream")?;
        let sent = match events::parse_line(&line) {
            Ok(Some(ScoreEvent::Expected(event))) => expected_tx.send(event).is_ok(),
            Ok(Some(ScoreEvent::Detected(event))) => detected_tx.send(event).is_ok(),
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Skipping line {}: {:#}", index + 1, e);
                continue;
            }
        };
        if !sent {
            break;
        }
        match snapshot_rx.recv() {
            Ok(snapshot) => on_snapshot(&snapshot),
            Err(_) => break,
        }
    }
    drop(expected_tx);
    drop(detected_tx);

    let engine = session.join()?;
    Ok(engine.score())
}

fn write_report(path: &Path, score: &ScoreState, config: &ScorerConfig) -> Result<()> {
    let report = Report {
        score: *score,
        accuracy: score.accuracy(),
        config,
    };
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}
