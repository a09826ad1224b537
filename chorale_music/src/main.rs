// Chorale generator: CLI entry point.
//
// Reads a job description (JSON), harmonizes the requested sections, grows
// and decodes the rhythm, and prints the composition as JSON: chords, the four
// voice lines, durations and timed note events. Rendering to MIDI or notation
// is left to whatever consumes that output.
//
// Usage:
//   cargo run -p chorale_music --bin generate -- [job.json] [--seed N]
//     [--sections N] [--key NAME] [--rhythm PRESET] [--strategy tree|driven|lazy]
//     [--output PATH] [--outline]
//
// Flags override the job file. `--outline` prints the composition tree of the
// first bass line instead of generating a piece. Log verbosity follows
// RUST_LOG (default `info`); logs go to stderr.

use chorale_music::job::{JobConfig, run_job};
use chorale_music::piece::Strategy;
use chorale_music::{Chord, Harmonizer, HarmonyError, Key};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), HarmonyError> {
    let job_path = args.get(1).filter(|s| !s.starts_with("--"));
    let mut job = match job_path {
        Some(path) => JobConfig::load(Path::new(path))?,
        None => JobConfig::default(),
    };

    if let Some(seed) = parse_flag(args, "--seed") {
        job.seed = seed;
    }
    if let Some(sections) = parse_flag(args, "--sections") {
        job.sections = sections;
    }
    if let Some(name) = parse_flag::<String>(args, "--key") {
        job.key = name.parse::<Key>()?;
    }
    if let Some(rhythm) = parse_flag(args, "--rhythm") {
        job.rhythm = rhythm;
    }
    if let Some(name) = parse_flag::<String>(args, "--strategy") {
        job.strategy = name.parse::<Strategy>()?;
    }

    info!(key = %job.key, seed = job.seed, sections = job.sections, strategy = ?job.strategy, "generating");

    let output = if args.iter().any(|a| a == "--outline") {
        outline(&job)?
    } else {
        let composition = run_job(&job)?;
        info!(
            chords = composition.chords.len(),
            events = composition.events.len(),
            rhythm_symbols = composition.symbols.len(),
            "composition done"
        );
        serde_json::to_string_pretty(&composition)?
    };

    match parse_flag::<String>(args, "--output") {
        Some(path) => {
            std::fs::write(&path, output)?;
            info!(path = %path, "written");
        }
        None => println!("{output}"),
    }
    Ok(())
}

fn outline(job: &JobConfig) -> Result<String, HarmonyError> {
    let line = job.bass_lines.first().ok_or(HarmonyError::EmptyBassLine)?;
    let mut harmonizer = Harmonizer::new(job.key, job.harmony.clone());
    let tree = harmonizer.compose(Chord::from_voices(job.start), line.get(1..).unwrap_or(&[]))?;
    info!(
        nodes = tree.node_count(),
        harmonizations = tree.level(),
        "tree built"
    );
    Ok(tree.outline())
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
