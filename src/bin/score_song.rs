use anyhow::{Context, Result};
use clap::Parser;
use songjudge::scoring::{ScoringEngine, SongSubmission};
use songjudge::settings::Settings;
use songjudge::utils::{log_error, print_song_report};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Scores a single song and prints every signal behind the numbers.
#[derive(Debug, Parser)]
#[command(name = "score-song", version)]
struct Args {
    /// Lyrics text file. Chords written above the lyric lines are picked up
    /// when no chord chart is given.
    lyrics: PathBuf,

    /// Separate chord chart file.
    #[arg(long, short)]
    chords: Option<PathBuf>,

    #[arg(long, short, default_value = "")]
    title: String,

    #[arg(long, env = "SONGJUDGE_SETTINGS")]
    settings: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let settings = match args.settings {
        Some(ref path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };

    let lyrics = fs::read_to_string(&args.lyrics)
        .with_context(|| format!("reading {}", args.lyrics.display()))?;
    let chord_chart = match args.chords {
        Some(ref path) => Some(
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        None => None,
    };

    let id = args
        .lyrics
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "song".to_string());

    let song = SongSubmission {
        id,
        title: args.title,
        lyrics,
        chord_chart,
    };

    let engine = ScoringEngine::new(&settings);
    let analysis = engine.analyze_song(&song);
    let aggregate = engine.aggregate(&analysis.suggested_scores());
    print_song_report(&analysis, Some(&aggregate));

    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_target(false).compact());
    if set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }

    if let Err(e) = run(Args::parse()) {
        log_error("score-song", &format!("{e:#}"));
        process::exit(1);
    }
}
