use anyhow::{Context, Result};
use clap::Parser;
use songjudge::scoring::{rank_songs, JudgeEvaluation, ScoringEngine, SongSubmission};
use songjudge::settings::Settings;
use songjudge::utils::{log_error, log_flagged, log_init, log_standings, print_song_report};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Scores every submitted song, runs the originality pass over the whole
/// contest and prints the standings.
#[derive(Debug, Parser)]
#[command(name = "songjudge", version)]
struct Args {
    /// JSON array of submissions: `[{"id", "title", "lyrics", "chord_chart"}]`.
    submissions: PathBuf,

    /// JSON array of judge evaluations: `[{"judge", "song_id", "scores": {...}}]`.
    /// Without it the standings use the engine's own aspect scores.
    #[arg(long)]
    evaluations: Option<PathBuf>,

    /// RON settings file; defaults to settings.default.ron / settings.ron.
    #[arg(long, env = "SONGJUDGE_SETTINGS")]
    settings: Option<PathBuf>,

    /// Overrides the originality similarity threshold.
    #[arg(long, env = "SONGJUDGE_THRESHOLD")]
    threshold: Option<f64>,

    /// Only print the flagged songs and standings.
    #[arg(long, short)]
    quiet: bool,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("songjudge=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("setting tracing subscriber")?;

    let args = Args::parse();

    let mut settings = match args.settings {
        Some(ref path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    if let Some(threshold) = args.threshold {
        settings.originality.threshold = threshold;
    }

    let songs: Vec<SongSubmission> = read_json(&args.submissions)?;
    log_init(&settings.version, songs.len());

    let engine = ScoringEngine::new(&settings);
    let report = engine.analyze_contest(&songs);
    info!(songs = report.analyses.len(), flagged = report.flagged.len(), "contest scored");
    for id in &report.duplicates {
        log_error("skipped duplicate submission id", id);
    }

    if !args.quiet {
        for analysis in &report.analyses {
            let aggregate = engine.aggregate(&analysis.suggested_scores());
            print_song_report(analysis, Some(&aggregate));
        }
    }

    log_flagged(&report.flagged, settings.originality.threshold);

    let evaluations: Vec<JudgeEvaluation> = match args.evaluations {
        Some(ref path) => read_json(path)?,
        None => report
            .analyses
            .iter()
            .map(|analysis| JudgeEvaluation {
                judge: "engine".to_string(),
                song_id: analysis.song_id.clone(),
                scores: analysis.suggested_scores(),
            })
            .collect(),
    };
    info!(evaluations = evaluations.len(), "ranking songs");

    let standings = rank_songs(&evaluations, &settings.rubric);
    log_standings(&standings);

    Ok(())
}
