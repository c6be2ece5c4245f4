pub mod aggregate;
pub mod chords;
pub mod engine;
pub mod harmony;
pub mod key;
pub mod lyrics;
pub mod normalize;
pub mod originality;
pub mod theme;

pub use aggregate::{
    aggregate_breakdown, aggregate_total, rank_songs, AggregateBreakdown, AspectContribution,
    JudgeEvaluation, Standing,
};
pub use chords::{extract_chords, select_chords, ChordSelection, ChordSource, ChordToken};
pub use engine::{ContestReport, Dimension, ScoringEngine, SongAnalysis, SongSubmission};
pub use harmony::{analyze_harmony, score_harmonic_richness, HarmonyBreakdown};
pub use key::{detect_key, KeyDetection};
pub use lyrics::{
    analyze_lyrics, analyze_lyrics_with, score_lyrics_strength, LyricsBreakdown, LyricsMatchers,
};
pub use normalize::normalize_text;
pub use originality::{compute_originality, OriginalitySignal};
pub use theme::{
    analyze_lyrical_quality, scale_to_five, score_lyrical_quality, score_theme_relevance,
    LyricalQuality, QualityMatchers, TermSet, WeightedLexicon,
};
