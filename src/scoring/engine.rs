use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, warn};

use super::aggregate::{aggregate_breakdown, AggregateBreakdown};
use super::chords::{select_chords, ChordSource};
use super::harmony::{analyze_harmony, HarmonyBreakdown};
use super::key::KeyDetection;
use super::lyrics::{analyze_lyrics_with, LyricsBreakdown, LyricsMatchers};
use super::originality::{compute_originality, OriginalitySignal};
use super::theme::{scale_to_five, LyricalQuality, QualityMatchers, WeightedLexicon};
use crate::settings::Settings;

/// The rubric aspects the engine can propose a score for. Anything else in
/// the rubric stays with the judges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Dimension {
    #[strum(serialize = "lyrics")]
    Lyrics,
    #[strum(serialize = "theme")]
    Theme,
    #[strum(serialize = "harmony")]
    Harmony,
    #[strum(serialize = "originality")]
    Originality,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongSubmission {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub chord_chart: Option<String>,
}

impl SongSubmission {
    pub fn source_text(&self, source: ChordSource) -> Option<&str> {
        match source {
            ChordSource::ChordChart => self.chord_chart.as_deref(),
            ChordSource::Lyrics => Some(self.lyrics.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongAnalysis {
    pub song_id: String,
    pub title: String,
    pub chord_source: Option<ChordSource>,
    pub chords: Vec<String>,
    pub harmony: HarmonyBreakdown,
    pub lyrics: LyricsBreakdown,
    pub theme_relevance: f64,
    pub theme_score: u8,
    pub lyrical_quality: LyricalQuality,
    pub originality: Option<OriginalitySignal>,
}

impl SongAnalysis {
    pub fn key(&self) -> &KeyDetection {
        &self.harmony.key
    }

    pub fn dimension_score(&self, dimension: Dimension) -> Option<u8> {
        match dimension {
            Dimension::Lyrics => Some(self.lyrics.score),
            Dimension::Theme => Some(self.theme_score),
            Dimension::Harmony => Some(self.harmony.score),
            Dimension::Originality => self.originality.as_ref().map(|o| o.scale_score()),
        }
    }

    /// Engine-proposed 1-5 scores keyed by rubric aspect.
    pub fn suggested_scores(&self) -> BTreeMap<String, f64> {
        Dimension::iter()
            .filter_map(|d| {
                self.dimension_score(d)
                    .map(|score| (d.to_string(), score as f64))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContestReport {
    pub analyses: Vec<SongAnalysis>,
    pub flagged: Vec<String>,
    /// Ids submitted more than once. Only the first submission is scored.
    pub duplicates: Vec<String>,
}

/// Binds the scoring functions to one configuration snapshot. Lexicons are
/// compiled once here and shared by every song scored with this engine.
#[derive(Debug, Clone)]
pub struct ScoringEngine<'a> {
    settings: &'a Settings,
    lyrics: LyricsMatchers,
    theme: WeightedLexicon,
    quality: QualityMatchers,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            lyrics: LyricsMatchers::new(&settings.lexicons),
            theme: WeightedLexicon::new(&settings.theme.keywords, &settings.theme.phrases),
            quality: QualityMatchers::new(&settings.lexicons.quality),
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn score_harmonic_richness<S: AsRef<str>>(&self, chords: &[S]) -> u8 {
        super::harmony::score_harmonic_richness(chords, &self.settings.harmony)
    }

    pub fn score_lyrics_strength(&self, lyrics: &str) -> u8 {
        analyze_lyrics_with(lyrics, &self.lyrics, &self.settings.lyrics).score
    }

    /// Theme relevance against the configured contest lexicon.
    pub fn score_theme_relevance(&self, text: &str) -> f64 {
        self.theme.score(text)
    }

    pub fn score_lyrical_quality(&self, lyrics: &str) -> f64 {
        self.quality.analyze(lyrics).total
    }

    pub fn compute_originality(
        &self,
        all_lyrics: &BTreeMap<String, String>,
    ) -> BTreeMap<String, OriginalitySignal> {
        compute_originality(all_lyrics, self.settings.originality.threshold)
    }

    pub fn aggregate(&self, scores: &BTreeMap<String, f64>) -> AggregateBreakdown {
        aggregate_breakdown(scores, &self.settings.rubric)
    }

    /// Single-song analysis. Originality needs the whole contest and is left
    /// empty here; see [`ScoringEngine::analyze_contest`].
    pub fn analyze_song(&self, song: &SongSubmission) -> SongAnalysis {
        let selection = select_chords(&self.settings.chords.priority, |source| {
            song.source_text(source)
        });
        let harmony = analyze_harmony(&selection.chords, &self.settings.harmony);
        let lyrics = analyze_lyrics_with(&song.lyrics, &self.lyrics, &self.settings.lyrics);
        let theme_relevance = self.score_theme_relevance(&song.lyrics);
        let theme_score = scale_to_five(theme_relevance, &self.settings.lyrics.cuts);
        let lyrical_quality = self.quality.analyze(&song.lyrics);

        debug!(
            song = %song.id,
            chords = selection.chords.len(),
            key = %harmony.key.key,
            harmony = harmony.score,
            lyrics = lyrics.score,
            theme = theme_relevance,
            "analyzed song"
        );

        SongAnalysis {
            song_id: song.id.clone(),
            title: song.title.clone(),
            chord_source: selection.source,
            chords: selection.chords,
            harmony,
            lyrics,
            theme_relevance,
            theme_score,
            lyrical_quality,
            originality: None,
        }
    }

    /// Analyzes every song and runs one originality pass over the snapshot.
    /// Ids must be unique: later submissions reusing an id are skipped and
    /// reported in [`ContestReport::duplicates`].
    pub fn analyze_contest(&self, songs: &[SongSubmission]) -> ContestReport {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        let unique: Vec<&SongSubmission> = songs
            .iter()
            .filter(|song| {
                if seen.insert(song.id.as_str()) {
                    return true;
                }
                warn!(song = %song.id, "duplicate submission id, keeping the first");
                duplicates.push(song.id.clone());
                false
            })
            .collect();

        let mut analyses: Vec<SongAnalysis> = unique.iter().map(|s| self.analyze_song(s)).collect();

        let corpus: BTreeMap<String, String> = unique
            .iter()
            .map(|s| (s.id.clone(), s.lyrics.clone()))
            .collect();
        let signals = self.compute_originality(&corpus);

        let mut flagged = Vec::new();
        for analysis in &mut analyses {
            if let Some(signal) = signals.get(&analysis.song_id) {
                if signal.flagged {
                    flagged.push(analysis.song_id.clone());
                }
                analysis.originality = Some(signal.clone());
            }
        }
        debug!(
            songs = analyses.len(),
            flagged = flagged.len(),
            threshold = self.settings.originality.threshold,
            "originality pass complete"
        );

        ContestReport {
            analyses,
            flagged,
            duplicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::lyrics::score_lyrics_strength;
    use crate::scoring::theme::{score_lyrical_quality, score_theme_relevance};

    fn song(id: &str, lyrics: &str, chart: Option<&str>) -> SongSubmission {
        SongSubmission {
            id: id.into(),
            title: format!("Lagu {id}"),
            lyrics: lyrics.into(),
            chord_chart: chart.map(str::to_string),
        }
    }

    #[test]
    fn test_analyze_song_uses_chart_first() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let analysis = engine.analyze_song(&song(
            "s1",
            "D\nBersama berdoa\nA",
            Some("Intro: C G Am F\nReff: C G7 Am F"),
        ));
        assert_eq!(analysis.chord_source, Some(ChordSource::ChordChart));
        assert_eq!(analysis.chords, vec!["C", "G", "Am", "F", "G7"]);
        assert_eq!(analysis.key().key, "C");
    }

    #[test]
    fn test_analyze_song_falls_back_to_lyrics_chords() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let analysis = engine.analyze_song(&song("s1", "G  D  Em  C\nKasih Tuhan", None));
        assert_eq!(analysis.chord_source, Some(ChordSource::Lyrics));
        assert_eq!(analysis.key().key, "G");
    }

    #[test]
    fn test_analyze_empty_song_uses_floors() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let analysis = engine.analyze_song(&song("empty", "", None));
        assert!(analysis.chord_source.is_none());
        assert_eq!(analysis.harmony.score, 2);
        assert_eq!(analysis.lyrics.score, 1);
        assert_eq!(analysis.theme_relevance, 0.0);
        assert_eq!(analysis.theme_score, 1);
        assert_eq!(analysis.key().key, "?");
    }

    #[test]
    fn test_suggested_scores_cover_dimensions() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let single = engine.analyze_song(&song("s1", "Keluarga berdoa bersama", Some("C F G")));
        let keys: Vec<String> = single.suggested_scores().into_keys().collect();
        assert_eq!(keys, vec!["harmony", "lyrics", "theme"]);

        let report = engine.analyze_contest(&[single_song("a"), single_song("b")]);
        let keys: Vec<String> = report.analyses[0].suggested_scores().into_keys().collect();
        assert_eq!(keys, vec!["harmony", "lyrics", "originality", "theme"]);
    }

    fn single_song(id: &str) -> SongSubmission {
        song(id, "Keluarga berdoa bersama di meja makan", Some("C F G C"))
    }

    #[test]
    fn test_analyze_contest_flags_duplicates() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let report = engine.analyze_contest(&[
            song("a", "Kasih Tuhan\nbagai pelita di rumah kami", None),
            song("b", "Kasih  Tuhan bagai pelita\ndi rumah   kami", None),
            song("c", "Badai laut gelombang tinggi, kapal berlayar jauh", None),
        ]);
        assert_eq!(report.flagged, vec!["a", "b"]);
        let c = report.analyses.iter().find(|a| a.song_id == "c").unwrap();
        assert!(!c.originality.as_ref().unwrap().flagged);
        assert_eq!(c.dimension_score(Dimension::Originality), Some(5));
    }

    #[test]
    fn test_aggregate_with_suggested_scores() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let analysis = engine.analyze_song(&song("s1", "", None));
        let breakdown = engine.aggregate(&analysis.suggested_scores());
        assert!(breakdown.missing.contains(&"singability".to_string()));
        assert!(breakdown.total > 0.0 && breakdown.total < 100.0);
    }

    #[test]
    fn test_engine_passthroughs_match_free_functions() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let lyrics = "Mezbah keluarga, doa bersama di era digital";
        assert_eq!(
            engine.score_theme_relevance(lyrics),
            score_theme_relevance(lyrics, &settings.theme.keywords, &settings.theme.phrases)
        );
        assert!(engine.score_theme_relevance(lyrics) > 0.0);
        assert_eq!(
            engine.score_lyrics_strength(lyrics),
            score_lyrics_strength(lyrics, &settings.lexicons, &settings.lyrics)
        );
        assert_eq!(
            engine.score_lyrical_quality(lyrics),
            score_lyrical_quality(lyrics, &settings.lexicons.quality)
        );
        assert_eq!(engine.score_harmonic_richness(&["C", "F", "G"]), 2);
    }

    #[test]
    fn test_duplicate_ids_keep_first_submission() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let report = engine.analyze_contest(&[
            song("a", "Kasih Tuhan bagai pelita di rumah kami", None),
            song("b", "Badai laut gelombang tinggi, kapal berlayar jauh", None),
            song("a", "Badai laut gelombang tinggi, kapal berlayar jauh", None),
        ]);
        assert_eq!(report.duplicates, vec!["a"]);
        assert_eq!(report.analyses.len(), 2);
        assert!(report.flagged.is_empty());
        let a = report.analyses.iter().find(|a| a.song_id == "a").unwrap();
        assert!(a.lyrics.imagery_hits > 0);
    }

    #[test]
    fn test_multi_verse_song_scores_repeatedly() {
        let settings = Settings::default();
        let engine = ScoringEngine::new(&settings);
        let verse = "Bait:\nDi meja makan kami berdoa bersama\nKasih Tuhan bagai pelita\n\
                     Reff:\nKeluarga beriman teguh dalam kasih\n";
        let lyrics = (1..=4).map(|n| format!("{verse}Ayat {n}\n")).collect::<String>();
        let submission = song("long", &lyrics, Some("C G Am F\nDm7 G C/E Fmaj7"));
        let first = engine.analyze_song(&submission);
        for _ in 0..25 {
            assert_eq!(engine.analyze_song(&submission), first);
        }
        assert_eq!(first.chords.len(), 7);
    }
}
