use std::collections::HashSet;

use super::normalize::{normalize_text, normalized_lines};
use super::theme::{scale_to_five, TermSet};
use crate::settings::{Lexicons, LyricsWeights};

pub const MIN_LYRICS_SCORE: u8 = 1;

pub const STRUCTURE_ANY_SECTION: u32 = 2;
pub const STRUCTURE_MULTIPLE_SECTIONS: u32 = 1;
pub const STRUCTURE_LINE_VARIETY: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct LyricsBreakdown {
    pub theme_hits: usize,
    pub family_hits: usize,
    pub faith_hits: usize,
    pub relation_hits: usize,
    pub imagery_hits: usize,
    pub section_markers: usize,
    pub line_uniqueness: f64,
    pub structure: u32,
    pub cliche_hits: usize,
    pub unresolved_distraction: bool,
    pub penalty: u32,
    pub composite: f64,
    pub score: u8,
    pub penalty_reasons: Vec<String>,
}

impl Default for LyricsBreakdown {
    fn default() -> Self {
        Self {
            theme_hits: 0,
            family_hits: 0,
            faith_hits: 0,
            relation_hits: 0,
            imagery_hits: 0,
            section_markers: 0,
            line_uniqueness: 0.0,
            structure: 0,
            cliche_hits: 0,
            unresolved_distraction: false,
            penalty: 0,
            composite: 0.0,
            score: MIN_LYRICS_SCORE,
            penalty_reasons: Vec::new(),
        }
    }
}

/// The lyric lexicons compiled once. Clichés match as whole phrases, every
/// other list as stems.
#[derive(Debug, Clone, Default)]
pub struct LyricsMatchers {
    deep_theme: TermSet,
    family: TermSet,
    faith: TermSet,
    imagery: TermSet,
    section_markers: TermSet,
    cliche: TermSet,
    distraction: TermSet,
    resolution: TermSet,
}

impl LyricsMatchers {
    pub fn new(lexicons: &Lexicons) -> Self {
        Self {
            deep_theme: TermSet::stems(&lexicons.deep_theme),
            family: TermSet::stems(&lexicons.family),
            faith: TermSet::stems(&lexicons.faith),
            imagery: TermSet::stems(&lexicons.imagery),
            section_markers: TermSet::stems(&lexicons.section_markers),
            cliche: TermSet::phrases(&lexicons.cliche),
            distraction: TermSet::stems(&lexicons.distraction),
            resolution: TermSet::stems(&lexicons.resolution),
        }
    }
}

fn fraction(value: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        0.0
    } else {
        value / cap
    }
}

/// Share of distinct lines among all non-empty lines.
pub fn line_uniqueness(text: &str) -> f64 {
    let lines = normalized_lines(text);
    if lines.is_empty() {
        return 0.0;
    }
    let distinct = lines.iter().collect::<HashSet<_>>().len();
    distinct as f64 / lines.len() as f64
}

pub fn analyze_lyrics(text: &str, lexicons: &Lexicons, weights: &LyricsWeights) -> LyricsBreakdown {
    analyze_lyrics_with(text, &LyricsMatchers::new(lexicons), weights)
}

pub fn analyze_lyrics_with(
    text: &str,
    matchers: &LyricsMatchers,
    weights: &LyricsWeights,
) -> LyricsBreakdown {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return LyricsBreakdown::default();
    }

    let mut penalties = Vec::new();

    let theme_hits = matchers.deep_theme.total_hits(&normalized).min(weights.theme_cap);

    let family_hits = matchers.family.total_hits(&normalized);
    let faith_hits = matchers.faith.total_hits(&normalized);
    let relation_hits = (family_hits + faith_hits).min(weights.relation_cap);

    let imagery_hits = matchers.imagery.distinct_present(&normalized).min(weights.imagery_cap);

    let section_markers = matchers.section_markers.distinct_present(&normalized);
    let uniqueness = line_uniqueness(text);
    let mut structure = 0;
    if section_markers >= 1 {
        structure += STRUCTURE_ANY_SECTION;
    }
    if section_markers >= 2 {
        structure += STRUCTURE_MULTIPLE_SECTIONS;
    }
    if uniqueness >= weights.line_uniqueness_min {
        structure += STRUCTURE_LINE_VARIETY;
    }
    let structure = structure.min(weights.structure_max);

    let cliche_hits = matchers.cliche.total_hits(&normalized);
    let cliche_penalty = cliche_hits.min(weights.cliche_cap) as u32;
    if cliche_penalty > 0 {
        penalties.push(format!("{cliche_hits} cliche(s) (-{cliche_penalty})"));
    }

    let unresolved_distraction = matchers.distraction.contains_any(&normalized)
        && !matchers.resolution.contains_any(&normalized);
    let distraction_penalty = if unresolved_distraction {
        penalties.push(format!(
            "unresolved distraction (-{})",
            weights.distraction_penalty
        ));
        weights.distraction_penalty
    } else {
        0
    };

    let penalty = (cliche_penalty + distraction_penalty).min(weights.penalty_max);

    let composite = (weights.theme * fraction(theme_hits as f64, weights.theme_cap as f64)
        + weights.relation * fraction(relation_hits as f64, weights.relation_cap as f64)
        + weights.imagery * fraction(imagery_hits as f64, weights.imagery_cap as f64)
        + weights.structure * fraction(structure as f64, weights.structure_max as f64)
        - weights.penalty * fraction(penalty as f64, weights.penalty_max as f64))
    .clamp(0.0, 100.0);

    LyricsBreakdown {
        theme_hits,
        family_hits,
        faith_hits,
        relation_hits,
        imagery_hits,
        section_markers,
        line_uniqueness: uniqueness,
        structure,
        cliche_hits,
        unresolved_distraction,
        penalty,
        composite,
        score: scale_to_five(composite, &weights.cuts),
        penalty_reasons: penalties,
    }
}

/// 1-5 lyric strength; empty text scores 1.
pub fn score_lyrics_strength(text: &str, lexicons: &Lexicons, weights: &LyricsWeights) -> u8 {
    analyze_lyrics(text, lexicons, weights).score
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_LYRICS: &str = "Bait 1:\n\
        Di meja makan kami berkumpul bersama\n\
        Ayah dan ibu berdoa dengan setia\n\
        Kasih Tuhan bagai pelita di rumah\n\
        Reff:\n\
        Keluarga yang beriman, teguh dalam kasih\n\
        Seperti pohon berakar di firman-Mu\n\
        Pengharapan dan damai, syukur tiada henti\n\
        Bersatu dalam doa, pulih oleh anugerah";

    fn score(text: &str) -> LyricsBreakdown {
        analyze_lyrics(text, &Lexicons::default(), &LyricsWeights::default())
    }

    #[test]
    fn test_empty_scores_one() {
        assert_eq!(
            score_lyrics_strength("", &Lexicons::default(), &LyricsWeights::default()),
            1
        );
        assert_eq!(score("  \n!!\n").score, 1);
    }

    #[test]
    fn test_family_only_is_low_tier() {
        let breakdown = score("Keluarga\nKeluarga kecil\nKeluarga bahagia");
        assert_eq!(breakdown.family_hits, 3);
        assert_eq!(breakdown.faith_hits, 0);
        assert_eq!(breakdown.theme_hits, 0);
        assert!(breakdown.score <= 2);
    }

    #[test]
    fn test_strong_lyrics_reach_top_tier() {
        let breakdown = score(STRONG_LYRICS);
        assert_eq!(breakdown.theme_hits, 8);
        assert_eq!(breakdown.section_markers, 2);
        assert_eq!(breakdown.structure, 4);
        assert_eq!(breakdown.penalty, 0);
        assert!(breakdown.composite > 80.0);
        assert_eq!(breakdown.score, 5);
    }

    #[test]
    fn test_unresolved_distraction_penalized() {
        let lost = score("Sibuk dengan gawai, lupa bicara\nLayar menyala sepanjang malam");
        assert!(lost.unresolved_distraction);
        assert_eq!(lost.penalty, 2);
        assert!(lost.penalty_reasons.iter().any(|r| r.contains("distraction")));

        let found = score(
            "Sibuk dengan gawai, lupa bicara\nLayar menyala sepanjang malam\nKembali berdoa bersama",
        );
        assert!(!found.unresolved_distraction);
        assert_eq!(found.penalty, 0);
    }

    #[test]
    fn test_cliches_capped() {
        let breakdown = score("Cinta sejati, sehidup semati, cinta mati");
        assert_eq!(breakdown.cliche_hits, 3);
        assert_eq!(breakdown.penalty, 2);
    }

    #[test]
    fn test_cliches_need_whole_words() {
        let breakdown = score("Cinta matikan rindu, cinta sejatinya");
        assert_eq!(breakdown.cliche_hits, 0);
        assert_eq!(breakdown.penalty, 0);
    }

    #[test]
    fn test_everyday_words_are_not_similes() {
        let breakdown = score("kita bakal bakar baki bakti");
        assert_eq!(breakdown.imagery_hits, 0);
    }

    #[test]
    fn test_compiled_matchers_reused_across_songs() {
        let matchers = LyricsMatchers::new(&Lexicons::default());
        let weights = LyricsWeights::default();
        let song = format!("{STRONG_LYRICS}\n").repeat(4);
        let first = analyze_lyrics_with(&song, &matchers, &weights);
        assert_eq!(first.score, 5);
        for _ in 0..50 {
            assert_eq!(analyze_lyrics_with(&song, &matchers, &weights), first);
        }
        assert_eq!(analyze_lyrics_with(STRONG_LYRICS, &matchers, &weights), score(STRONG_LYRICS));
    }

    #[test]
    fn test_penalty_lowers_composite() {
        let clean = score(STRONG_LYRICS);
        let noisy = score(&format!("{STRONG_LYRICS}\ncinta sejati sehidup semati"));
        assert!(noisy.composite < clean.composite);
    }

    #[test]
    fn test_repetition_loses_line_variety() {
        let repeated = "Haleluya\n".repeat(10);
        let breakdown = score(&repeated);
        assert!(breakdown.line_uniqueness < 0.7);
        assert_eq!(breakdown.structure, 0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let samples = [
            "a".to_string(),
            STRONG_LYRICS.to_string(),
            "gawai medsos sibuk ponsel".to_string(),
            "cinta sejati ".repeat(30),
            "keluarga tuhan kasih bagai cahaya reff bait verse chorus".to_string(),
        ];
        for text in &samples {
            let s = score(text).score;
            assert!((1..=5).contains(&s), "{text:?} gave {s}");
        }
    }

    #[test]
    fn test_line_uniqueness() {
        assert_eq!(line_uniqueness(""), 0.0);
        assert!((line_uniqueness("a\nb\na\nb") - 0.5).abs() < 1e-9);
    }
}
