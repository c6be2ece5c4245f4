use std::collections::HashSet;

use super::chords::parse_chords;
use super::key::{detect_key, is_diatonic, KeyDetection};
use crate::settings::HarmonyWeights;

/// Score reported when no chord could be read. Missing charts are treated as
/// neutral rather than as the worst case.
pub const NO_CHORDS_SCORE: u8 = 2;
pub const SCORE_FLOOR: f64 = 2.0;
pub const SCORE_CEILING: f64 = 5.0;

pub const LONG_PROGRESSION: usize = 16;
pub const MEDIUM_PROGRESSION: usize = 8;
pub const BONUS_LONG_PROGRESSION: f64 = 0.3;
pub const BONUS_MEDIUM_PROGRESSION: f64 = 0.2;

pub const BONUS_SOPHISTICATED: f64 = 0.5;
pub const BONUS_DEVELOPED: f64 = 0.3;

/// Distinct-chord count at which the uniqueness signal saturates.
const UNIQUENESS_SATURATION: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HarmonyBreakdown {
    pub total_chords: usize,
    pub distinct_chords: usize,
    pub variety_score: f64,
    pub extension_ratio: f64,
    pub extension_bonus: f64,
    pub slash_ratio: f64,
    pub slash_bonus: f64,
    pub non_diatonic_ratio: f64,
    pub non_diatonic_bonus: f64,
    pub length_bonus: f64,
    pub sophistication_bonus: f64,
    pub transition_variety: f64,
    pub key: KeyDetection,
    pub raw_score: f64,
    pub score: u8,
    pub richness_index: f64,
    pub boost_reasons: Vec<String>,
}

impl Default for HarmonyBreakdown {
    fn default() -> Self {
        Self {
            total_chords: 0,
            distinct_chords: 0,
            variety_score: 0.0,
            extension_ratio: 0.0,
            extension_bonus: 0.0,
            slash_ratio: 0.0,
            slash_bonus: 0.0,
            non_diatonic_ratio: 0.0,
            non_diatonic_bonus: 0.0,
            length_bonus: 0.0,
            sophistication_bonus: 0.0,
            transition_variety: 0.0,
            key: KeyDetection::unknown(),
            raw_score: 0.0,
            score: NO_CHORDS_SCORE,
            richness_index: 0.0,
            boost_reasons: Vec::new(),
        }
    }
}

pub fn variety_score(distinct: usize) -> f64 {
    match distinct {
        d if d >= 8 => 5.0,
        d if d >= 6 => 4.0,
        d if d >= 4 => 3.0,
        d if d >= 3 => 2.0,
        _ => 1.0,
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

pub fn analyze_harmony<S: AsRef<str>>(chords: &[S], weights: &HarmonyWeights) -> HarmonyBreakdown {
    let tokens = parse_chords(chords);
    if tokens.is_empty() {
        return HarmonyBreakdown::default();
    }

    let mut boosts = Vec::new();
    let total = tokens.len();
    let distinct = tokens
        .iter()
        .map(|t| t.symbol.as_str())
        .collect::<HashSet<_>>()
        .len();

    let variety = variety_score(distinct);

    let extension_ratio = ratio(tokens.iter().filter(|t| t.has_extension()).count(), total);
    let extension_bonus = (extension_ratio * weights.extension).min(weights.extension_cap);
    if extension_bonus > 0.0 {
        boosts.push(format!("extensions (+{extension_bonus:.2})"));
    }

    let slash_ratio = ratio(tokens.iter().filter(|t| t.is_slash()).count(), total);
    let slash_bonus = (slash_ratio * weights.slash).min(weights.slash_cap);
    if slash_bonus > 0.0 {
        boosts.push(format!("slash-chords (+{slash_bonus:.2})"));
    }

    let key = detect_key(chords);
    let non_diatonic_ratio = match key.tonic {
        Some(tonic) => ratio(
            tokens.iter().filter(|t| !is_diatonic(t.root, tonic)).count(),
            total,
        ),
        None => 0.0,
    };
    let non_diatonic_bonus = (non_diatonic_ratio * weights.non_diatonic).min(weights.non_diatonic_cap);
    if non_diatonic_bonus > 0.0 {
        boosts.push(format!("non-diatonic (+{non_diatonic_bonus:.2})"));
    }

    let length_bonus = if total >= LONG_PROGRESSION {
        BONUS_LONG_PROGRESSION
    } else if total >= MEDIUM_PROGRESSION {
        BONUS_MEDIUM_PROGRESSION
    } else {
        0.0
    };
    if length_bonus > 0.0 {
        boosts.push(format!("{total} chords (+{length_bonus:.2})"));
    }

    let sophistication_bonus = if distinct >= 8 && total >= 20 {
        BONUS_SOPHISTICATED
    } else if distinct >= 6 && total >= 15 {
        BONUS_DEVELOPED
    } else {
        0.0
    };
    if sophistication_bonus > 0.0 {
        boosts.push(format!("sophistication (+{sophistication_bonus:.2})"));
    }

    let transitions: Vec<(&str, &str)> = tokens
        .windows(2)
        .map(|w| (w[0].symbol.as_str(), w[1].symbol.as_str()))
        .filter(|(a, b)| a != b)
        .collect();
    let transition_variety = ratio(
        transitions.iter().collect::<HashSet<_>>().len(),
        transitions.len(),
    );

    let raw_score = variety
        + extension_bonus
        + slash_bonus
        + non_diatonic_bonus
        + length_bonus
        + sophistication_bonus;
    let score = raw_score.clamp(SCORE_FLOOR, SCORE_CEILING).round() as u8;

    let uniqueness = (distinct as f64 / UNIQUENESS_SATURATION).min(1.0);
    let index = &weights.index;
    let richness_index = (100.0
        * (index.extension * extension_ratio
            + index.non_diatonic * non_diatonic_ratio
            + index.slash * slash_ratio
            + index.transition * transition_variety
            + index.uniqueness * uniqueness))
        .clamp(0.0, 100.0);

    HarmonyBreakdown {
        total_chords: total,
        distinct_chords: distinct,
        variety_score: variety,
        extension_ratio,
        extension_bonus,
        slash_ratio,
        slash_bonus,
        non_diatonic_ratio,
        non_diatonic_bonus,
        length_bonus,
        sophistication_bonus,
        transition_variety,
        key,
        raw_score,
        score,
        richness_index,
        boost_reasons: boosts,
    }
}

/// 1-5 harmonic richness. Never reports 1; an empty or unreadable sequence
/// reports 2.
pub fn score_harmonic_richness<S: AsRef<str>>(chords: &[S], weights: &HarmonyWeights) -> u8 {
    analyze_harmony(chords, weights).score
}
