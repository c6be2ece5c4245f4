use super::chords::root_pitch_class;

pub const KEY_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

pub const UNKNOWN_KEY: &str = "?";

pub const WEIGHT_PRIMARY: f64 = 2.0;
pub const WEIGHT_SECONDARY: f64 = 1.2;
pub const PENALTY_NON_DIATONIC: f64 = -0.5;

const EPSILON: f64 = 1e-9;

/// Major-scale semitone offsets, used to decide whether a root is diatonic.
pub const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

#[derive(Debug, Clone, PartialEq)]
pub struct KeyDetection {
    pub key: String,
    pub tonic: Option<u8>,
    pub confidence: f64,
    pub scores: [f64; 12],
}

impl KeyDetection {
    pub fn unknown() -> Self {
        Self {
            key: UNKNOWN_KEY.to_string(),
            tonic: None,
            confidence: 0.0,
            scores: [0.0; 12],
        }
    }
}

/// How plausible a root `offset` semitones above a tonic is: I, IV and V
/// weigh most, ii/iii/vi less, everything else counts against the tonic.
pub fn degree_weight(offset: u8) -> f64 {
    match offset % 12 {
        0 | 5 | 7 => WEIGHT_PRIMARY,
        2 | 4 | 9 => WEIGHT_SECONDARY,
        _ => PENALTY_NON_DIATONIC,
    }
}

/// Whether `root` lies in the major scale of `tonic`. Both are taken modulo 12.
pub fn is_diatonic(root: u8, tonic: u8) -> bool {
    MAJOR_SCALE.contains(&((root % 12 + 12 - tonic % 12) % 12))
}

/// Picks the tonic whose degree weights best explain the chord roots.
///
/// Every chord in the sequence counts, repeats included. Ties go to the lowest
/// pitch class (C before C#, and so on). Confidence is the winning margin over
/// the runner-up, relative to the winner's size plus the mean absolute score,
/// clamped to `[0, 1]`.
pub fn detect_key<S: AsRef<str>>(chords: &[S]) -> KeyDetection {
    let roots: Vec<u8> = chords
        .iter()
        .filter_map(|c| root_pitch_class(c.as_ref().trim()))
        .collect();

    if roots.is_empty() {
        return KeyDetection::unknown();
    }

    let mut scores = [0.0_f64; 12];
    for (tonic, score) in scores.iter_mut().enumerate() {
        *score = roots
            .iter()
            .map(|root| degree_weight((root + 12 - tonic as u8) % 12))
            .sum();
    }

    let mut best_idx = 0;
    for idx in 1..12 {
        if scores[idx] > scores[best_idx] {
            best_idx = idx;
        }
    }
    let best = scores[best_idx];

    let second = scores
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != best_idx)
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);

    let mean_abs = scores.iter().map(|s| s.abs()).sum::<f64>() / scores.len() as f64;
    let confidence = ((best - second) / (best.abs() + mean_abs + EPSILON)).clamp(0.0, 1.0);

    KeyDetection {
        key: KEY_NAMES[best_idx].to_string(),
        tonic: Some(best_idx as u8),
        confidence,
        scores,
    }
}
