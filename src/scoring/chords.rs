use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{Display, EnumString};

const SECTION_STOPLIST: &[&str] = &[
    "verse",
    "chorus",
    "bridge",
    "intro",
    "outro",
    "bait",
    "reff",
    "ref",
    "refrain",
    "interlude",
    "prechorus",
    "pre",
    "coda",
    "ending",
    "solo",
    "instrumental",
    "fine",
    "repeat",
];

static TOKEN_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w/#]+").unwrap());

static SECTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:verse|chorus|bridge|intro|outro|bait|reff?|refrain|interlude|pre-?chorus|coda|ending)\d*$",
    )
    .unwrap()
});

static CHORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<root>[A-G])(?P<acc>[#b])?(?P<quality>maj7|maj|min|m7|m|7|sus2|sus4|sus|dim|aug|add9|add11|add13|6|9|11|13)?(?:/(?P<bass>[A-G])(?P<bass_acc>[#b])?)?$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Quality {
    #[strum(serialize = "maj7")]
    Major7,
    #[strum(serialize = "maj")]
    Major,
    #[strum(serialize = "min")]
    Minor,
    #[strum(serialize = "m7")]
    Minor7,
    #[strum(serialize = "m")]
    MinorShort,
    #[strum(serialize = "7")]
    Dominant7,
    #[strum(serialize = "sus2")]
    Sus2,
    #[strum(serialize = "sus4")]
    Sus4,
    #[strum(serialize = "sus")]
    Sus,
    #[strum(serialize = "dim")]
    Diminished,
    #[strum(serialize = "aug")]
    Augmented,
    #[strum(serialize = "add9")]
    Add9,
    #[strum(serialize = "add11")]
    Add11,
    #[strum(serialize = "add13")]
    Add13,
    #[strum(serialize = "6")]
    Sixth,
    #[strum(serialize = "9")]
    Ninth,
    #[strum(serialize = "11")]
    Eleventh,
    #[strum(serialize = "13")]
    Thirteenth,
}

impl Quality {
    /// Sevenths, added tones and upper extensions.
    pub fn is_extension(&self) -> bool {
        matches!(
            self,
            Self::Major7
                | Self::Minor7
                | Self::Dominant7
                | Self::Add9
                | Self::Add11
                | Self::Add13
                | Self::Sixth
                | Self::Ninth
                | Self::Eleventh
                | Self::Thirteenth
        )
    }
}

/// A chord symbol that passed the grammar check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChordToken {
    pub symbol: String,
    pub root: u8,
    pub quality: Option<Quality>,
    pub bass: Option<u8>,
}

impl ChordToken {
    pub fn parse(symbol: &str) -> Option<Self> {
        let caps = CHORD_PATTERN.captures(symbol)?;
        let root = pitch_class(&caps["root"], caps.name("acc").map(|m| m.as_str()))?;
        let quality = match caps.name("quality") {
            Some(q) => Some(Quality::from_str(q.as_str()).ok()?),
            None => None,
        };
        let bass = match caps.name("bass") {
            Some(b) => Some(pitch_class(b.as_str(), caps.name("bass_acc").map(|m| m.as_str()))?),
            None => None,
        };

        Some(Self {
            symbol: symbol.to_string(),
            root,
            quality,
            bass,
        })
    }

    pub fn has_extension(&self) -> bool {
        self.quality.is_some_and(|q| q.is_extension())
    }

    pub fn is_slash(&self) -> bool {
        self.bass.is_some()
    }
}

fn pitch_class(letter: &str, accidental: Option<&str>) -> Option<u8> {
    let base: i8 = match letter {
        "C" => 0,
        "D" => 2,
        "E" => 4,
        "F" => 5,
        "G" => 7,
        "A" => 9,
        "B" => 11,
        _ => return None,
    };
    let shift = match accidental {
        Some("#") => 1,
        Some("b") => -1,
        _ => 0,
    };
    Some((base + shift).rem_euclid(12) as u8)
}

/// Root pitch class of a chord symbol, ignoring quality and bass.
pub fn root_pitch_class(symbol: &str) -> Option<u8> {
    ChordToken::parse(symbol).map(|c| c.root)
}

pub fn is_section_label(token: &str) -> bool {
    SECTION_STOPLIST
        .iter()
        .any(|label| token.eq_ignore_ascii_case(label))
        || SECTION_PATTERN.is_match(token)
}

pub fn is_valid_chord(token: &str) -> bool {
    CHORD_PATTERN.is_match(token)
}

/// Pulls chord symbols out of a free-form chord chart, in first-seen order and
/// without duplicates. Section labels and anything off-grammar are dropped.
pub fn extract_chords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TOKEN_SPLIT
        .split(text)
        .filter(|token| !token.is_empty())
        .filter(|token| !is_section_label(token))
        .filter(|token| is_valid_chord(token))
        .filter(|token| seen.insert(token.to_string()))
        .map(str::to_string)
        .collect()
}

/// Parses an already-extracted sequence, silently skipping invalid symbols.
pub fn parse_chords<S: AsRef<str>>(chords: &[S]) -> Vec<ChordToken> {
    chords
        .iter()
        .filter_map(|c| ChordToken::parse(c.as_ref().trim()))
        .collect()
}

/// Where a song's chords can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ChordSource {
    #[strum(serialize = "chord-chart")]
    ChordChart,
    #[strum(serialize = "lyrics")]
    Lyrics,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordSelection {
    pub source: Option<ChordSource>,
    pub chords: Vec<String>,
}

/// Walks `priority` and keeps the first source whose text yields any chord.
pub fn select_chords<'a>(
    priority: &[ChordSource],
    source_text: impl Fn(ChordSource) -> Option<&'a str>,
) -> ChordSelection {
    for source in priority {
        let Some(text) = source_text(*source) else {
            continue;
        };
        let chords = extract_chords(text);
        if !chords.is_empty() {
            return ChordSelection {
                source: Some(*source),
                chords,
            };
        }
    }
    ChordSelection::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_basic_chart() {
        let chords = extract_chords("Intro: C  G  Am  F\nVerse 1:\nC    G\nKasih-Mu ya Tuhan");
        assert_eq!(chords, vec!["C", "G", "Am", "F"]);
    }

    #[test]
    fn test_extract_keeps_first_seen_order() {
        let chords = extract_chords("G D Em C G D C");
        assert_eq!(chords, vec!["G", "D", "Em", "C"]);
    }

    #[test]
    fn test_extract_slash_and_accidentals() {
        let chords = extract_chords("| Bb/D  F#m7 | Ebmaj7  C#dim | Gsus4 Dadd9 |");
        assert_eq!(chords, vec!["Bb/D", "F#m7", "Ebmaj7", "C#dim", "Gsus4", "Dadd9"]);
    }

    #[test]
    fn test_extract_drops_section_labels() {
        let chords = extract_chords("BAIT1 C F\nReff: G Am\nChorus Bridge bait2 Outro");
        assert_eq!(chords, vec!["C", "F", "G", "Am"]);
    }

    #[test]
    fn test_extract_ignores_lyric_words() {
        let chords = extract_chords("Ayah Bunda Cinta Damai Engkau Firman Gembala");
        assert!(chords.is_empty());
    }

    #[test]
    fn test_extract_empty() {
        assert!(extract_chords("").is_empty());
        assert!(extract_chords("   \n\n").is_empty());
    }

    #[test]
    fn test_extract_never_returns_labels_and_all_match_grammar() {
        let text = "intro A verse B chorus C bridge D outro E bait F reff G bait3 Am7 \
                    Refrain Dm Interlude Em Coda Fmaj7 Ending G/B CODA Cmaj9 H7 Xyz";
        for chord in extract_chords(text) {
            assert!(!is_section_label(&chord), "{chord} is a label");
            assert!(is_valid_chord(&chord), "{chord} fails the grammar");
        }
    }

    #[test]
    fn test_parse_token_parts() {
        let c = ChordToken::parse("F#m7/C#").unwrap();
        assert_eq!(c.root, 6);
        assert_eq!(c.quality, Some(Quality::Minor7));
        assert_eq!(c.bass, Some(1));
        assert!(c.has_extension());
        assert!(c.is_slash());

        let plain = ChordToken::parse("Bb").unwrap();
        assert_eq!(plain.root, 10);
        assert!(plain.quality.is_none());
        assert!(!plain.has_extension());

        assert_eq!(ChordToken::parse("Cb").map(|c| c.root), Some(11));
    }

    #[test]
    fn test_parse_rejects_off_grammar() {
        for bad in ["H", "c", "Cmaj9", "C/", "Am/x", "Csus3", "bait", ""] {
            assert!(ChordToken::parse(bad).is_none(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_root_pitch_class() {
        assert_eq!(root_pitch_class("G7"), Some(7));
        assert_eq!(root_pitch_class("Ab/C"), Some(8));
        assert_eq!(root_pitch_class("?"), None);
    }

    #[test]
    fn test_select_chords_priority() {
        let chart = "C G Am F";
        let lyrics = "D\nBersama di meja makan\nA";
        let selection = select_chords(&[ChordSource::ChordChart, ChordSource::Lyrics], |s| {
            match s {
                ChordSource::ChordChart => Some(chart),
                ChordSource::Lyrics => Some(lyrics),
            }
        });
        assert_eq!(selection.source, Some(ChordSource::ChordChart));
        assert_eq!(selection.chords, vec!["C", "G", "Am", "F"]);

        let selection = select_chords(&[ChordSource::Lyrics, ChordSource::ChordChart], |s| {
            match s {
                ChordSource::ChordChart => Some(chart),
                ChordSource::Lyrics => Some(lyrics),
            }
        });
        assert_eq!(selection.source, Some(ChordSource::Lyrics));
        assert_eq!(selection.chords, vec!["D", "A"]);
    }

    #[test]
    fn test_select_chords_falls_through_empty_sources() {
        let selection = select_chords(&[ChordSource::ChordChart, ChordSource::Lyrics], |s| {
            match s {
                ChordSource::ChordChart => Some("Reff: (tanpa akor)"),
                ChordSource::Lyrics => None,
            }
        });
        assert_eq!(selection, ChordSelection::default());
    }
}
