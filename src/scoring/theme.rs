use regex::Regex;

use super::normalize::normalize_text;
use crate::settings::{QualityCategory, QualityLexicons, WeightedTerm};

pub const MAX_THEME_SCORE: f64 = 100.0;

/// Compiles a term into a stem matcher: the term at a word boundary followed
/// by any word characters, so `doa` also counts `doanya` and `doamu`.
/// Returns `None` for terms that normalize to nothing.
pub fn stem_pattern(term: &str) -> Option<Regex> {
    let normalized = normalize_text(term);
    if normalized.is_empty() {
        return None;
    }
    Regex::new(&format!(r"\b{}\w*", regex::escape(&normalized))).ok()
}

/// Whole-phrase matcher: `cinta mati` matches on its own but not inside
/// `cinta matikan`.
pub fn phrase_pattern(phrase: &str) -> Option<Regex> {
    let normalized = normalize_text(phrase);
    if normalized.is_empty() {
        return None;
    }
    Regex::new(&format!(r"\b{}\b", regex::escape(&normalized))).ok()
}

/// Plain substring count of an already-normalized `phrase`.
pub fn count_phrase(normalized: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    normalized.matches(phrase).count()
}

/// A term list compiled once into matchers. All counting methods expect
/// already-normalized text.
#[derive(Debug, Clone, Default)]
pub struct TermSet {
    patterns: Vec<Regex>,
}

impl TermSet {
    /// Stem matchers, one per term.
    pub fn stems<S: AsRef<str>>(terms: &[S]) -> Self {
        Self {
            patterns: terms.iter().filter_map(|t| stem_pattern(t.as_ref())).collect(),
        }
    }

    /// Word-bounded whole-phrase matchers, one per phrase.
    pub fn phrases<S: AsRef<str>>(phrases: &[S]) -> Self {
        Self {
            patterns: phrases
                .iter()
                .filter_map(|p| phrase_pattern(p.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Sum of match counts over every term.
    pub fn total_hits(&self, normalized: &str) -> usize {
        self.patterns
            .iter()
            .map(|re| re.find_iter(normalized).count())
            .sum()
    }

    /// Number of terms matching at least once.
    pub fn distinct_present(&self, normalized: &str) -> usize {
        self.patterns.iter().filter(|re| re.is_match(normalized)).count()
    }

    pub fn contains_any(&self, normalized: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(normalized))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted keyword and phrase lexicon, compiled once and reused across songs.
#[derive(Debug, Clone, Default)]
pub struct WeightedLexicon {
    keywords: Vec<(Regex, f64)>,
    phrases: Vec<(String, f64)>,
}

impl WeightedLexicon {
    pub fn new(keywords: &[WeightedTerm], phrases: &[WeightedTerm]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .filter_map(|(term, weight)| stem_pattern(term).map(|re| (re, *weight)))
                .collect(),
            phrases: phrases
                .iter()
                .map(|(phrase, weight)| (normalize_text(phrase), *weight))
                .filter(|(phrase, _)| !phrase.is_empty())
                .collect(),
        }
    }

    fn raw_score(&self, normalized: &str) -> f64 {
        let phrase_score: f64 = self
            .phrases
            .iter()
            .map(|(phrase, weight)| count_phrase(normalized, phrase) as f64 * weight)
            .sum();
        let keyword_score: f64 = self
            .keywords
            .iter()
            .map(|(re, weight)| re.find_iter(normalized).count() as f64 * weight)
            .sum();
        phrase_score + keyword_score
    }

    /// Score of raw (not yet normalized) text in `[0, 100]`, rounded to two
    /// decimals.
    pub fn score(&self, text: &str) -> f64 {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return 0.0;
        }
        round2(self.raw_score(&normalized).clamp(0.0, MAX_THEME_SCORE))
    }
}

/// Weighted lexicon score in `[0, 100]`, rounded to two decimals.
///
/// Phrases add `occurrences * weight`; keywords add `stem matches * weight`.
/// With non-negative weights the score never drops as a term repeats.
/// Compiles the lexicon on every call; repeated scoring should hold a
/// [`WeightedLexicon`] instead.
pub fn score_theme_relevance(
    text: &str,
    keywords: &[WeightedTerm],
    phrases: &[WeightedTerm],
) -> f64 {
    WeightedLexicon::new(keywords, phrases).score(text)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricalQuality {
    pub poetic: f64,
    pub emotional: f64,
    pub imagery: f64,
    pub spiritual: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default)]
struct CategoryMatcher {
    lexicon: WeightedLexicon,
    cap: f64,
}

impl CategoryMatcher {
    fn new(category: &QualityCategory) -> Self {
        Self {
            lexicon: WeightedLexicon::new(&category.keywords, &category.phrases),
            cap: category.cap,
        }
    }

    fn score(&self, text: &str) -> f64 {
        self.lexicon.score(text).min(self.cap)
    }
}

/// The four lyrical-quality categories, compiled once.
#[derive(Debug, Clone, Default)]
pub struct QualityMatchers {
    poetic: CategoryMatcher,
    emotional: CategoryMatcher,
    imagery: CategoryMatcher,
    spiritual: CategoryMatcher,
}

impl QualityMatchers {
    pub fn new(lexicons: &QualityLexicons) -> Self {
        Self {
            poetic: CategoryMatcher::new(&lexicons.poetic),
            emotional: CategoryMatcher::new(&lexicons.emotional),
            imagery: CategoryMatcher::new(&lexicons.imagery),
            spiritual: CategoryMatcher::new(&lexicons.spiritual),
        }
    }

    /// Per-category lyrical quality, each category capped on its own.
    pub fn analyze(&self, lyrics: &str) -> LyricalQuality {
        let poetic = self.poetic.score(lyrics);
        let emotional = self.emotional.score(lyrics);
        let imagery = self.imagery.score(lyrics);
        let spiritual = self.spiritual.score(lyrics);
        let total = round2((poetic + emotional + imagery + spiritual).clamp(0.0, MAX_THEME_SCORE));

        LyricalQuality {
            poetic,
            emotional,
            imagery,
            spiritual,
            total,
        }
    }
}

pub fn analyze_lyrical_quality(lyrics: &str, lexicons: &QualityLexicons) -> LyricalQuality {
    QualityMatchers::new(lexicons).analyze(lyrics)
}

pub fn score_lyrical_quality(lyrics: &str, lexicons: &QualityLexicons) -> f64 {
    analyze_lyrical_quality(lyrics, lexicons).total
}

/// Maps a 0-100 value onto 1-5: one plus the number of cut points at or
/// below the value.
pub fn scale_to_five(value: f64, cuts: &[f64]) -> u8 {
    let passed = cuts.iter().filter(|cut| **cut <= value).count();
    (1 + passed).min(5) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(items: &[(&str, f64)]) -> Vec<WeightedTerm> {
        items.iter().map(|(t, w)| (t.to_string(), *w)).collect()
    }

    fn stem_hits(text: &str, term: &str) -> usize {
        TermSet::stems(&[term]).total_hits(&normalize_text(text))
    }

    #[test]
    fn test_stem_matching() {
        let text = "Doanya naik, doamu didengar; bukan berdoa";
        assert_eq!(stem_hits(text, "doa"), 2);
        assert_eq!(stem_hits(text, "berdoa"), 1);
    }

    #[test]
    fn test_stem_requires_word_start() {
        assert_eq!(stem_hits("pengampunan dan ampunan", "ampun"), 1);
    }

    #[test]
    fn test_terms_are_normalized() {
        assert_eq!(stem_hits("Kasih Tuhan", "KASIH"), 1);
        assert!(TermSet::stems(&["   "]).is_empty());
        let phrases = TermSet::phrases(&["Kasih, Tuhan!", "!!"]);
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases.total_hits(&normalize_text("Kasih Tuhan")), 1);
    }

    #[test]
    fn test_phrases_match_whole_words() {
        let cliches = TermSet::phrases(&["cinta mati"]);
        assert_eq!(cliches.total_hits(&normalize_text("cinta matikan rindu")), 0);
        assert_eq!(cliches.total_hits(&normalize_text("Cinta mati, cinta mati!")), 2);
    }

    #[test]
    fn test_term_set_counts() {
        let set = TermSet::stems(&["doa", "kasih", "iman"]);
        let text = normalize_text("doa doa kasih");
        assert_eq!(set.total_hits(&text), 3);
        assert_eq!(set.distinct_present(&text), 2);
        assert!(set.contains_any(&text));
        assert!(!set.contains_any(&normalize_text("laut biru")));
    }

    #[test]
    fn test_compiled_lexicon_matches_one_off_scoring() {
        let keywords = kw(&[("keluarga", 8.0), ("doa", 5.0)]);
        let phrases = kw(&[("doa bersama", 10.0)]);
        let lexicon = WeightedLexicon::new(&keywords, &phrases);
        for text in ["Keluarga kita, doa bersama", "", "doanya doamu"] {
            assert_eq!(
                lexicon.score(text),
                score_theme_relevance(text, &keywords, &phrases)
            );
        }
    }

    #[test]
    fn test_theme_score_weights() {
        let keywords = kw(&[("keluarga", 8.0), ("doa", 5.0)]);
        let phrases = kw(&[("doa bersama", 10.0)]);
        let score = score_theme_relevance("Keluarga kita, doa bersama", &keywords, &phrases);
        assert!((score - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_theme_score_clamped_and_rounded() {
        let keywords = kw(&[("kasih", 30.0)]);
        let score = score_theme_relevance("kasih kasih kasih kasih", &keywords, &[]);
        assert_eq!(score, 100.0);

        let keywords = kw(&[("kasih", 1.0 / 3.0)]);
        let score = score_theme_relevance("kasih", &keywords, &[]);
        assert_eq!(score, 0.33);
    }

    #[test]
    fn test_theme_score_empty() {
        let keywords = kw(&[("kasih", 5.0)]);
        assert_eq!(score_theme_relevance("", &keywords, &[]), 0.0);
        assert_eq!(score_theme_relevance("tanpa kata", &[], &[]), 0.0);
    }

    #[test]
    fn test_theme_score_monotonic_in_repeats() {
        let keywords = kw(&[("iman", 3.0), ("keluarga", 7.5)]);
        let phrases = kw(&[("mezbah keluarga", 12.0)]);
        let mut previous = 0.0;
        for repeats in 0..40 {
            let text = format!("mezbah keluarga {}", "iman ".repeat(repeats));
            let score = score_theme_relevance(&text, &keywords, &phrases);
            assert!(score >= previous, "dropped at {repeats}");
            previous = score;
        }
    }

    #[test]
    fn test_lyrical_quality_caps_categories() {
        let lexicons = QualityLexicons::default();
        let text = "cahaya ".repeat(50);
        let quality = analyze_lyrical_quality(&text, &lexicons);
        assert_eq!(quality.imagery, lexicons.imagery.cap);
        assert_eq!(quality.poetic, 0.0);
        assert_eq!(quality.total, lexicons.imagery.cap);
    }

    #[test]
    fn test_lyrical_quality_ignores_everyday_words() {
        let quality = analyze_lyrical_quality("kita bakal bakar baki bakti", &QualityLexicons::default());
        assert_eq!(quality.poetic, 0.0);
    }

    #[test]
    fn test_lyrical_quality_bounds() {
        let lexicons = QualityLexicons::default();
        assert_eq!(score_lyrical_quality("", &lexicons), 0.0);
        let dense = "bagai pelita laksana embun, air mata haru, peluk hangat, \
                     cahaya terang, roh kudus, doa iman salib anugerah "
            .repeat(10);
        let score = score_lyrical_quality(&dense, &lexicons);
        assert!(score > 0.0 && score <= 100.0);
    }

    #[test]
    fn test_scale_to_five() {
        let cuts = [20.0, 40.0, 60.0, 80.0];
        assert_eq!(scale_to_five(0.0, &cuts), 1);
        assert_eq!(scale_to_five(19.99, &cuts), 1);
        assert_eq!(scale_to_five(20.0, &cuts), 2);
        assert_eq!(scale_to_five(59.0, &cuts), 3);
        assert_eq!(scale_to_five(80.0, &cuts), 5);
        assert_eq!(scale_to_five(100.0, &cuts), 5);
    }
}
