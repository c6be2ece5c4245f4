use simsimd::SpatialSimilarity;
use std::collections::{BTreeMap, HashSet};

use super::normalize::normalize_text;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OriginalitySignal {
    pub max_similarity: f64,
    pub most_similar: Option<String>,
    pub flagged: bool,
}

impl OriginalitySignal {
    /// 1-5 originality for the rubric: the closer the nearest peer, the lower.
    pub fn scale_score(&self) -> u8 {
        match self.max_similarity {
            s if s >= 0.90 => 1,
            s if s >= 0.75 => 2,
            s if s >= 0.60 => 3,
            s if s >= 0.40 => 4,
            _ => 5,
        }
    }
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let is_zero = |v: &[f64]| v.iter().all(|x| *x == 0.0);
    if a.is_empty() || is_zero(a) || is_zero(b) {
        return 0.0;
    }
    f64::cosine(a, b)
        .map(|distance| (1.0 - distance).clamp(0.0, 1.0))
        .unwrap_or(0.0)
}

/// Smoothed TF-IDF vectors over a shared vocabulary, one per document, in
/// input order.
pub fn tfidf_vectors(documents: &[Vec<String>]) -> Vec<Vec<f64>> {
    let mut vocabulary: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in documents {
        for token in doc {
            let next = vocabulary.len();
            vocabulary.entry(token.as_str()).or_insert(next);
        }
    }

    let mut document_frequency = vec![0usize; vocabulary.len()];
    for doc in documents {
        let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
        for token in unique {
            document_frequency[vocabulary[token]] += 1;
        }
    }

    let n = documents.len() as f64;
    let idf: Vec<f64> = document_frequency
        .iter()
        .map(|df| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
        .collect();

    documents
        .iter()
        .map(|doc| {
            let mut vector = vec![0.0; vocabulary.len()];
            for token in doc {
                vector[vocabulary[token.as_str()]] += 1.0;
            }
            for (value, weight) in vector.iter_mut().zip(&idf) {
                *value *= weight;
            }
            vector
        })
        .collect()
}

/// Pairwise lyric similarity over the whole submission snapshot. A song is
/// flagged when its nearest peer is strictly above `threshold`. Ties on the
/// nearest peer go to the lowest song id.
pub fn compute_originality(
    all_lyrics: &BTreeMap<String, String>,
    threshold: f64,
) -> BTreeMap<String, OriginalitySignal> {
    let ids: Vec<&String> = all_lyrics.keys().collect();
    let documents: Vec<Vec<String>> = all_lyrics
        .values()
        .map(|text| {
            normalize_text(text)
                .split_whitespace()
                .map(str::to_string)
                .collect()
        })
        .collect();
    let vectors = tfidf_vectors(&documents);

    let mut signals: BTreeMap<String, OriginalitySignal> = ids
        .iter()
        .map(|id| ((*id).clone(), OriginalitySignal::default()))
        .collect();

    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let similarity = cosine_similarity(&vectors[i], &vectors[j]);
            for (me, other) in [(i, j), (j, i)] {
                if let Some(signal) = signals.get_mut(ids[me]) {
                    if similarity > signal.max_similarity {
                        signal.max_similarity = similarity;
                        signal.most_similar = Some(ids[other].clone());
                    }
                }
            }
        }
    }

    for signal in signals.values_mut() {
        signal.flagged = signal.max_similarity > threshold;
    }

    signals
}
