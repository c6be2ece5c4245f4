use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::settings::RubricAspect;

const TIE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AspectContribution {
    pub key: String,
    pub name: String,
    pub score: Option<f64>,
    pub max_points: f64,
    pub weight: f64,
    pub contribution: f64,
    /// Rubric description of the score's level, when the rubric has one.
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateBreakdown {
    pub aspects: Vec<AspectContribution>,
    pub missing: Vec<String>,
    pub total: f64,
}

/// Per-aspect contributions, in rubric order.
///
/// Aspects without a score contribute nothing and are listed in `missing`;
/// evaluations are often scored while judging is still in progress. Aspects
/// with a non-positive `max_points` also contribute nothing.
pub fn aggregate_breakdown(
    scores: &BTreeMap<String, f64>,
    rubric: &[RubricAspect],
) -> AggregateBreakdown {
    let mut breakdown = AggregateBreakdown::default();

    for aspect in rubric {
        let score = scores.get(&aspect.key).copied();
        let contribution = match score {
            Some(value) if aspect.max_points > 0.0 => value / aspect.max_points * aspect.weight,
            _ => 0.0,
        };
        if score.is_none() {
            breakdown.missing.push(aspect.key.clone());
        }
        breakdown.total += contribution;
        breakdown.aspects.push(AspectContribution {
            key: aspect.key.clone(),
            name: aspect.name.clone(),
            score,
            max_points: aspect.max_points,
            weight: aspect.weight,
            contribution,
            level: score.and_then(|value| level_text(aspect, value)),
        });
    }

    breakdown
}

fn level_text(aspect: &RubricAspect, score: f64) -> Option<String> {
    if !score.is_finite() || score < 0.0 {
        return None;
    }
    let level = score.round().min(u8::MAX as f64) as u8;
    aspect.describe(level).map(str::to_string)
}

pub fn aggregate_total(scores: &BTreeMap<String, f64>, rubric: &[RubricAspect]) -> f64 {
    aggregate_breakdown(scores, rubric).total
}

/// One judge's raw aspect scores for one song.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeEvaluation {
    pub judge: String,
    pub song_id: String,
    pub scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub rank: usize,
    pub song_id: String,
    pub average_total: f64,
    pub judge_count: usize,
}

/// Averages each song's per-judge totals and orders them best first. Equal
/// averages share a rank (1, 2, 2, 4) and are listed by song id.
pub fn rank_songs(evaluations: &[JudgeEvaluation], rubric: &[RubricAspect]) -> Vec<Standing> {
    let mut totals: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for evaluation in evaluations {
        totals
            .entry(evaluation.song_id.as_str())
            .or_default()
            .push(aggregate_total(&evaluation.scores, rubric));
    }

    let mut standings: Vec<Standing> = totals
        .into_iter()
        .map(|(song_id, values)| Standing {
            rank: 0,
            song_id: song_id.to_string(),
            average_total: values.iter().sum::<f64>() / values.len() as f64,
            judge_count: values.len(),
        })
        .collect();

    standings.sort_by(|a, b| {
        b.average_total
            .partial_cmp(&a.average_total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.song_id.cmp(&b.song_id))
    });

    for idx in 0..standings.len() {
        standings[idx].rank = if idx > 0
            && (standings[idx].average_total - standings[idx - 1].average_total).abs() < TIE_EPSILON
        {
            standings[idx - 1].rank
        } else {
            idx + 1
        };
    }

    standings
}
