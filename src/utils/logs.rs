use console::{measure_text_width, Style};

use crate::scoring::{AggregateBreakdown, SongAnalysis, Standing};

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';
pub const TREE_VERT: char = '\u{2502}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_indent() -> String {
    dim().apply_to(format!("{}   ", TREE_VERT)).to_string()
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn contest_prefix() -> String {
    magenta().apply_to("[CONTEST]").to_string()
}

fn error_prefix() -> String {
    red().apply_to("[ERROR]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn format_signed(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}{:.2}", dim().apply_to(sign), value.abs())
}

fn score_style(score: u8) -> Style {
    match score {
        4..=5 => green(),
        3 => yellow(),
        _ => red(),
    }
}

fn row(branch: String, label: &str, depth: usize, value: impl std::fmt::Display) -> String {
    format!("{}{}{}", branch, pad_label(label, depth), value)
}

fn push_reasons(lines: &mut Vec<String>, reasons: &[String]) {
    if reasons.is_empty() {
        lines.push(format!("{}{}{}", tree_indent(), tree_end(), dim().apply_to("none")));
        return;
    }
    let count = reasons.len();
    for (i, reason) in reasons.iter().enumerate() {
        let branch = if i == count - 1 {
            tree_end()
        } else {
            tree_branch()
        };
        lines.push(format!("{}{}{}", tree_indent(), branch, reason));
    }
}

pub fn log_init(settings_version: &str, song_count: usize) {
    println!(
        "{} settings {} loaded, {} song(s) to score",
        init_prefix(),
        cyan().apply_to(settings_version),
        bold().apply_to(song_count),
    );
}

pub fn log_error(context: &str, error: &str) {
    println!("{} {}: {}", error_prefix(), context, dim().apply_to(error));
}

pub fn log_flagged(flagged: &[String], threshold: f64) {
    if flagged.is_empty() {
        println!(
            "{} no lyrics above {} similarity",
            contest_prefix(),
            dim().apply_to(format!("{threshold:.2}"))
        );
        return;
    }
    println!(
        "{} {} song(s) above {} similarity:",
        contest_prefix(),
        bold().apply_to(flagged.len()),
        dim().apply_to(format!("{threshold:.2}"))
    );
    let count = flagged.len();
    for (i, id) in flagged.iter().enumerate() {
        let branch = if i == count - 1 {
            tree_end()
        } else {
            tree_branch()
        };
        println!("{}{}", branch, yellow().apply_to(id));
    }
}

pub fn log_standings(standings: &[Standing]) {
    println!("{} standings", contest_prefix());
    let count = standings.len();
    for (i, standing) in standings.iter().enumerate() {
        let branch = if i == count - 1 {
            tree_end()
        } else {
            tree_branch()
        };
        println!(
            "{}{} {} {}",
            branch,
            pad_label(&format!("#{} {}", standing.rank, standing.song_id), 1),
            bold().apply_to(format!("{:.2}", standing.average_total)),
            dim().apply_to(format!("({} judge(s))", standing.judge_count))
        );
    }
}

/// Prints the full breakdown tree of one analyzed song.
pub fn print_song_report(analysis: &SongAnalysis, aggregate: Option<&AggregateBreakdown>) {
    let mut lines: Vec<String> = Vec::new();

    let title = if analysis.title.is_empty() {
        analysis.song_id.clone()
    } else {
        format!("{} ({})", analysis.title, analysis.song_id)
    };
    lines.push(format!(
        "{} {}",
        magenta().apply_to(bold().apply_to("[SONG]")),
        dim().apply_to(title)
    ));

    let harmony = &analysis.harmony;
    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("CHORDS")));
    let source = analysis
        .chord_source
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".into());
    lines.push(row(tree_branch(), "source", 1, dim().apply_to(source)));
    lines.push(row(
        tree_branch(),
        "chords",
        1,
        if analysis.chords.is_empty() {
            dim().apply_to("-".to_string())
        } else {
            cyan().apply_to(analysis.chords.join(" "))
        },
    ));
    lines.push(row(
        tree_end(),
        "key",
        1,
        format!(
            "{} {}",
            bold().apply_to(&harmony.key.key),
            dim().apply_to(format!("({:.0}% confidence)", harmony.key.confidence * 100.0))
        ),
    ));

    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("HARMONY")));
    lines.push(row(
        tree_branch(),
        "distinct",
        1,
        format!("{}/{}", harmony.distinct_chords, harmony.total_chords),
    ));
    lines.push(row(tree_branch(), "variety", 1, format_signed(harmony.variety_score)));
    lines.push(format!("{}{}", tree_branch(), pad_label("boosts", 1)));
    push_reasons(&mut lines, &harmony.boost_reasons);
    lines.push(row(
        tree_branch(),
        "richness index",
        1,
        format!("{:.1}", harmony.richness_index),
    ));
    lines.push(row(
        tree_end(),
        "score",
        1,
        score_style(harmony.score).apply_to(harmony.score),
    ));

    let lyrics = &analysis.lyrics;
    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("LYRICS")));
    lines.push(row(tree_branch(), "theme", 1, lyrics.theme_hits));
    lines.push(row(
        tree_branch(),
        "family+faith",
        1,
        format!(
            "{} {}",
            lyrics.relation_hits,
            dim().apply_to(format!("({}+{})", lyrics.family_hits, lyrics.faith_hits))
        ),
    ));
    lines.push(row(tree_branch(), "imagery", 1, lyrics.imagery_hits));
    lines.push(row(
        tree_branch(),
        "structure",
        1,
        format!(
            "{} {}",
            lyrics.structure,
            dim().apply_to(format!(
                "({} section(s), {:.0}% unique lines)",
                lyrics.section_markers,
                lyrics.line_uniqueness * 100.0
            ))
        ),
    ));
    lines.push(format!("{}{}", tree_branch(), pad_label("penalties", 1)));
    push_reasons(&mut lines, &lyrics.penalty_reasons);
    lines.push(row(tree_branch(), "composite", 1, format!("{:.1}", lyrics.composite)));
    lines.push(row(
        tree_end(),
        "score",
        1,
        score_style(lyrics.score).apply_to(lyrics.score),
    ));

    let quality = &analysis.lyrical_quality;
    lines.push(String::new());
    lines.push(format!("{}", bold().apply_to("THEME & QUALITY")));
    lines.push(row(
        tree_branch(),
        "theme relevance",
        1,
        format!(
            "{:.2} {}",
            analysis.theme_relevance,
            score_style(analysis.theme_score).apply_to(format!("({})", analysis.theme_score))
        ),
    ));
    lines.push(format!("{}{}", tree_end(), pad_label("lyrical quality", 1)));
    for (i, (label, value)) in [
        ("poetic", quality.poetic),
        ("emotional", quality.emotional),
        ("imagery", quality.imagery),
        ("spiritual", quality.spiritual),
        ("total", quality.total),
    ]
    .iter()
    .enumerate()
    {
        let branch = if i == 4 { tree_end() } else { tree_branch() };
        lines.push(format!(
            "    {}{}{:.2}",
            branch,
            pad_label(label, 2),
            value
        ));
    }

    if let Some(ref originality) = analysis.originality {
        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("ORIGINALITY")));
        let peer = originality
            .most_similar
            .clone()
            .unwrap_or_else(|| "-".into());
        lines.push(row(tree_branch(), "nearest", 1, dim().apply_to(peer)));
        lines.push(row(
            tree_branch(),
            "similarity",
            1,
            format!("{:.0}%", originality.max_similarity * 100.0),
        ));
        let status = if originality.flagged {
            red().bold().apply_to("FLAGGED")
        } else {
            green().apply_to("ok")
        };
        lines.push(row(tree_end(), "status", 1, status));
    }

    if let Some(aggregate) = aggregate {
        lines.push(String::new());
        lines.push(format!("{}", bold().apply_to("RUBRIC")));
        for aspect in &aggregate.aspects {
            let value = match aspect.score {
                Some(score) => format!(
                    "{:.1}/{:.0} {}",
                    score,
                    aspect.max_points,
                    dim().apply_to(format!("({})", format_signed(aspect.contribution)))
                ),
                None => dim().apply_to("pending").to_string(),
            };
            lines.push(row(tree_branch(), &aspect.name, 1, value));
            if let Some(ref level) = aspect.level {
                lines.push(format!("{}{}{}", tree_indent(), tree_end(), dim().apply_to(level)));
            }
        }
        lines.push(row(
            tree_end(),
            "total",
            1,
            bold().apply_to(format!("{:.2}", aggregate.total)),
        ));
    }

    println!("{}\n", lines.join("\n"));
}
