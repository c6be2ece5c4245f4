use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::scoring::chords::ChordSource;

pub const DEFAULT_SETTINGS_PATH: &str = "settings.default.ron";
pub const OVERRIDE_SETTINGS_PATH: &str = "settings.ron";

/// A `(term, weight)` pair. Terms are normalized before matching, so they can
/// be written with accents, punctuation or capitals.
pub type WeightedTerm = (String, f64);

/// Everything the scorers consult. Loaded once per scoring session and passed
/// by reference; nothing in `scoring` keeps or mutates a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: String,
    pub lexicons: Lexicons,
    pub lyrics: LyricsWeights,
    pub harmony: HarmonyWeights,
    pub theme: ThemeLexicon,
    pub originality: Originality,
    pub chords: ChordSettings,
    pub rubric: Vec<RubricAspect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicons {
    pub deep_theme: Vec<String>,
    pub family: Vec<String>,
    pub faith: Vec<String>,
    pub imagery: Vec<String>,
    pub cliche: Vec<String>,
    pub distraction: Vec<String>,
    pub resolution: Vec<String>,
    pub section_markers: Vec<String>,
    pub quality: QualityLexicons,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityLexicons {
    pub poetic: QualityCategory,
    pub emotional: QualityCategory,
    pub imagery: QualityCategory,
    pub spiritual: QualityCategory,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityCategory {
    pub keywords: Vec<WeightedTerm>,
    pub phrases: Vec<WeightedTerm>,
    pub cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsWeights {
    pub theme: f64,
    pub relation: f64,
    pub imagery: f64,
    pub structure: f64,
    pub penalty: f64,
    pub theme_cap: usize,
    pub relation_cap: usize,
    pub imagery_cap: usize,
    pub structure_max: u32,
    pub penalty_max: u32,
    pub cliche_cap: usize,
    pub distraction_penalty: u32,
    pub line_uniqueness_min: f64,
    pub cuts: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyWeights {
    pub extension: f64,
    pub extension_cap: f64,
    pub slash: f64,
    pub slash_cap: f64,
    pub non_diatonic: f64,
    pub non_diatonic_cap: f64,
    pub index: HarmonyIndexWeights,
}

/// Weights of the 0-100 richness index. Each signal is already in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarmonyIndexWeights {
    pub extension: f64,
    pub non_diatonic: f64,
    pub slash: f64,
    pub transition: f64,
    pub uniqueness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeLexicon {
    pub keywords: Vec<WeightedTerm>,
    pub phrases: Vec<WeightedTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Originality {
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChordSettings {
    pub priority: Vec<ChordSource>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricAspect {
    pub key: String,
    pub name: String,
    pub max_points: f64,
    pub weight: f64,
    pub levels: BTreeMap<u8, String>,
}

impl RubricAspect {
    pub fn describe(&self, score: u8) -> Option<&str> {
        self.levels.get(&score).map(String::as_str)
    }
}

fn terms(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn weighted(items: &[(&str, f64)]) -> Vec<WeightedTerm> {
    items.iter().map(|(t, w)| (t.to_string(), *w)).collect()
}

impl Default for Lexicons {
    fn default() -> Self {
        Self {
            deep_theme: terms(&[
                "kasih",
                "setia",
                "kesetiaan",
                "ampun",
                "pengampunan",
                "syukur",
                "pengharapan",
                "harapan",
                "damai",
                "pulih",
                "pemulihan",
                "bersatu",
                "kebersamaan",
                "peduli",
                "pengorbanan",
                "rendah hati",
                "teladan",
                "warisan iman",
            ]),
            family: terms(&[
                "keluarga",
                "ayah",
                "ibu",
                "anak",
                "orang tua",
                "saudara",
                "rumah",
                "suami",
                "istri",
                "kakek",
                "nenek",
                "bunda",
                "mama",
                "papa",
            ]),
            faith: terms(&[
                "tuhan",
                "yesus",
                "allah",
                "kristus",
                "roh kudus",
                "bapa",
                "doa",
                "berdoa",
                "iman",
                "salib",
                "firman",
                "gereja",
                "haleluya",
                "sorga",
                "anugerah",
                "rahmat",
            ]),
            imagery: terms(&[
                "bagai",
                "seperti",
                "laksana",
                "cahaya",
                "terang",
                "pelita",
                "lilin",
                "mutiara",
                "permata",
                "emas",
                "pohon",
                "akar",
                "benih",
                "sungai",
                "embun",
                "pelangi",
                "mentari",
                "bintang",
                "badai",
                "pelabuhan",
            ]),
            cliche: terms(&[
                "cinta sejati",
                "sehidup semati",
                "cinta mati",
                "hatiku hancur",
                "tak terhingga",
                "selama-lamanya",
                "bagai langit dan bumi",
            ]),
            distraction: terms(&[
                "gawai",
                "gadget",
                "medsos",
                "media sosial",
                "sibuk",
                "ponsel",
                "handphone",
                "layar",
                "notifikasi",
                "internet",
                "game online",
            ]),
            resolution: terms(&[
                "doa",
                "berdoa",
                "bersama",
                "kebersamaan",
                "bersatu",
                "berkumpul",
                "mezbah",
                "tuhan",
                "iman",
                "kembali",
                "pulih",
                "meja makan",
            ]),
            section_markers: terms(&["reff", "chorus", "verse", "bait"]),
            quality: QualityLexicons::default(),
        }
    }
}

impl Default for QualityLexicons {
    fn default() -> Self {
        Self {
            poetic: QualityCategory {
                keywords: weighted(&[
                    ("bagai", 4.0),
                    ("laksana", 5.0),
                    ("seperti", 3.0),
                    ("senja", 3.0),
                    ("fajar", 3.0),
                    ("sunyi", 3.0),
                    ("rindu", 2.0),
                ]),
                phrases: weighted(&[("bagai pelita", 8.0), ("laksana embun", 8.0)]),
                cap: 30.0,
            },
            emotional: QualityCategory {
                keywords: weighted(&[
                    ("peluk", 4.0),
                    ("haru", 4.0),
                    ("tangis", 4.0),
                    ("sukacita", 4.0),
                    ("luka", 3.0),
                    ("hangat", 3.0),
                    ("sepi", 3.0),
                    ("rindu", 3.0),
                ]),
                phrases: weighted(&[("air mata", 4.0), ("tanpa kata", 5.0)]),
                cap: 25.0,
            },
            imagery: QualityCategory {
                keywords: weighted(&[
                    ("cahaya", 4.0),
                    ("terang", 3.0),
                    ("pelita", 4.0),
                    ("lilin", 4.0),
                    ("embun", 4.0),
                    ("pelangi", 4.0),
                    ("badai", 3.0),
                    ("akar", 3.0),
                    ("pohon", 3.0),
                    ("sungai", 3.0),
                ]),
                phrases: weighted(&[("meja makan", 5.0)]),
                cap: 20.0,
            },
            spiritual: QualityCategory {
                keywords: weighted(&[
                    ("tuhan", 3.0),
                    ("doa", 4.0),
                    ("iman", 4.0),
                    ("salib", 4.0),
                    ("anugerah", 4.0),
                    ("kasih", 3.0),
                    ("firman", 4.0),
                ]),
                phrases: weighted(&[("roh kudus", 6.0)]),
                cap: 25.0,
            },
        }
    }
}

impl Default for LyricsWeights {
    fn default() -> Self {
        Self {
            theme: 35.0,
            relation: 25.0,
            imagery: 20.0,
            structure: 20.0,
            penalty: 15.0,
            theme_cap: 8,
            relation_cap: 10,
            imagery_cap: 5,
            structure_max: 4,
            penalty_max: 4,
            cliche_cap: 2,
            distraction_penalty: 2,
            line_uniqueness_min: 0.7,
            cuts: vec![20.0, 40.0, 60.0, 80.0],
        }
    }
}

impl Default for HarmonyWeights {
    fn default() -> Self {
        Self {
            extension: 2.0,
            extension_cap: 1.0,
            slash: 1.0,
            slash_cap: 0.5,
            non_diatonic: 1.0,
            non_diatonic_cap: 0.3,
            index: HarmonyIndexWeights::default(),
        }
    }
}

impl Default for HarmonyIndexWeights {
    fn default() -> Self {
        Self {
            extension: 0.25,
            non_diatonic: 0.15,
            slash: 0.10,
            transition: 0.25,
            uniqueness: 0.25,
        }
    }
}

impl Default for ThemeLexicon {
    fn default() -> Self {
        Self {
            keywords: weighted(&[
                ("keluarga", 8.0),
                ("iman", 6.0),
                ("doa", 5.0),
                ("digital", 5.0),
                ("gawai", 5.0),
                ("tuhan", 4.0),
                ("kasih", 4.0),
                ("bersama", 4.0),
                ("teladan", 4.0),
                ("rumah", 3.0),
                ("anak", 3.0),
                ("orang tua", 5.0),
            ]),
            phrases: weighted(&[
                ("mezbah keluarga", 15.0),
                ("keluarga kristen", 12.0),
                ("era digital", 12.0),
                ("doa bersama", 10.0),
                ("meja makan", 6.0),
            ]),
        }
    }
}

impl Default for Originality {
    fn default() -> Self {
        Self { threshold: 0.85 }
    }
}

impl Default for ChordSettings {
    fn default() -> Self {
        Self {
            priority: vec![ChordSource::ChordChart, ChordSource::Lyrics],
        }
    }
}

fn levels(items: [&str; 5]) -> BTreeMap<u8, String> {
    items
        .iter()
        .enumerate()
        .map(|(i, text)| (i as u8 + 1, text.to_string()))
        .collect()
}

pub fn default_rubric() -> Vec<RubricAspect> {
    vec![
        RubricAspect {
            key: "lyrics".into(),
            name: "Kekuatan Lirik".into(),
            max_points: 5.0,
            weight: 30.0,
            levels: levels([
                "Lirik lemah, tema tidak tergarap",
                "Lirik sederhana, tema disentuh sekilas",
                "Lirik cukup, tema tergarap",
                "Lirik kuat dengan citraan yang baik",
                "Lirik sangat kuat, puitis dan mendalam",
            ]),
        },
        RubricAspect {
            key: "theme".into(),
            name: "Relevansi Tema".into(),
            max_points: 5.0,
            weight: 25.0,
            levels: levels([
                "Tidak relevan dengan tema",
                "Kurang relevan",
                "Cukup relevan",
                "Relevan",
                "Sangat relevan",
            ]),
        },
        RubricAspect {
            key: "harmony".into(),
            name: "Kekayaan Harmoni".into(),
            max_points: 5.0,
            weight: 20.0,
            levels: levels([
                "Harmoni sangat terbatas",
                "Harmoni standar",
                "Harmoni cukup bervariasi",
                "Harmoni kaya",
                "Harmoni sangat kaya dan canggih",
            ]),
        },
        RubricAspect {
            key: "singability".into(),
            name: "Kemudahan Dinyanyikan".into(),
            max_points: 5.0,
            weight: 15.0,
            levels: levels([
                "Sulit dinyanyikan jemaat",
                "Cukup sulit",
                "Sedang",
                "Mudah dinyanyikan",
                "Sangat mudah dan mengalir",
            ]),
        },
        RubricAspect {
            key: "originality".into(),
            name: "Orisinalitas".into(),
            max_points: 5.0,
            weight: 10.0,
            levels: levels([
                "Sangat mirip karya lain",
                "Banyak kemiripan",
                "Cukup orisinal",
                "Orisinal",
                "Sangat orisinal",
            ]),
        },
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "default-1".to_string(),
            lexicons: Lexicons::default(),
            lyrics: LyricsWeights::default(),
            harmony: HarmonyWeights::default(),
            theme: ThemeLexicon::default(),
            originality: Originality::default(),
            chords: ChordSettings::default(),
            rubric: default_rubric(),
        }
    }
}

impl Settings {
    /// Loads `settings.default.ron` then lets `settings.ron` replace it, falling
    /// back to the built-in defaults when neither file exists.
    pub fn load() -> Result<Settings> {
        Self::load_from(
            Path::new(DEFAULT_SETTINGS_PATH),
            Path::new(OVERRIDE_SETTINGS_PATH),
        )
    }

    pub fn load_from(default_path: &Path, override_path: &Path) -> Result<Settings> {
        let mut settings = if default_path.exists() {
            Self::from_file(default_path)?
        } else {
            Settings::default()
        };

        if override_path.exists() {
            settings = Self::from_file(override_path)?;
        }

        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_ron_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_ron_str(content: &str) -> Result<Settings> {
        ron::from_str(content).context("invalid settings RON")
    }

    pub fn rubric_weight_total(&self) -> f64 {
        self.rubric.iter().map(|a| a.weight).sum()
    }
}
