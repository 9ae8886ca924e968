// SPDX-License-Identifier: GPL-3.0-or-later

//! Coarse genre bucketing over free-text catalog tags.
//!
//! The taxonomy is a fixed, closed set. Classification concatenates the tag
//! set into one lowercase blob and counts keyword substring hits per bucket;
//! regional-pop buckets short-circuit before scoring, christian-adjacent tags
//! route through a fixed rock/hip-hop/pop check, and a pop-vs-rock adjustment
//! breaks the most common keyword overlap. Ties fall to the first-declared
//! bucket.

use serde::{Deserialize, Serialize};

/// One coarse genre from the fixed taxonomy. Declaration order is the
/// tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Rock,
    Metal,
    Pop,
    HipHop,
    RnB,
    Country,
    Electronic,
    Latin,
    Reggae,
    Jazz,
    Classical,
    Folk,
    Blues,
    Gospel,
    Afrobeat,
    KPop,
    JPop,
    World,
}

impl Bucket {
    pub const ALL: [Bucket; 18] = [
        Bucket::Rock,
        Bucket::Metal,
        Bucket::Pop,
        Bucket::HipHop,
        Bucket::RnB,
        Bucket::Country,
        Bucket::Electronic,
        Bucket::Latin,
        Bucket::Reggae,
        Bucket::Jazz,
        Bucket::Classical,
        Bucket::Folk,
        Bucket::Blues,
        Bucket::Gospel,
        Bucket::Afrobeat,
        Bucket::KPop,
        Bucket::JPop,
        Bucket::World,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Bucket::Rock => "Rock",
            Bucket::Metal => "Metal",
            Bucket::Pop => "Pop",
            Bucket::HipHop => "HipHop",
            Bucket::RnB => "RnB",
            Bucket::Country => "Country",
            Bucket::Electronic => "Electronic",
            Bucket::Latin => "Latin",
            Bucket::Reggae => "Reggae",
            Bucket::Jazz => "Jazz",
            Bucket::Classical => "Classical",
            Bucket::Folk => "Folk",
            Bucket::Blues => "Blues",
            Bucket::Gospel => "Gospel",
            Bucket::Afrobeat => "Afrobeat",
            Bucket::KPop => "KPop",
            Bucket::JPop => "JPop",
            Bucket::World => "World",
        }
    }

    /// Lowercase keyword phrases owned by this bucket. Each distinct phrase
    /// found in the tag blob contributes one point, repeats do not.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Bucket::Rock => &[
                "rock",
                "punk",
                "grunge",
                "emo",
                "new wave",
                "shoegaze",
                "psychedelic",
                "britpop",
                "post-hardcore",
                "alternative",
                "indie",
            ],
            Bucket::Metal => &[
                "metal",
                "metalcore",
                "thrash",
                "death metal",
                "black metal",
                "doom",
                "djent",
                "nu metal",
            ],
            Bucket::Pop => &[
                "pop",
                "dance pop",
                "electropop",
                "synthpop",
                "synth-pop",
                "boy band",
                "girl group",
                "teen pop",
                "bubblegum",
            ],
            Bucket::HipHop => &[
                "hip hop",
                "hip-hop",
                "rap",
                "trap",
                "drill",
                "grime",
                "boom bap",
                "crunk",
            ],
            Bucket::RnB => &[
                "r&b",
                "rnb",
                "soul",
                "funk",
                "neo soul",
                "new jack swing",
                "motown",
                "doo-wop",
                "quiet storm",
            ],
            Bucket::Country => &[
                "country",
                "bluegrass",
                "honky tonk",
                "honky-tonk",
                "americana",
                "nashville",
                "western",
            ],
            Bucket::Electronic => &[
                "edm",
                "house",
                "techno",
                "electro",
                "electronic",
                "electronica",
                "dubstep",
                "trance",
                "drum and bass",
                "eurodance",
                "big room",
                "synthwave",
                "hardstyle",
                "rave",
            ],
            Bucket::Latin => &[
                "latin",
                "reggaeton",
                "salsa",
                "bachata",
                "cumbia",
                "banda",
                "norteno",
                "norteño",
                "mariachi",
                "urbano",
                "corrido",
            ],
            Bucket::Reggae => &["reggae", "dancehall", "ska", "dub", "riddim"],
            Bucket::Jazz => &["jazz", "bebop", "swing", "big band", "bossa nova"],
            Bucket::Classical => &[
                "classical",
                "orchestra",
                "symphony",
                "opera",
                "baroque",
                "chamber music",
                "concerto",
            ],
            Bucket::Folk => &["folk", "singer-songwriter", "traditional folk"],
            Bucket::Blues => &["blues", "delta blues", "boogie"],
            Bucket::Gospel => &["gospel", "christian", "worship", "ccm", "praise"],
            Bucket::Afrobeat => &["afrobeat", "afrobeats", "afropop", "afro-fusion"],
            Bucket::KPop => &["k-pop", "kpop", "korean"],
            Bucket::JPop => &["j-pop", "jpop", "japanese", "city pop", "anime"],
            Bucket::World => &["world", "celtic", "flamenco", "bollywood", "bhangra", "soca"],
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classification outcome: either a taxonomy bucket, or `Other` when tags
/// existed but matched no bucket keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenreLabel {
    Bucket(Bucket),
    Other,
}

impl GenreLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenreLabel::Bucket(b) => b.name(),
            GenreLabel::Other => "Other",
        }
    }
}

impl std::fmt::Display for GenreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dominance decision over aggregated tags: the winning bucket and how
/// one-sided the keyword scores were (1.0 when nothing else scored).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub bucket: Bucket,
    pub strength: f32,
}

/// Regional-pop buckets win outright when any of their keywords appear,
/// checked in this priority order before any scoring.
const SHORT_CIRCUIT: [Bucket; 2] = [Bucket::KPop, Bucket::JPop];

const CHRISTIAN_MARKERS: [&str; 3] = ["christian", "worship", "ccm"];

/// Crossover markers that push a pop/rock overlap toward Rock.
const HARD_LEANING: [&str; 7] = [
    "punk",
    "metal",
    "grunge",
    "emo",
    "hard rock",
    "pop punk",
    "punk rock",
];

/// Tags are joined with a separator so phrases never form across tag
/// boundaries.
fn blob_of(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

fn short_circuit_bucket(blob: &str) -> Option<Bucket> {
    SHORT_CIRCUIT
        .into_iter()
        .find(|bucket| bucket.keywords().iter().any(|kw| blob.contains(kw)))
}

/// Keyword-hit scores per bucket, in declaration order, with the pop/rock
/// crossover adjustment already applied.
pub fn score_buckets(blob: &str) -> Vec<(Bucket, u32)> {
    let mut scores: Vec<(Bucket, u32)> = Bucket::ALL
        .into_iter()
        .map(|bucket| {
            let hits = bucket
                .keywords()
                .iter()
                .filter(|kw| blob.contains(*kw))
                .count() as u32;
            (bucket, hits)
        })
        .collect();

    let pop = score_of(&scores, Bucket::Pop);
    let rock = score_of(&scores, Bucket::Rock);
    if pop > 0 && rock > 0 {
        let leans_hard =
            HARD_LEANING.iter().any(|kw| blob.contains(kw)) || blob.contains("pop rock");
        let winner = if leans_hard { Bucket::Rock } else { Bucket::Pop };
        bump(&mut scores, winner);
    }

    scores
}

fn score_of(scores: &[(Bucket, u32)], bucket: Bucket) -> u32 {
    scores
        .iter()
        .find(|(b, _)| *b == bucket)
        .map(|(_, s)| *s)
        .unwrap_or(0)
}

fn bump(scores: &mut [(Bucket, u32)], bucket: Bucket) {
    if let Some(entry) = scores.iter_mut().find(|(b, _)| *b == bucket) {
        entry.1 += 1;
    }
}

/// Top bucket and runner-up score. First-declared wins ties, so the scan
/// only replaces on a strictly greater score.
fn top_and_second(scores: &[(Bucket, u32)]) -> (Bucket, u32, u32) {
    let mut top = scores[0];
    for entry in &scores[1..] {
        if entry.1 > top.1 {
            top = *entry;
        }
    }
    let second = scores
        .iter()
        .filter(|(b, _)| *b != top.0)
        .map(|(_, s)| *s)
        .max()
        .unwrap_or(0);
    (top.0, top.1, second)
}

/// Classify a tag set into one bucket, `Other`, or nothing at all.
///
/// Returns `None` only when there were no usable tags; `Some(Other)` when
/// tags existed but no keyword matched.
pub fn classify(tags: &[String]) -> Option<GenreLabel> {
    let blob = blob_of(tags);
    if blob.is_empty() {
        return None;
    }

    if let Some(bucket) = short_circuit_bucket(&blob) {
        return Some(GenreLabel::Bucket(bucket));
    }

    if CHRISTIAN_MARKERS.iter().any(|kw| blob.contains(kw)) {
        for bucket in [Bucket::Rock, Bucket::HipHop, Bucket::Pop] {
            if bucket.keywords().iter().any(|kw| blob.contains(kw)) {
                return Some(GenreLabel::Bucket(bucket));
            }
        }
        return Some(GenreLabel::Bucket(Bucket::Gospel));
    }

    let scores = score_buckets(&blob);
    let (bucket, top, _second) = top_and_second(&scores);
    if top == 0 {
        return Some(GenreLabel::Other);
    }
    Some(GenreLabel::Bucket(bucket))
}

/// Dominance decision over aggregated neighbor tags.
///
/// Decides only when the non-empty tag count reaches `min_tag_count` and the
/// top bucket's score is at least `dominance_ratio` times the runner-up
/// (an absent runner-up passes automatically). An undecided aggregation is a
/// fallthrough for the caller, not a terminal answer.
pub fn decide(tags: &[String], min_tag_count: usize, dominance_ratio: f32) -> Option<Decision> {
    let usable = tags.iter().filter(|t| !t.trim().is_empty()).count();
    if usable < min_tag_count {
        return None;
    }

    let blob = blob_of(tags);
    if let Some(bucket) = short_circuit_bucket(&blob) {
        return Some(Decision {
            bucket,
            strength: 1.0,
        });
    }

    let scores = score_buckets(&blob);
    let (bucket, top, second) = top_and_second(&scores);
    if top == 0 {
        return None;
    }
    if second == 0 {
        return Some(Decision {
            bucket,
            strength: 1.0,
        });
    }
    if (top as f32) >= dominance_ratio * (second as f32) {
        return Some(Decision {
            bucket,
            strength: top as f32 / (top + second) as f32,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn regional_pop_short_circuits_generic_scoring() {
        assert_eq!(
            classify(&tags(&["k-pop", "pop"])),
            Some(GenreLabel::Bucket(Bucket::KPop))
        );
        assert_eq!(
            classify(&tags(&["j-pop", "rock"])),
            Some(GenreLabel::Bucket(Bucket::JPop))
        );
    }

    #[test]
    fn christian_tags_route_by_backing_style() {
        assert_eq!(
            classify(&tags(&["christian rock"])),
            Some(GenreLabel::Bucket(Bucket::Rock))
        );
        assert_eq!(
            classify(&tags(&["christian hip hop"])),
            Some(GenreLabel::Bucket(Bucket::HipHop))
        );
        assert_eq!(
            classify(&tags(&["christian pop"])),
            Some(GenreLabel::Bucket(Bucket::Pop))
        );
        assert_eq!(
            classify(&tags(&["christian"])),
            Some(GenreLabel::Bucket(Bucket::Gospel))
        );
        assert_eq!(
            classify(&tags(&["worship"])),
            Some(GenreLabel::Bucket(Bucket::Gospel))
        );
    }

    #[test]
    fn pop_rock_overlap_leans_by_crossover_markers() {
        // "punk" pushes the overlap to Rock.
        assert_eq!(
            classify(&tags(&["pop punk"])),
            Some(GenreLabel::Bucket(Bucket::Rock))
        );
        // The literal phrase does too.
        assert_eq!(
            classify(&tags(&["pop rock"])),
            Some(GenreLabel::Bucket(Bucket::Rock))
        );
        // Soft overlap goes to Pop.
        assert_eq!(
            classify(&tags(&["synthpop", "rockabilly"])),
            Some(GenreLabel::Bucket(Bucket::Pop))
        );
    }

    #[test]
    fn ties_break_to_first_declared_bucket() {
        // Pop and HipHop both score one; Pop is declared first.
        assert_eq!(
            classify(&tags(&["pop rap"])),
            Some(GenreLabel::Bucket(Bucket::Pop))
        );
        // Electronic beats Reggae on the dubstep/dub overlap.
        assert_eq!(
            classify(&tags(&["dubstep"])),
            Some(GenreLabel::Bucket(Bucket::Electronic))
        );
    }

    #[test]
    fn unmatched_tags_are_other_and_no_tags_are_none() {
        assert_eq!(classify(&tags(&["vaporcore nonsense"])), Some(GenreLabel::Other));
        assert_eq!(classify(&[]), None);
        assert_eq!(classify(&tags(&["", "  "])), None);
    }

    #[test]
    fn decide_requires_minimum_tag_count() {
        // Top score 2, second 1, but only four tags: below the gate.
        let aggregated = tags(&["rock", "indie rock", "pop", "lo-fi"]);
        assert_eq!(decide(&aggregated, 6, 2.0), None);
    }

    #[test]
    fn decide_requires_dominance_ratio() {
        // Six tags, Rock 4 vs Pop 3 after the soft adjustment: 4 < 2.0 * 3.
        let aggregated = tags(&[
            "alternative rock",
            "shoegaze",
            "new wave",
            "dream pop",
            "synthpop",
            "something else",
        ]);
        assert_eq!(decide(&aggregated, 6, 2.0), None);
    }

    #[test]
    fn decide_with_no_runner_up_passes_automatically() {
        let aggregated = tags(&[
            "rock",
            "hard rock",
            "classic rock",
            "garage rock",
            "arena rock",
            "rock and roll",
        ]);
        let decision = decide(&aggregated, 6, 2.0).expect("dominant rock tags decide");
        assert_eq!(decision.bucket, Bucket::Rock);
        assert_eq!(decision.strength, 1.0);
    }

    #[test]
    fn decide_strength_reflects_score_split() {
        let aggregated = tags(&[
            "trap",
            "rap",
            "hip hop",
            "drill",
            "soul",
            "something else",
        ]);
        let decision = decide(&aggregated, 6, 2.0).expect("hip hop dominates");
        assert_eq!(decision.bucket, Bucket::HipHop);
        assert!((decision.strength - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn decide_never_picks_a_zero_score_bucket() {
        let aggregated = tags(&["aaa", "bbb", "ccc", "ddd", "eee", "fff"]);
        assert_eq!(decide(&aggregated, 6, 2.0), None);
    }

    #[test]
    fn bucket_names_are_stable() {
        assert_eq!(Bucket::HipHop.name(), "HipHop");
        assert_eq!(Bucket::RnB.name(), "RnB");
        assert_eq!(GenreLabel::Other.as_str(), "Other");
        assert_eq!(Bucket::ALL.len(), 18);
    }
}
