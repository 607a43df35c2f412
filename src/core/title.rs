//! Display-title heuristic based on keyword clusters.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rustc_hash::FxHashSet;

/// Keyword clusters in priority order, each with its title.
const CLUSTERS: &[(&[&str], &str)] = &[
    (&["princess", "castle", "dragon", "knight", "wizard", "fairy"], "The Fairy Tale Adventure"),
    (&["space", "planet", "alien", "rocket", "astronaut", "star"], "The Space Adventure"),
    (&["ocean", "sea", "ship", "pirate", "island", "whale"], "The Ocean Adventure"),
    (&["forest", "tree", "animal", "woods", "fox", "bear"], "The Forest Adventure"),
    (&["school", "teacher", "student", "class", "homework"], "The School Story"),
    (&["family", "home", "house", "mother", "father", "sister", "brother"], "The Family Adventure"),
];

/// Titles used when no cluster matches.
const GENERIC_TITLES: &[&str] = &[
    "The Amazing Adventure",
    "A Wild Tale",
    "The Incredible Story",
    "An Unexpected Journey",
    "The Mysterious Case",
    "A Fantastic Adventure",
    "The Great Escape",
    "An Extraordinary Day",
    "The Secret Mission",
    "A Magical Experience",
    "The Epic Quest",
    "An Unusual Discovery",
    "The Wonderful World",
    "A Thrilling Adventure",
    "The Amazing Discovery",
];

/// Title for the first keyword cluster with a word in `text`, or a random
/// generic title. Keywords match whole words or their plurals,
/// case-insensitively.
pub fn title_for(text: &str, rng: &mut StdRng) -> String {
    keyword_title(text)
        .or_else(|| GENERIC_TITLES.choose(rng).copied())
        .unwrap_or("A Silly Story")
        .to_string()
}

/// The cluster title alone, without the random fallback.
pub fn keyword_title(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    let words: FxHashSet<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    CLUSTERS
        .iter()
        .find(|(keywords, _)| {
            keywords
                .iter()
                .any(|k| words.iter().any(|w| matches_keyword(w, k)))
        })
        .map(|(_, title)| *title)
}

/// `word` is `keyword` or its plain `-s`/`-es` plural.
fn matches_keyword(word: &str, keyword: &str) -> bool {
    word.strip_prefix(keyword)
        .is_some_and(|rest| matches!(rest, "" | "s" | "es"))
}
