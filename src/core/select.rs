//! Blank selection: picks a bounded, well-distributed subset of candidates.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::blank::BlankSelection;
use crate::schema::token::{CandidateSet, PartOfSpeech, Token};

/// Decides which candidates become blanks (not how many).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Uniform shuffle. May cluster or starve a category.
    Random,
    /// Shuffle each category, then take one from each in turn, so a text
    /// dominated by one part of speech still yields variety.
    RoundRobinByCategory,
    /// Deterministic stride through the offset-ordered candidates. Avoids
    /// clustering but can starve categories.
    EvenlySpaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Hard ceiling on the number of blanks.
    #[serde(default = "default_max_blanks")]
    pub max_blanks: usize,
    /// Target share of candidates to select.
    #[serde(default = "default_fraction")]
    pub fraction: f64,
    #[serde(default = "default_policy")]
    pub policy: SelectionPolicy,
}

fn default_max_blanks() -> usize {
    20
}

fn default_fraction() -> f64 {
    0.125
}

fn default_policy() -> SelectionPolicy {
    SelectionPolicy::RoundRobinByCategory
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_blanks: default_max_blanks(),
            fraction: default_fraction(),
            policy: default_policy(),
        }
    }
}

impl SelectionConfig {
    /// `clamp(floor(total * fraction), 1, max_blanks)`, never more than
    /// `total` and zero when there is nothing to choose from.
    pub fn target_count(&self, total: usize) -> usize {
        if total == 0 {
            return 0;
        }
        let raw = (total as f64 * self.fraction.max(0.0)).floor() as usize;
        raw.max(1).min(self.max_blanks.max(1)).min(total)
    }
}

/// Choose blanks from `candidates`. The result is offset-ordered and
/// numbered 1..=N; an empty candidate set yields an empty selection.
pub fn select(candidates: &CandidateSet, config: &SelectionConfig, rng: &mut StdRng) -> BlankSelection {
    let target = config.target_count(candidates.len());
    if target == 0 {
        debug!("no candidates to select from");
        return BlankSelection::default();
    }

    let chosen = match config.policy {
        SelectionPolicy::Random => pick_random(candidates.tokens(), target, rng),
        SelectionPolicy::RoundRobinByCategory => pick_round_robin(candidates.tokens(), target, rng),
        SelectionPolicy::EvenlySpaced => pick_evenly_spaced(candidates.tokens(), target),
    };

    debug!(
        candidates = candidates.len(),
        target,
        selected = chosen.len(),
        policy = ?config.policy,
        "selected blanks"
    );
    BlankSelection::from_tokens(chosen)
}

fn pick_random(tokens: &[Token], target: usize, rng: &mut StdRng) -> Vec<Token> {
    let mut pool: Vec<&Token> = tokens.iter().collect();
    pool.shuffle(rng);
    pool.into_iter().take(target).cloned().collect()
}

fn pick_round_robin(tokens: &[Token], target: usize, rng: &mut StdRng) -> Vec<Token> {
    let mut partitions: Vec<Vec<&Token>> = PartOfSpeech::ALL
        .iter()
        .map(|pos| tokens.iter().filter(|t| t.part_of_speech == *pos).collect::<Vec<_>>())
        .filter(|p| !p.is_empty())
        .collect();
    for partition in &mut partitions {
        partition.shuffle(rng);
    }
    // Vary which category leads so small targets are not always nouns.
    partitions.shuffle(rng);

    let mut chosen = Vec::with_capacity(target);
    let mut round = 0;
    while chosen.len() < target {
        let mut took_any = false;
        for partition in &partitions {
            if chosen.len() == target {
                break;
            }
            if let Some(token) = partition.get(round) {
                chosen.push((*token).clone());
                took_any = true;
            }
        }
        if !took_any {
            break;
        }
        round += 1;
    }
    chosen
}

fn pick_evenly_spaced(tokens: &[Token], target: usize) -> Vec<Token> {
    let gap = (tokens.len() / target).max(1);
    let mut chosen = Vec::with_capacity(target);
    let mut last: Option<usize> = None;
    for (i, token) in tokens.iter().enumerate() {
        if chosen.len() == target {
            break;
        }
        if last.map_or(true, |l| i - l >= gap) {
            chosen.push(token.clone());
            last = Some(i);
        }
    }
    chosen
}
