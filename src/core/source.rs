//! Random-story sources. Whatever a source returns is treated exactly like
//! text typed by the user.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// Sample stories compiled into the crate, separated by blank lines.
pub const BUILTIN_STORIES: &str = include_str!("../../data/stories.txt");

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no story fits the length limits")]
    NoEligibleStory,
    #[error("story source unavailable: {0}")]
    Unavailable(String),
}

/// Supplies alternate input text.
pub trait StorySource {
    fn next_story(&mut self) -> Result<String, SourceError>;
}

/// Length limits a story must satisfy to be offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryLimits {
    /// Trimmed length must exceed this many chars.
    pub min_chars: usize,
    pub max_chars: usize,
    pub max_words: usize,
}

impl Default for StoryLimits {
    fn default() -> Self {
        Self {
            min_chars: 50,
            max_chars: 1000,
            max_words: 200,
        }
    }
}

impl StoryLimits {
    pub fn accepts(&self, story: &str) -> bool {
        story.trim().chars().count() > self.min_chars
            && story.chars().count() <= self.max_chars
            && story.split_whitespace().count() <= self.max_words
    }
}

/// Picks a random eligible story from a fixed list.
#[derive(Debug, Clone)]
pub struct InMemoryStories {
    stories: Vec<String>,
    limits: StoryLimits,
    rng: StdRng,
}

impl InMemoryStories {
    pub fn new(stories: Vec<String>, seed: u64) -> Self {
        Self {
            stories,
            limits: StoryLimits::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stories from plain text, one per blank-line-separated paragraph.
    /// Line breaks inside a paragraph are folded to spaces.
    pub fn from_text(text: &str, seed: u64) -> Self {
        Self::new(split_paragraphs(text), seed)
    }

    pub fn builtin(seed: u64) -> Self {
        Self::from_text(BUILTIN_STORIES, seed)
    }

    pub fn with_limits(mut self, limits: StoryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Stories that pass the length limits.
    pub fn eligible(&self) -> Vec<&str> {
        self.stories
            .iter()
            .map(String::as_str)
            .filter(|s| self.limits.accepts(s))
            .collect()
    }
}

fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

impl StorySource for InMemoryStories {
    fn next_story(&mut self) -> Result<String, SourceError> {
        let eligible: Vec<&String> = self
            .stories
            .iter()
            .filter(|s| self.limits.accepts(s))
            .collect();
        eligible
            .choose(&mut self.rng)
            .map(|s| s.to_string())
            .ok_or(SourceError::NoEligibleStory)
    }
}
