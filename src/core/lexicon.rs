//! Built-in lexicon tagger: a small dictionary plus suffix rules, so the
//! engine works without an external NLP model.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::tagger::{is_word_char, RawTerm, Tagger, TaggerError};

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

const BUILTIN_LEXICON: &str = include_str!("../../data/lexicon.ron");

/// Tags a word receives when it ends with `suffix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuffixRule {
    pub suffix: String,
    pub tags: Vec<String>,
    /// Shortest word (in chars) the rule applies to.
    #[serde(default)]
    pub min_len: usize,
}

/// Word list and heuristics for [`LexiconTagger`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    /// Tags for words nothing else matched. Empty means such words are
    /// reported untagged.
    #[serde(default)]
    pub default_tags: Vec<String>,
    /// Closed-class words (articles, pronouns, auxiliaries, ...).
    #[serde(default)]
    pub stop_words: FxHashSet<String>,
    /// Explicit tags per lower-case word. Wins over every other rule.
    #[serde(default)]
    pub entries: FxHashMap<String, Vec<String>>,
    /// Checked in order; first match wins.
    #[serde(default)]
    pub suffix_rules: Vec<SuffixRule>,
}

impl Lexicon {
    /// The lexicon compiled into the crate.
    pub fn builtin() -> Result<Lexicon, LexiconError> {
        Self::parse_ron(BUILTIN_LEXICON)
    }

    pub fn load_from_ron(path: &Path) -> Result<Lexicon, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Lexicon, LexiconError> {
        let mut lexicon: Lexicon = ron::from_str(input)?;
        lexicon.normalize();
        Ok(lexicon)
    }

    /// Merge another lexicon into this one. Entries and stop words from
    /// `other` are added; its suffix rules are checked before ours.
    pub fn merge(&mut self, other: Lexicon) {
        self.stop_words.extend(other.stop_words);
        self.entries.extend(other.entries);
        let mut rules = other.suffix_rules;
        rules.append(&mut self.suffix_rules);
        self.suffix_rules = rules;
        if !other.default_tags.is_empty() {
            self.default_tags = other.default_tags;
        }
    }

    fn normalize(&mut self) {
        self.stop_words = self.stop_words.drain().map(|w| w.to_lowercase()).collect();
        self.entries = self
            .entries
            .drain()
            .map(|(w, tags)| (w.to_lowercase(), tags))
            .collect();
    }

    /// Tags for one word. `sentence_start` suppresses the proper-noun
    /// guess for capitalized words.
    pub fn tags_for(&self, word: &str, sentence_start: bool) -> Vec<String> {
        let lower = word.to_lowercase();
        if let Some(tags) = self.entries.get(&lower) {
            return tags.clone();
        }
        if self.stop_words.contains(&lower) {
            return vec!["Function".to_string()];
        }
        if word.chars().all(|c| c.is_numeric()) {
            return vec!["Value".to_string()];
        }
        if !sentence_start && word.chars().next().is_some_and(char::is_uppercase) {
            return vec!["ProperNoun".to_string(), "Noun".to_string()];
        }
        let char_len = lower.chars().count();
        for rule in &self.suffix_rules {
            if char_len >= rule.min_len && lower.ends_with(rule.suffix.as_str()) {
                return rule.tags.clone();
            }
        }
        self.default_tags.clone()
    }
}

/// Dictionary-and-suffix tagger that always reports offsets.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    lexicon: Lexicon,
}

impl LexiconTagger {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn builtin() -> Result<Self, LexiconError> {
        Ok(Self::new(Lexicon::builtin()?))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<RawTerm>, TaggerError> {
        Ok(split_words(text)
            .into_iter()
            .map(|(offset, word, sentence_start)| RawTerm {
                text: word.to_string(),
                offset: Some(offset),
                tags: self.lexicon.tags_for(word, sentence_start),
            })
            .collect())
    }
}

fn is_joiner(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '-')
}

/// Split into `(offset, word, starts_sentence)` triples. Apostrophes and
/// hyphens stay inside a word only when flanked by word characters.
fn split_words(text: &str) -> Vec<(usize, &str, bool)> {
    let mut words = Vec::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentence_start = true;
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];
        if !is_word_char(c) {
            if matches!(c, '.' | '!' | '?') {
                sentence_start = true;
            }
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() {
            let (_, cj) = chars[j];
            let joined = is_joiner(cj)
                && chars.get(j + 1).is_some_and(|&(_, next)| is_word_char(next));
            if is_word_char(cj) || joined {
                j += 1;
            } else {
                break;
            }
        }
        let end = chars.get(j).map_or(text.len(), |&(pos, _)| pos);
        words.push((start, &text[start..end], sentence_start));
        sentence_start = false;
        i = j;
    }
    words
}
