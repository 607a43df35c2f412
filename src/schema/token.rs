//! Offset-anchored tokens and their grammatical categories.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of word categories eligible to become blanks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    /// Lower-case name used in blank ids and prompts (e.g. "noun").
    pub fn name(&self) -> &'static str {
        match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adjective => "adjective",
            Self::Adverb => "adverb",
        }
    }

    /// Short definition with examples, shown next to prompts.
    pub fn definition(&self) -> &'static str {
        match self {
            Self::Noun => "a person, place, or thing (e.g., dragon, castle, shoe).",
            Self::Verb => "an action word (e.g., run, laugh, think).",
            Self::Adjective => "describes a noun (e.g., funny, bright, slimy).",
            Self::Adverb => "describes a verb, often ends in -ly (e.g., quickly, loudly, happily).",
        }
    }

    /// Article to use in front of the name ("a noun", "an adjective").
    pub fn article(&self) -> &'static str {
        match self {
            Self::Adjective | Self::Adverb => "an",
            Self::Noun | Self::Verb => "a",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Verb tense as detected by the tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tense {
    Present,
    Past,
    Future,
    Gerund,
    Infinitive,
}

impl Tense {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Present => "present tense",
            Self::Past => "past tense",
            Self::Future => "future tense",
            Self::Gerund => "ending in -ing",
            Self::Infinitive => "infinitive",
        }
    }

    /// Hint shown for tensed verb prompts.
    pub fn definition(&self) -> &'static str {
        match self {
            Self::Present => "an action happening now (e.g., runs, laughs, thinks).",
            Self::Past => "an action that already happened (e.g., jumped, slept, ate).",
            Self::Future => "an action that will happen (e.g., will run, will sing).",
            Self::Gerund => "an action that is ongoing (e.g., running, sleeping, eating).",
            Self::Infinitive => "the base form of an action (e.g., to run, to dance).",
        }
    }
}

/// The tagger-independent classification every adapter maps onto.
///
/// `Other` covers determiners, prepositions, pronouns and anything else
/// that never becomes a blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Other,
}

impl WordClass {
    pub fn part_of_speech(self) -> Option<PartOfSpeech> {
        match self {
            Self::Noun => Some(PartOfSpeech::Noun),
            Self::Verb => Some(PartOfSpeech::Verb),
            Self::Adjective => Some(PartOfSpeech::Adjective),
            Self::Adverb => Some(PartOfSpeech::Adverb),
            Self::Other => None,
        }
    }
}

/// A word as it appears in the tagger adapter output, before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    /// Byte offset into the analyzed text.
    pub offset: usize,
    pub class: WordClass,
    pub tense: Option<Tense>,
}

/// A classified, offset-anchored unit of source text eligible for replacement.
///
/// Invariant: `source[offset..offset + text.len()] == text` for the text
/// the token was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Byte offset into the analyzed text.
    pub offset: usize,
    pub part_of_speech: PartOfSpeech,
    /// Only ever set for verbs.
    pub tense: Option<Tense>,
}

impl Token {
    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// True when this token still matches `source` at its offset.
    pub fn is_anchored_in(&self, source: &str) -> bool {
        source.get(self.offset..self.end()) == Some(self.text.as_str())
    }

    /// Human label such as "noun" or "verb (past tense)".
    pub fn label(&self) -> String {
        match self.tense {
            Some(tense) if self.part_of_speech == PartOfSpeech::Verb => {
                format!("{} ({})", self.part_of_speech.name(), tense.name())
            }
            _ => self.part_of_speech.name().to_string(),
        }
    }

    pub fn definition(&self) -> &'static str {
        match self.tense {
            Some(tense) if self.part_of_speech == PartOfSpeech::Verb => tense.definition(),
            _ => self.part_of_speech.definition(),
        }
    }
}

/// The offset-ordered candidates found in one analyzed text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    tokens: Vec<Token>,
}

impl CandidateSet {
    /// Build a candidate set, sorting by offset and collapsing exact
    /// `(offset, text)` duplicates. Distinct offsets are always retained.
    ///
    /// A second token with the same category at the same offset is also
    /// dropped, so `{category}-{offset}` ids stay unique.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.sort_by_key(|t| t.offset);
        let mut spans = FxHashSet::default();
        let mut slots = FxHashSet::default();
        tokens.retain(|t| {
            let new_span = spans.insert((t.offset, t.text.clone()));
            new_span && slots.insert((t.offset, t.part_of_speech))
        });
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Number of candidates per part of speech.
    pub fn count_of(&self, pos: PartOfSpeech) -> usize {
        self.tokens.iter().filter(|t| t.part_of_speech == pos).count()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
