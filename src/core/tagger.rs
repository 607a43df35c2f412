//! Tokenizer+tagger adapter: turns any grammatical tagger's output into
//! offset-exact, classified tokens.

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::schema::token::{TaggedToken, Tense, WordClass};

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("tagger failed: {0}")]
    Failed(String),
    #[error("tagger returned unusable output: {0}")]
    Malformed(String),
}

/// One term as reported by a tagger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTerm {
    /// Substring of the input, possibly with punctuation still attached.
    pub text: String,
    /// Byte offset into the input, when the tagger reports one.
    pub offset: Option<usize>,
    /// Tagger-specific tag names.
    pub tags: Vec<String>,
}

impl RawTerm {
    pub fn new(text: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            text: text.into(),
            offset: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A grammatical tagger. Terms must be reported in text order.
pub trait Tagger {
    fn tag(&self, text: &str) -> Result<Vec<RawTerm>, TaggerError>;
}

impl<F> Tagger for F
where
    F: Fn(&str) -> Result<Vec<RawTerm>, TaggerError>,
{
    fn tag(&self, text: &str) -> Result<Vec<RawTerm>, TaggerError> {
        self(text)
    }
}

/// Maps a tagger's own tag vocabulary onto [`WordClass`].
pub trait TagPolicy {
    fn classify(&self, term: &RawTerm) -> (WordClass, Option<Tense>);
}

/// Policy for compromise-style tag names (`Noun`, `ProperNoun`,
/// `Adjective`, `Adverb`, `Verb`, `PastTense`, ...).
///
/// Priority: noun, adjective, adverb, verb. Verbs with no tense tag are
/// present tense.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompromiseTagPolicy;

impl TagPolicy for CompromiseTagPolicy {
    fn classify(&self, term: &RawTerm) -> (WordClass, Option<Tense>) {
        if term.has_tag("Noun") || term.has_tag("ProperNoun") {
            (WordClass::Noun, None)
        } else if term.has_tag("Adjective") {
            (WordClass::Adjective, None)
        } else if term.has_tag("Adverb") {
            (WordClass::Adverb, None)
        } else if term.has_tag("Verb") {
            let tense = if term.has_tag("PastTense") {
                Tense::Past
            } else if term.has_tag("PresentTense") {
                Tense::Present
            } else if term.has_tag("FutureTense") {
                Tense::Future
            } else if term.has_tag("Gerund") {
                Tense::Gerund
            } else if term.has_tag("Infinitive") {
                Tense::Infinitive
            } else {
                Tense::Present
            };
            (WordClass::Verb, Some(tense))
        } else {
            (WordClass::Other, None)
        }
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Number of word characters, ignoring punctuation.
fn word_len(s: &str) -> usize {
    s.chars().filter(|c| is_word_char(*c)).count()
}

/// Trim non-word characters from both ends, returning the inner slice and
/// how many bytes were cut from the front.
fn trim_to_word(s: &str) -> (&str, usize) {
    let start_trimmed = s.trim_start_matches(|c: char| !is_word_char(c));
    let lead = s.len() - start_trimmed.len();
    (start_trimmed.trim_end_matches(|c: char| !is_word_char(c)), lead)
}

/// Default minimum word length, counted in word characters.
pub const DEFAULT_MIN_WORD_LEN: usize = 2;

/// Runs a [`Tagger`] and recovers exact offsets for every term.
pub struct TaggerAdapter<'a> {
    tagger: &'a dyn Tagger,
    policy: &'a dyn TagPolicy,
    min_word_len: usize,
}

impl<'a> TaggerAdapter<'a> {
    pub fn new(tagger: &'a dyn Tagger, policy: &'a dyn TagPolicy) -> Self {
        Self {
            tagger,
            policy,
            min_word_len: DEFAULT_MIN_WORD_LEN,
        }
    }

    pub fn min_word_len(mut self, len: usize) -> Self {
        self.min_word_len = len;
        self
    }

    /// Tag `text`, returning classified tokens anchored at byte offsets.
    ///
    /// Terms without an offset are located by searching forward from the
    /// end of the previous located term, so repeated words are never
    /// attributed to an earlier occurrence. Terms that cannot be anchored,
    /// or whose reported offset falls inside an earlier term, are skipped
    /// with a warning.
    pub fn tag(&self, text: &str) -> Result<Vec<TaggedToken>, TaggerError> {
        let terms = self.tagger.tag(text)?;
        let mut tokens = Vec::with_capacity(terms.len());
        let mut cursor = 0usize;

        for term in &terms {
            let Some(offset) = locate(text, term, cursor) else {
                warn!(term = %term.text, cursor, "skipping term that cannot be anchored in the text");
                continue;
            };
            if offset < cursor {
                warn!(term = %term.text, offset, cursor, "skipping term overlapping a previous one");
                continue;
            }
            cursor = cursor.max(offset + term.text.len());

            let (word, lead) = trim_to_word(&term.text);
            if word.is_empty() {
                trace!(term = %term.text, "dropping punctuation");
                continue;
            }
            if word_len(word) < self.min_word_len {
                trace!(term = %term.text, "dropping short word");
                continue;
            }

            let (class, tense) = self.policy.classify(term);
            tokens.push(TaggedToken {
                text: word.to_string(),
                offset: offset + lead,
                class,
                tense,
            });
        }

        debug!(terms = terms.len(), kept = tokens.len(), "tagged text");
        Ok(tokens)
    }
}

fn locate(text: &str, term: &RawTerm, cursor: usize) -> Option<usize> {
    if term.text.is_empty() {
        return None;
    }
    match term.offset {
        Some(offset) => {
            let end = offset.checked_add(term.text.len())?;
            (text.get(offset..end) == Some(term.text.as_str())).then_some(offset)
        }
        None => {
            let rest = text.get(cursor..)?;
            rest.find(term.text.as_str()).map(|pos| cursor + pos)
        }
    }
}
