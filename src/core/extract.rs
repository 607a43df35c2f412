//! Candidate extraction: keeps the tagged tokens that can become blanks.

use tracing::debug;

use crate::schema::token::{CandidateSet, PartOfSpeech, TaggedToken, Tense, Token};

/// Which word classes survive extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub include_adverbs: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_adverbs: true,
        }
    }
}

/// Filter tagged tokens down to nouns, verbs, adjectives and (optionally)
/// adverbs. Verbs without a tense become present tense; tense is dropped
/// from every other category. The result is offset-ordered with exact
/// `(offset, text)` duplicates collapsed.
pub fn extract(tagged: Vec<TaggedToken>, options: ExtractOptions) -> CandidateSet {
    let total = tagged.len();
    let tokens: Vec<Token> = tagged
        .into_iter()
        .filter_map(|t| {
            let pos = t.class.part_of_speech()?;
            if pos == PartOfSpeech::Adverb && !options.include_adverbs {
                return None;
            }
            let tense = match pos {
                PartOfSpeech::Verb => Some(t.tense.unwrap_or(Tense::Present)),
                _ => None,
            };
            Some(Token {
                text: t.text,
                offset: t.offset,
                part_of_speech: pos,
                tense,
            })
        })
        .collect();

    let candidates = CandidateSet::new(tokens);
    debug!(tagged = total, candidates = candidates.len(), "extracted candidates");
    candidates
}
