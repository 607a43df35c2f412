//! Blanks chosen for replacement and the user's replacement words.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::token::{PartOfSpeech, Token};

/// Stable identifier of a blank: `{category}-{offset}`.
///
/// Derived from the token rather than its position in any list, so it
/// survives re-sorting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankId(pub String);

impl BlankId {
    pub fn for_token(token: &Token) -> Self {
        Self(format!("{}-{}", token.part_of_speech.name(), token.offset))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlankId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A selected token plus its identity and human-facing number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blank {
    pub id: BlankId,
    /// 1-based number used for template placeholders and prompts only.
    pub display_index: usize,
    pub token: Token,
}

impl Blank {
    pub fn new(token: Token) -> Self {
        Self {
            id: BlankId::for_token(&token),
            display_index: 0,
            token,
        }
    }

    pub fn offset(&self) -> usize {
        self.token.offset
    }

    pub fn part_of_speech(&self) -> PartOfSpeech {
        self.token.part_of_speech
    }

    pub fn label(&self) -> String {
        self.token.label()
    }
}

/// The blanks of one analysis, always kept in ascending offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankSelection {
    blanks: Vec<Blank>,
}

impl BlankSelection {
    /// Build a selection from chosen tokens, establishing offset order and
    /// assigning display indices 1..=N.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self::from_blanks(tokens.into_iter().map(Blank::new).collect())
    }

    /// Re-sort arbitrary blanks and renumber them.
    pub fn from_blanks(mut blanks: Vec<Blank>) -> Self {
        blanks.sort_by_key(|b| b.token.offset);
        for (i, blank) in blanks.iter_mut().enumerate() {
            blank.display_index = i + 1;
        }
        Self { blanks }
    }

    pub fn blanks(&self) -> &[Blank] {
        &self.blanks
    }

    pub fn len(&self) -> usize {
        self.blanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blanks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Blank> {
        self.blanks.iter()
    }

    pub fn get(&self, id: &BlankId) -> Option<&Blank> {
        self.blanks.iter().find(|b| &b.id == id)
    }

    /// Blank at a 0-based position in offset order.
    pub fn at(&self, index: usize) -> Option<&Blank> {
        self.blanks.get(index)
    }

    pub fn contains(&self, id: &BlankId) -> bool {
        self.get(id).is_some()
    }
}

impl<'a> IntoIterator for &'a BlankSelection {
    type Item = &'a Blank;
    type IntoIter = std::slice::Iter<'a, Blank>;

    fn into_iter(self) -> Self::IntoIter {
        self.blanks.iter()
    }
}

/// User-supplied replacement words keyed by blank id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementMap {
    entries: FxHashMap<BlankId, String>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite the replacement for `id`. Entries may arrive in
    /// any order.
    pub fn insert(&mut self, id: BlankId, value: impl Into<String>) {
        self.entries.insert(id, value.into());
    }

    pub fn remove(&mut self, id: &BlankId) -> Option<String> {
        self.entries.remove(id)
    }

    /// Raw stored value, including empty strings.
    pub fn raw(&self, id: &BlankId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Trimmed replacement, or `None` when missing or whitespace-only.
    pub fn filled(&self, id: &BlankId) -> Option<&str> {
        self.raw(id).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_filled(&self, id: &BlankId) -> bool {
        self.filled(id).is_some()
    }

    /// Ids from `selection` that still lack a usable replacement, in offset order.
    pub fn missing<'a>(&self, selection: &'a BlankSelection) -> Vec<&'a BlankId> {
        selection
            .iter()
            .filter(|b| !self.is_filled(&b.id))
            .map(|b| &b.id)
            .collect()
    }

    pub fn is_complete_for(&self, selection: &BlankSelection) -> bool {
        selection.iter().all(|b| self.is_filled(&b.id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<BlankId>, V: Into<String>> FromIterator<(K, V)> for ReplacementMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k.into(), v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::token::Tense;

    fn token(text: &str, offset: usize, pos: PartOfSpeech) -> Token {
        Token {
            text: text.to_string(),
            offset,
            part_of_speech: pos,
            tense: None,
        }
    }

    #[test]
    fn blank_id_is_category_and_offset() {
        let mut t = token("jumps", 14, PartOfSpeech::Verb);
        t.tense = Some(Tense::Present);
        assert_eq!(BlankId::for_token(&t).as_str(), "verb-14");
    }

    #[test]
    fn selection_sorts_and_numbers_by_offset() {
        let sel = BlankSelection::from_tokens(vec![
            token("jumps", 14, PartOfSpeech::Verb),
            token("quick", 4, PartOfSpeech::Adjective),
            token("fox", 10, PartOfSpeech::Noun),
        ]);
        let order: Vec<(&str, usize)> = sel
            .iter()
            .map(|b| (b.token.text.as_str(), b.display_index))
            .collect();
        assert_eq!(order, vec![("quick", 1), ("fox", 2), ("jumps", 3)]);
        assert_eq!(sel.get(&BlankId::from("noun-10")).map(|b| b.display_index), Some(2));
    }

    #[test]
    fn renumbering_keeps_ids() {
        let sel = BlankSelection::from_tokens(vec![
            token("fox", 10, PartOfSpeech::Noun),
            token("quick", 4, PartOfSpeech::Adjective),
        ]);
        let mut blanks = sel.blanks().to_vec();
        blanks.reverse();
        let resorted = BlankSelection::from_blanks(blanks);
        assert_eq!(resorted, sel);
    }

    #[test]
    fn whitespace_replacements_count_as_missing() {
        let sel = BlankSelection::from_tokens(vec![
            token("quick", 4, PartOfSpeech::Adjective),
            token("fox", 10, PartOfSpeech::Noun),
        ]);
        let mut map = ReplacementMap::new();
        map.insert(BlankId::from("adjective-4"), "  lazy ");
        map.insert(BlankId::from("noun-10"), "   ");

        assert_eq!(map.filled(&BlankId::from("adjective-4")), Some("lazy"));
        assert_eq!(map.filled(&BlankId::from("noun-10")), None);
        assert_eq!(map.missing(&sel), vec![&BlankId::from("noun-10")]);
        assert!(!map.is_complete_for(&sel));

        map.insert(BlankId::from("noun-10"), "elephant");
        assert!(map.is_complete_for(&sel));
    }

    #[test]
    fn collect_from_pairs() {
        let map: ReplacementMap = [("noun-4", "dog"), ("noun-21", "mouse")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.raw(&BlankId::from("noun-21")), Some("mouse"));
    }
}
