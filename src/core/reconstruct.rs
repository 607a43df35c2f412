//! Offset-driven story reconstruction.
//!
//! Output is built in a single forward pass over the original text,
//! appending untouched spans between blanks. Nothing is ever searched for
//! or replaced in place, so repeated words and length-changing
//! substitutions cannot shift later offsets.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schema::blank::{Blank, BlankSelection, ReplacementMap};

/// Which of the three output shapes to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Replacements substituted verbatim.
    Story,
    /// Replacements wrapped in the emphasis marker.
    Highlighted,
    /// Numbered placeholders in place of every blank.
    Template,
}

/// Rebuild `original` with `fill` deciding what goes in place of each
/// blank. `None` keeps the blank's original text.
///
/// Blanks are re-sorted by offset first. A blank that starts before the
/// end of the previous one, or that no longer matches the text at its
/// offset, is skipped with a warning.
pub fn reconstruct<F>(original: &str, blanks: &[Blank], mut fill: F) -> String
where
    F: FnMut(&Blank) -> Option<String>,
{
    let mut ordered: Vec<&Blank> = blanks.iter().collect();
    ordered.sort_by_key(|b| b.offset());

    let mut out = String::with_capacity(original.len());
    let mut cursor = 0usize;

    for blank in ordered {
        let token = &blank.token;
        if token.offset < cursor {
            warn!(id = %blank.id, offset = token.offset, cursor, "skipping blank overlapping a previous one");
            continue;
        }
        if !token.is_anchored_in(original) {
            warn!(id = %blank.id, offset = token.offset, "skipping blank that does not match the text");
            continue;
        }
        out.push_str(&original[cursor..token.offset]);
        match fill(blank) {
            Some(text) => out.push_str(&text),
            None => out.push_str(&token.text),
        }
        cursor = token.end();
    }

    out.push_str(&original[cursor..]);
    out
}

/// Final story: trimmed replacements, original words where none was given.
pub fn story(original: &str, selection: &BlankSelection, replacements: &ReplacementMap) -> String {
    reconstruct(original, selection.blanks(), |blank| {
        replacements.filled(&blank.id).map(str::to_string)
    })
}

/// Story with each replacement wrapped in `emphasis`.
pub fn highlighted(
    original: &str,
    selection: &BlankSelection,
    replacements: &ReplacementMap,
    emphasis: &Emphasis,
) -> String {
    reconstruct(original, selection.blanks(), |blank| {
        replacements.filled(&blank.id).map(|word| emphasis.wrap(word))
    })
}

/// Fill-in template: every blank becomes its numbered placeholder,
/// whatever the replacement map holds.
pub fn template(original: &str, selection: &BlankSelection) -> String {
    reconstruct(original, selection.blanks(), |blank| {
        Some(placeholder_for(blank.display_index))
    })
}

/// Dispatch on [`RenderMode`].
pub fn render(
    mode: RenderMode,
    original: &str,
    selection: &BlankSelection,
    replacements: &ReplacementMap,
    emphasis: &Emphasis,
) -> String {
    match mode {
        RenderMode::Story => story(original, selection, replacements),
        RenderMode::Highlighted => highlighted(original, selection, replacements, emphasis),
        RenderMode::Template => template(original, selection),
    }
}

/// Numbered blank marker, e.g. `_____3_____`.
pub fn placeholder_for(display_index: usize) -> String {
    format!("_____{display_index}_____")
}

/// Inline emphasis delimiters placed around replacements in highlighted
/// stories. The renderer turns them into its own styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emphasis {
    pub open: String,
    pub close: String,
}

impl Default for Emphasis {
    fn default() -> Self {
        Self {
            open: "**".to_string(),
            close: "**".to_string(),
        }
    }
}

/// A run of highlighted-story text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    Plain(String),
    Emphasized(String),
}

impl Emphasis {
    pub fn wrap(&self, text: &str) -> String {
        format!("{}{}{}", self.open, text, self.close)
    }

    /// Split a highlighted story back into plain and emphasized runs.
    /// An unterminated opener is treated as plain text.
    pub fn segments(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        if self.open.is_empty() || self.close.is_empty() {
            if !text.is_empty() {
                segments.push(Segment::Plain(text.to_string()));
            }
            return segments;
        }

        let mut plain = String::new();
        let mut rest = text;
        while let Some(start) = rest.find(self.open.as_str()) {
            let after_open = &rest[start + self.open.len()..];
            let Some(end) = after_open.find(self.close.as_str()) else {
                break;
            };
            plain.push_str(&rest[..start]);
            if !plain.is_empty() {
                segments.push(Segment::Plain(std::mem::take(&mut plain)));
            }
            segments.push(Segment::Emphasized(after_open[..end].to_string()));
            rest = &after_open[end + self.close.len()..];
        }
        plain.push_str(rest);
        if !plain.is_empty() {
            segments.push(Segment::Plain(plain));
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::blank::BlankId;
    use crate::schema::token::{PartOfSpeech, Token};

    fn token(text: &str, offset: usize, pos: PartOfSpeech) -> Token {
        Token {
            text: text.to_string(),
            offset,
            part_of_speech: pos,
            tense: None,
        }
    }

    fn fox_selection() -> BlankSelection {
        BlankSelection::from_tokens(vec![
            token("quick", 4, PartOfSpeech::Adjective),
            token("fox", 10, PartOfSpeech::Noun),
            token("jumps", 14, PartOfSpeech::Verb),
        ])
    }

    fn fox_replacements() -> ReplacementMap {
        [
            ("adjective-4", "lazy"),
            ("noun-10", "elephant"),
            ("verb-14", "dances"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn story_with_full_fill() {
        let out = story("The quick fox jumps.", &fox_selection(), &fox_replacements());
        assert_eq!(out, "The lazy elephant dances.");
    }

    #[test]
    fn template_ignores_replacements() {
        let expected = "The _____1_____ _____2_____ _____3_____.";
        assert_eq!(template("The quick fox jumps.", &fox_selection()), expected);
        assert_eq!(
            render(
                RenderMode::Template,
                "The quick fox jumps.",
                &fox_selection(),
                &fox_replacements(),
                &Emphasis::default()
            ),
            expected
        );
    }

    #[test]
    fn duplicate_words_replaced_by_position() {
        let text = "The cat chased the cat.";
        let sel = BlankSelection::from_tokens(vec![
            token("cat", 4, PartOfSpeech::Noun),
            token("cat", 19, PartOfSpeech::Noun),
        ]);
        let map: ReplacementMap = [("noun-4", "dog"), ("noun-19", "mouse")].into_iter().collect();
        assert_eq!(story(text, &sel, &map), "The dog chased the mouse.");

        let only_second: ReplacementMap = [("noun-19", "mouse")].into_iter().collect();
        assert_eq!(story(text, &sel, &only_second), "The cat chased the mouse.");
    }

    #[test]
    fn partial_and_blank_entries_keep_original_words() {
        let mut map = ReplacementMap::new();
        map.insert(BlankId::from("noun-10"), "  walrus  ");
        map.insert(BlankId::from("verb-14"), "   ");
        let out = story("The quick fox jumps.", &fox_selection(), &map);
        assert_eq!(out, "The quick walrus jumps.");
    }

    #[test]
    fn highlighted_wraps_only_replacements() {
        let mut map = ReplacementMap::new();
        map.insert(BlankId::from("noun-10"), " walrus ");
        let emphasis = Emphasis::default();
        let out = highlighted("The quick fox jumps.", &fox_selection(), &map, &emphasis);
        assert_eq!(out, "The quick **walrus** jumps.");
        assert_eq!(
            emphasis.segments(&out),
            vec![
                Segment::Plain("The quick ".to_string()),
                Segment::Emphasized("walrus".to_string()),
                Segment::Plain(" jumps.".to_string()),
            ]
        );
    }

    #[test]
    fn overlapping_blank_is_skipped() {
        let text = "ice-cream melts";
        let blanks = vec![
            Blank::new(token("ice-cream", 0, PartOfSpeech::Noun)),
            Blank::new(token("cream", 4, PartOfSpeech::Noun)),
        ];
        let out = reconstruct(text, &blanks, |b| Some(format!("<{}>", b.token.text.len())));
        assert_eq!(out, "<9> melts");
    }

    #[test]
    fn unanchored_blank_is_skipped() {
        let blanks = vec![
            Blank::new(token("fox", 10, PartOfSpeech::Noun)),
            Blank::new(token("cat", 99, PartOfSpeech::Noun)),
        ];
        let out = reconstruct("The quick fox jumps.", &blanks, |_| Some("owl".to_string()));
        assert_eq!(out, "The quick owl jumps.");
    }

    #[test]
    fn arrival_order_does_not_matter() {
        let mut blanks = fox_selection().blanks().to_vec();
        blanks.reverse();
        let out = reconstruct("The quick fox jumps.", &blanks, |b| Some(b.display_index.to_string()));
        assert_eq!(out, "The 1 2 3.");
    }

    #[test]
    fn no_blanks_is_identity() {
        let sel = BlankSelection::default();
        let map = ReplacementMap::new();
        assert_eq!(story("", &sel, &map), "");
        assert_eq!(template("?!...", &sel), "?!...");
    }

    #[test]
    fn segments_handle_unterminated_marker() {
        let emphasis = Emphasis::default();
        assert_eq!(
            emphasis.segments("a **b** c **d"),
            vec![
                Segment::Plain("a ".to_string()),
                Segment::Emphasized("b".to_string()),
                Segment::Plain(" c **d".to_string()),
            ]
        );
        assert!(emphasis.segments("").is_empty());
    }

    #[test]
    fn custom_markers() {
        let emphasis = Emphasis {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        };
        assert_eq!(emphasis.wrap("owl"), "<mark>owl</mark>");
        assert_eq!(
            emphasis.segments("<mark>owl</mark>!"),
            vec![Segment::Emphasized("owl".to_string()), Segment::Plain("!".to_string())]
        );
    }
}
