//! Hand-off to export and share collaborators: a finished string plus a
//! title. Rasterization and share-sheet mechanics live outside the crate.

use crate::core::reconstruct;
use crate::schema::blank::BlankSelection;

/// Plain-text fill-in sheet: the words to collect followed by the
/// numbered template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintableSheet {
    pub title: String,
    pub words_needed: Vec<String>,
    pub template: String,
}

impl PrintableSheet {
    pub fn new(title: &str, original: &str, selection: &BlankSelection) -> Self {
        Self {
            title: title.to_string(),
            words_needed: word_list(selection),
            template: reconstruct::template(original, selection),
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("{}\n\nWords Needed:\n", self.title);
        for line in &self.words_needed {
            out.push_str(line);
            out.push_str(" ____________\n");
        }
        out.push_str("\nYour Story:\n");
        out.push_str(&self.template);
        out.push('\n');
        out
    }
}

/// `N) label` for every blank, in display order.
pub fn word_list(selection: &BlankSelection) -> Vec<String> {
    selection
        .iter()
        .map(|b| format!("{}) {}", b.display_index, b.label()))
        .collect()
}

/// Text handed to a share sheet or clipboard.
pub fn share_text(story: &str) -> String {
    format!("Check out my silly story: \"{story}\"")
}

/// File name stem for an exported story: lower-case, whitespace runs
/// joined with `-`.
pub fn file_stem(title: &str) -> String {
    let stem = title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if stem.is_empty() {
        "silly-word-story".to_string()
    } else {
        stem
    }
}
