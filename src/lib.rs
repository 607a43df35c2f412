//! Madlib Engine: turns a story into a word-substitution game.
//!
//! Text is tagged with exact byte offsets, a subset of nouns, verbs,
//! adjectives and adverbs is chosen as blanks, and the story is rebuilt
//! around the player's words as a final story, a highlighted story or a
//! numbered fill-in template.

pub mod core;
pub mod schema;
