pub mod export;
pub mod extract;
pub mod lexicon;
pub mod pipeline;
pub mod reconstruct;
pub mod select;
pub mod session;
pub mod source;
pub mod tagger;
pub mod title;
