//! WASM bindings for madlib-engine: drives one game session from a web page.
//!
//! Everything crossing the boundary is a JSON string.

use wasm_bindgen::prelude::*;

use madlib_engine::core::export::{file_stem, share_text};
use madlib_engine::core::pipeline::StoryEngine;
use madlib_engine::core::reconstruct::Segment;
use madlib_engine::core::session::{Mode, Session, SessionConfig};
use madlib_engine::core::source::InMemoryStories;
use madlib_engine::schema::blank::BlankId;
use madlib_engine::schema::token::PartOfSpeech;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct BlankInfo {
    id: String,
    number: usize,
    label: String,
    definition: String,
    original: String,
    word: Option<String>,
}

#[derive(serde::Serialize)]
struct StateInfo {
    mode: String,
    phase: String,
    title: Option<String>,
    notice: Option<String>,
    blanks: Vec<BlankInfo>,
    can_generate: bool,
    prompt: Option<String>,
}

#[derive(serde::Serialize)]
struct SegmentInfo {
    text: String,
    replaced: bool,
}

#[derive(serde::Serialize)]
struct CompletionInfo {
    title: String,
    text: String,
    segments: Vec<SegmentInfo>,
    file_name: String,
    share: Option<String>,
}

#[derive(serde::Serialize)]
struct CategoryInfo {
    name: &'static str,
    definition: &'static str,
}

fn parse_mode(s: &str) -> Result<Mode, JsError> {
    match s.to_lowercase().as_str() {
        "direct" | "direct_fill" => Ok(Mode::DirectFill),
        "template" => Ok(Mode::Template),
        "chat" | "conversation" => Ok(Mode::Conversation),
        other => Err(JsError::new(&format!("Unknown mode: {other}"))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// StoryGame: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StoryGame {
    session: Session,
    stories: InMemoryStories,
    seed: u64,
}

#[wasm_bindgen]
impl StoryGame {
    /// Create a game in the given mode ("direct", "template" or "chat").
    #[wasm_bindgen(constructor)]
    pub fn new(mode: &str, seed: u64) -> Result<StoryGame, JsError> {
        let mode = parse_mode(mode)?;
        let engine = StoryEngine::builder()
            .seed(seed)
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        let session = Session::new(
            engine,
            SessionConfig {
                mode,
                allow_partial_fill: false,
            },
        );
        Ok(StoryGame {
            session,
            stories: InMemoryStories::builtin(seed),
            seed,
        })
    }

    /// Replace the input with a random built-in story and return it.
    pub fn random_story(&mut self) -> Result<String, JsError> {
        self.session
            .load_story(&mut self.stories)
            .map(str::to_string)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Analyze text. In chat mode this also starts the conversation.
    /// Returns the state JSON.
    pub fn start(&mut self, text: &str) -> Result<String, JsError> {
        let result = if self.session.mode() == Mode::Conversation {
            self.session.start_conversation(text).map(|_| ())
        } else {
            self.session.analyze(text).map(|_| ())
        };
        result.map_err(|e| JsError::new(&e.to_string()))?;
        self.state()
    }

    pub fn fill(&mut self, blank_id: &str, word: &str) -> Result<String, JsError> {
        self.session
            .set_replacement(&BlankId::from(blank_id), word)
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.state()
    }

    /// Send one chat answer. Returns the bot messages it produced as a
    /// JSON array of strings.
    pub fn answer(&mut self, text: &str) -> Result<String, JsError> {
        let seen = self.session.transcript().len();
        self.session
            .answer(text)
            .map_err(|e| JsError::new(&e.to_string()))?;
        let replies: Vec<&str> = self
            .session
            .transcript()
            .iter()
            .skip(seen + 1)
            .map(|m| m.text.as_str())
            .collect();
        to_json(&replies)
    }

    /// Full chat transcript as JSON.
    pub fn transcript(&self) -> Result<String, JsError> {
        to_json(&self.session.transcript())
    }

    /// Finish direct-fill or template play. Returns the completion JSON.
    pub fn generate(&mut self) -> Result<String, JsError> {
        self.session
            .generate()
            .map_err(|e| JsError::new(&e.to_string()))?;
        self.completion()
    }

    /// The finished story as JSON, with replaced words marked.
    pub fn completion(&self) -> Result<String, JsError> {
        let Some(done) = self.session.completion() else {
            return Err(JsError::new("Story is not finished yet"));
        };
        let segments = match &done.highlighted {
            Some(highlighted) => self
                .session
                .emphasis()
                .segments(highlighted)
                .into_iter()
                .map(|s| match s {
                    Segment::Plain(text) => SegmentInfo {
                        text,
                        replaced: false,
                    },
                    Segment::Emphasized(text) => SegmentInfo {
                        text,
                        replaced: true,
                    },
                })
                .collect(),
            None => vec![SegmentInfo {
                text: done.text.clone(),
                replaced: false,
            }],
        };
        let info = CompletionInfo {
            title: done.title.clone(),
            text: done.text.clone(),
            segments,
            file_name: format!("{}.txt", file_stem(&done.title)),
            share: (done.mode != Mode::Template).then(|| share_text(&done.text)),
        };
        to_json(&info)
    }

    /// Printable word sheet, or an empty string before analysis.
    pub fn printable_sheet(&self) -> String {
        self.session
            .printable_sheet()
            .map(|s| s.render())
            .unwrap_or_default()
    }

    /// Current session state as JSON.
    pub fn state(&self) -> Result<String, JsError> {
        let blanks = self
            .session
            .selection()
            .map(|selection| {
                selection
                    .iter()
                    .map(|b| BlankInfo {
                        id: b.id.to_string(),
                        number: b.display_index,
                        label: b.label(),
                        definition: b.token.definition().to_string(),
                        original: b.token.text.clone(),
                        word: self.session.replacements().raw(&b.id).map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let info = StateInfo {
            mode: format!("{:?}", self.session.mode()),
            phase: format!("{:?}", self.session.phase()),
            title: self.session.title().map(str::to_string),
            notice: self.session.notice().map(str::to_string),
            blanks,
            can_generate: self.session.can_generate(),
            prompt: self.session.current_prompt().map(|b| b.label()),
        };
        to_json(&info)
    }

    /// Return JSON array of word categories with kid-friendly definitions.
    pub fn categories() -> String {
        let info: Vec<CategoryInfo> = PartOfSpeech::ALL
            .iter()
            .map(|p| CategoryInfo {
                name: p.name(),
                definition: p.definition(),
            })
            .collect();
        serde_json::to_string(&info).unwrap_or_else(|_| "[]".to_string())
    }

    /// Start over with the same text and mode.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Switch mode. Only allowed before a story is analyzed.
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsError> {
        let mode = parse_mode(mode)?;
        self.session
            .set_mode(mode)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
