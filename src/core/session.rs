//! Session flow: which mode is active and what phase the game is in.
//!
//! ```text
//! Setup --analyze--> Playing --generate--> Completed
//! Setup --start_conversation--> Chatting --last answer--> Completed
//! any --reset--> Setup
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::export::PrintableSheet;
use crate::core::pipeline::{Analysis, PipelineError, StoryEngine};
use crate::core::reconstruct::Emphasis;
use crate::core::source::{SourceError, StorySource};
use crate::schema::blank::{Blank, BlankId, BlankSelection, ReplacementMap};

pub const NO_WORDS_MESSAGE: &str = "I couldn't find any words to replace. Try a different story!";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Analysis(#[from] PipelineError),
    #[error("could not load a story: {0}")]
    Source(#[from] SourceError),
    #[error("cannot {action} during {phase:?}")]
    InvalidPhase { action: &'static str, phase: Phase },
    #[error("cannot {action} in {mode:?} mode")]
    WrongMode { action: &'static str, mode: Mode },
    #[error("{} blank(s) still need a word", .missing.len())]
    IncompleteReplacementMap { missing: Vec<BlankId> },
    #[error("unknown blank: {0}")]
    UnknownBlank(BlankId),
    #[error("answer is empty")]
    EmptyAnswer,
}

/// How replacement words are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// All blanks shown at once, filled in any order.
    DirectFill,
    /// Printable fill-in template, no words collected.
    Template,
    /// One prompt per blank, in offset order.
    Conversation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Playing,
    Chatting,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

impl ChatMessage {
    fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }

    fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: Mode,
    /// Let direct-fill generate with empty entries, keeping those words.
    #[serde(default)]
    pub allow_partial_fill: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::DirectFill,
            allow_partial_fill: false,
        }
    }
}

/// The finished output of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub mode: Mode,
    pub title: String,
    /// Final story, or the numbered template in template mode.
    pub text: String,
    /// Story with replacements wrapped in the emphasis marker. Absent in
    /// template mode.
    pub highlighted: Option<String>,
}

/// One game, from entering text to the finished story.
pub struct Session {
    engine: StoryEngine,
    config: SessionConfig,
    phase: Phase,
    input: String,
    analysis: Option<Analysis>,
    replacements: ReplacementMap,
    current_blank: usize,
    transcript: Vec<ChatMessage>,
    notice: Option<&'static str>,
    completion: Option<Completion>,
}

impl Session {
    pub fn new(engine: StoryEngine, config: SessionConfig) -> Self {
        Self {
            engine,
            config,
            phase: Phase::Setup,
            input: String::new(),
            analysis: None,
            replacements: ReplacementMap::new(),
            current_blank: 0,
            transcript: Vec::new(),
            notice: None,
            completion: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Switch mode. Only allowed during setup.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), SessionError> {
        self.require_phase(Phase::Setup, "change mode")?;
        self.config.mode = mode;
        Ok(())
    }

    /// Emphasis marker used for highlighted stories.
    pub fn emphasis(&self) -> &Emphasis {
        self.engine.emphasis()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn selection(&self) -> Option<&BlankSelection> {
        self.analysis.as_ref().map(|a| &a.selection)
    }

    pub fn title(&self) -> Option<&str> {
        self.analysis.as_ref().map(|a| a.title.as_str())
    }

    pub fn replacements(&self) -> &ReplacementMap {
        &self.replacements
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Informational message, set when the text had nothing to replace.
    pub fn notice(&self) -> Option<&str> {
        self.notice
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Final story or template text once completed.
    pub fn output(&self) -> Option<&str> {
        self.completion.as_ref().map(|c| c.text.as_str())
    }

    /// Replace the input with a story from `source`. Only during setup.
    pub fn load_story(&mut self, source: &mut dyn StorySource) -> Result<&str, SessionError> {
        self.require_phase(Phase::Setup, "load a story")?;
        self.input = source.next_story()?;
        Ok(&self.input)
    }

    /// Analyze `text` for direct-fill or template play.
    ///
    /// On tagger failure the session stays in setup. An empty selection is
    /// not an error: the session still moves to playing and [`notice`]
    /// explains that nothing could be replaced.
    ///
    /// [`notice`]: Session::notice
    pub fn analyze(&mut self, text: &str) -> Result<&BlankSelection, SessionError> {
        self.require_phase(Phase::Setup, "analyze")?;
        if self.config.mode == Mode::Conversation {
            return Err(SessionError::WrongMode {
                action: "analyze",
                mode: self.config.mode,
            });
        }

        let analysis = self.run_analysis(text)?;
        self.phase = Phase::Playing;
        info!(blanks = analysis.selection.len(), mode = ?self.config.mode, "session playing");
        Ok(&self.analysis.insert(analysis).selection)
    }

    /// Set the word for one blank. Entries may arrive in any order and can
    /// be overwritten until the story is generated.
    pub fn set_replacement(&mut self, id: &BlankId, value: &str) -> Result<(), SessionError> {
        self.require_phase(Phase::Playing, "fill a blank")?;
        let known = self.selection().is_some_and(|s| s.contains(id));
        if !known {
            return Err(SessionError::UnknownBlank(id.clone()));
        }
        self.replacements.insert(id.clone(), value);
        Ok(())
    }

    /// Blanks still lacking a non-empty word.
    pub fn missing(&self) -> Vec<&BlankId> {
        match self.selection() {
            Some(selection) => self.replacements.missing(selection),
            None => Vec::new(),
        }
    }

    /// Whether [`generate`](Session::generate) would succeed now.
    pub fn can_generate(&self) -> bool {
        self.phase == Phase::Playing
            && (self.config.mode == Mode::Template
                || self.config.allow_partial_fill
                || self.missing().is_empty())
    }

    /// Produce the final story (direct-fill) or template.
    pub fn generate(&mut self) -> Result<&Completion, SessionError> {
        self.require_phase(Phase::Playing, "generate")?;
        if self.config.mode == Mode::DirectFill && !self.config.allow_partial_fill {
            let missing: Vec<BlankId> = self.missing().into_iter().cloned().collect();
            if !missing.is_empty() {
                return Err(SessionError::IncompleteReplacementMap { missing });
            }
        }
        Ok(self.complete())
    }

    /// Analyze `text` and start collecting words one prompt at a time.
    pub fn start_conversation(&mut self, text: &str) -> Result<&[ChatMessage], SessionError> {
        self.require_phase(Phase::Setup, "start a conversation")?;
        if self.config.mode != Mode::Conversation {
            return Err(SessionError::WrongMode {
                action: "start a conversation",
                mode: self.config.mode,
            });
        }
        let analysis = self.run_analysis(text)?;
        self.current_blank = 0;
        self.transcript.push(ChatMessage::bot(
            "Hi there! I've analyzed your story and found some words we can replace to make it \
             silly! Let's start creating your funny story together!",
        ));
        let first = analysis
            .selection
            .at(0)
            .map(|blank| format!("I need {}. Can you give me one?", describe(blank)));
        self.analysis = Some(analysis);
        self.phase = Phase::Chatting;

        match first {
            Some(prompt) => self.transcript.push(ChatMessage::bot(prompt)),
            None => {
                self.transcript.push(ChatMessage::bot(NO_WORDS_MESSAGE));
                self.complete();
            }
        }
        Ok(&self.transcript)
    }

    /// The blank the conversation is currently asking for.
    pub fn current_prompt(&self) -> Option<&Blank> {
        if self.phase != Phase::Chatting {
            return None;
        }
        self.selection().and_then(|s| s.at(self.current_blank))
    }

    /// 0-based position of the blank being asked for.
    pub fn current_blank_index(&self) -> usize {
        self.current_blank
    }

    /// Accept an answer for the current blank. Completes the session after
    /// the last blank.
    pub fn answer(&mut self, text: &str) -> Result<Option<&Completion>, SessionError> {
        self.require_phase(Phase::Chatting, "answer")?;
        let word = text.trim();
        if word.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        let Some(id) = self.current_prompt().map(|b| b.id.clone()) else {
            return Err(SessionError::InvalidPhase {
                action: "answer",
                phase: self.phase,
            });
        };

        self.transcript.push(ChatMessage::user(text));
        self.replacements.insert(id, word);
        self.current_blank += 1;
        debug!(answered = self.current_blank, "accepted answer");

        let next = self.current_prompt().map(describe);
        match next {
            Some(description) => {
                self.transcript.push(ChatMessage::bot(format!(
                    "Great choice! Now I need {description}. What would you like to use?"
                )));
                Ok(None)
            }
            None => {
                self.transcript.push(ChatMessage::bot(
                    "Perfect! I have all the words I need. Let me create your silly story!",
                ));
                self.transcript.push(ChatMessage::bot(
                    "Ta-da! Here's your silly story! You can download it or share it with \
                     friends. Want to create another one?",
                ));
                Ok(Some(self.complete()))
            }
        }
    }

    /// Printable sheet for the current analysis, in any phase after setup.
    pub fn printable_sheet(&self) -> Option<PrintableSheet> {
        self.analysis
            .as_ref()
            .map(|a| PrintableSheet::new(&a.title, &a.text, &a.selection))
    }

    /// Back to setup. Keeps the input text and mode.
    pub fn reset(&mut self) {
        self.phase = Phase::Setup;
        self.analysis = None;
        self.replacements.clear();
        self.current_blank = 0;
        self.transcript.clear();
        self.notice = None;
        self.completion = None;
        debug!("session reset");
    }

    fn run_analysis(&mut self, text: &str) -> Result<Analysis, SessionError> {
        self.input = text.to_string();
        let analysis = self.engine.analyze(text)?;
        self.replacements.clear();
        self.notice = if analysis.has_blanks() {
            None
        } else {
            Some(NO_WORDS_MESSAGE)
        };
        Ok(analysis)
    }

    fn complete(&mut self) -> &Completion {
        let mode = self.config.mode;
        let completion = match &self.analysis {
            Some(analysis) => match mode {
                Mode::Template => Completion {
                    mode,
                    title: analysis.title.clone(),
                    text: analysis.template(),
                    highlighted: None,
                },
                Mode::DirectFill | Mode::Conversation => Completion {
                    mode,
                    title: analysis.title.clone(),
                    text: analysis.story(&self.replacements),
                    highlighted: Some(
                        analysis.highlighted(&self.replacements, self.engine.emphasis()),
                    ),
                },
            },
            None => Completion {
                mode,
                title: String::new(),
                text: self.input.clone(),
                highlighted: None,
            },
        };
        self.phase = Phase::Completed;
        info!(mode = ?mode, chars = completion.text.len(), "session completed");
        self.completion.insert(completion)
    }

    fn require_phase(&self, phase: Phase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(SessionError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }
}

/// "a noun", "an adjective", "a verb (past tense)".
fn describe(blank: &Blank) -> String {
    format!("{} {}", blank.part_of_speech().article(), blank.label())
}
