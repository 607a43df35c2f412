//! Session integration tests: every mode from setup to a finished story.

use madlib_engine::core::pipeline::StoryEngine;
use madlib_engine::core::select::{SelectionConfig, SelectionPolicy};
use madlib_engine::core::session::{
    Mode, Phase, Sender, Session, SessionConfig, SessionError, NO_WORDS_MESSAGE,
};
use madlib_engine::core::source::{InMemoryStories, SourceError, StorySource};
use madlib_engine::core::tagger::{RawTerm, TaggerError};
use madlib_engine::schema::blank::BlankId;

const STORY: &str = "The quick fox jumps.";

fn engine() -> StoryEngine {
    StoryEngine::builder()
        .seed(11)
        .selection(SelectionConfig {
            max_blanks: 10,
            fraction: 1.0,
            policy: SelectionPolicy::EvenlySpaced,
        })
        .build()
        .unwrap()
}

fn session(mode: Mode) -> Session {
    Session::new(
        engine(),
        SessionConfig {
            mode,
            allow_partial_fill: false,
        },
    )
}

fn ids(session: &Session) -> Vec<BlankId> {
    session
        .selection()
        .unwrap()
        .iter()
        .map(|b| b.id.clone())
        .collect()
}

#[test]
fn direct_fill_in_any_order() {
    let mut s = session(Mode::DirectFill);
    s.analyze(STORY).unwrap();
    assert_eq!(s.phase(), Phase::Playing);
    assert!(!s.can_generate());

    let ids = ids(&s);
    s.set_replacement(&ids[2], "dances").unwrap();
    s.set_replacement(&ids[0], "lazy").unwrap();
    assert!(!s.can_generate());
    s.set_replacement(&ids[1], "elephant").unwrap();
    assert!(s.can_generate());

    let done = s.generate().unwrap();
    assert_eq!(done.text, "The lazy elephant dances.");
    assert_eq!(done.highlighted.as_deref(), Some("The **lazy** **elephant** **dances**."));
    assert_eq!(s.phase(), Phase::Completed);
}

#[test]
fn generate_rejects_missing_words() {
    let mut s = session(Mode::DirectFill);
    s.analyze(STORY).unwrap();
    let ids = ids(&s);
    s.set_replacement(&ids[0], "lazy").unwrap();
    s.set_replacement(&ids[1], "   ").unwrap();

    match s.generate() {
        Err(SessionError::IncompleteReplacementMap { missing }) => {
            assert_eq!(missing, vec![ids[1].clone(), ids[2].clone()]);
        }
        other => panic!("expected incomplete map, got {other:?}"),
    }
    assert_eq!(s.phase(), Phase::Playing);
}

#[test]
fn partial_fill_when_allowed() {
    let mut s = Session::new(
        engine(),
        SessionConfig {
            mode: Mode::DirectFill,
            allow_partial_fill: true,
        },
    );
    s.analyze(STORY).unwrap();
    s.set_replacement(&BlankId::from("noun-10"), "walrus").unwrap();
    assert!(s.can_generate());
    assert_eq!(s.generate().unwrap().text, "The quick walrus jumps.");
}

#[test]
fn unknown_blank_is_rejected() {
    let mut s = session(Mode::DirectFill);
    s.analyze(STORY).unwrap();
    let err = s.set_replacement(&BlankId::from("noun-99"), "x").unwrap_err();
    assert!(matches!(err, SessionError::UnknownBlank(_)));
}

#[test]
fn template_mode_needs_no_words() {
    let mut s = session(Mode::Template);
    s.analyze(STORY).unwrap();
    assert!(s.can_generate());
    let done = s.generate().unwrap();
    assert_eq!(done.text, "The _____1_____ _____2_____ _____3_____.");
    assert_eq!(done.highlighted, None);

    let sheet = s.printable_sheet().unwrap().render();
    assert!(sheet.contains("Words Needed:"));
    assert!(sheet.contains("2) noun ____________"));
}

#[test]
fn conversation_walks_blanks_in_order() {
    let mut s = session(Mode::Conversation);
    let opening = s.start_conversation(STORY).unwrap();
    assert_eq!(opening.len(), 2);
    assert!(opening[0].text.starts_with("Hi there!"));
    assert_eq!(opening[1].text, "I need an adjective. Can you give me one?");
    assert_eq!(s.phase(), Phase::Chatting);
    assert_eq!(s.current_blank_index(), 0);

    assert!(s.answer("lazy").unwrap().is_none());
    assert_eq!(
        s.transcript().last().unwrap().text,
        "Great choice! Now I need a noun. What would you like to use?"
    );
    assert!(s.answer("  elephant ").unwrap().is_none());
    assert_eq!(
        s.transcript().last().unwrap().text,
        "Great choice! Now I need a verb (present tense). What would you like to use?"
    );

    let done = s.answer("dances").unwrap().unwrap().clone();
    assert_eq!(done.text, "The lazy elephant dances.");
    assert_eq!(done.mode, Mode::Conversation);
    assert_eq!(s.phase(), Phase::Completed);
    assert_eq!(s.current_prompt(), None);

    let senders: Vec<Sender> = s.transcript().iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        vec![
            Sender::Bot,
            Sender::Bot,
            Sender::User,
            Sender::Bot,
            Sender::User,
            Sender::Bot,
            Sender::User,
            Sender::Bot,
            Sender::Bot,
        ]
    );
    assert!(s.transcript().last().unwrap().text.starts_with("Ta-da!"));
}

#[test]
fn empty_answer_does_not_advance() {
    let mut s = session(Mode::Conversation);
    s.start_conversation(STORY).unwrap();
    assert!(matches!(s.answer("   "), Err(SessionError::EmptyAnswer)));
    assert_eq!(s.current_blank_index(), 0);
    assert_eq!(s.transcript().len(), 2);
}

#[test]
fn conversation_with_nothing_to_replace_completes_at_once() {
    let mut s = session(Mode::Conversation);
    s.start_conversation("It is what it is.").unwrap();
    assert_eq!(s.phase(), Phase::Completed);
    assert_eq!(s.transcript().last().unwrap().text, NO_WORDS_MESSAGE);
    assert_eq!(s.output(), Some("It is what it is."));
}

#[test]
fn no_candidates_still_plays_with_a_notice() {
    let mut s = session(Mode::DirectFill);
    let selection = s.analyze("...").unwrap();
    assert!(selection.is_empty());
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(s.notice(), Some(NO_WORDS_MESSAGE));
    assert_eq!(s.generate().unwrap().text, "...");
}

#[test]
fn tagger_failure_stays_in_setup() {
    let tagger = |_: &str| -> Result<Vec<RawTerm>, TaggerError> {
        Err(TaggerError::Failed("model not loaded".to_string()))
    };
    let engine = StoryEngine::builder().tagger(tagger).build().unwrap();
    let mut s = Session::new(engine, SessionConfig::default());
    let err = s.analyze(STORY).unwrap_err();
    assert!(err.to_string().contains("could not analyze this text"));
    assert_eq!(s.phase(), Phase::Setup);
    assert!(s.analysis().is_none());
}

#[test]
fn reset_keeps_text_and_mode() {
    let mut s = session(Mode::Conversation);
    s.start_conversation(STORY).unwrap();
    s.answer("lazy").unwrap();
    s.reset();

    assert_eq!(s.phase(), Phase::Setup);
    assert_eq!(s.mode(), Mode::Conversation);
    assert_eq!(s.input(), STORY);
    assert!(s.transcript().is_empty());
    assert!(s.replacements().is_empty());
    assert!(s.completion().is_none());

    s.start_conversation(STORY).unwrap();
    assert_eq!(s.current_blank_index(), 0);
}

#[test]
fn direct_fill_session_stays_direct_fill() {
    let mut s = session(Mode::DirectFill);
    assert!(matches!(
        s.start_conversation(STORY),
        Err(SessionError::WrongMode { .. })
    ));
    s.reset();
    assert_eq!(s.mode(), Mode::DirectFill);
    s.analyze(STORY).unwrap();
    assert_eq!(s.phase(), Phase::Playing);
}

#[test]
fn actions_out_of_phase_are_rejected() {
    let mut s = session(Mode::DirectFill);
    assert!(matches!(s.answer("hi"), Err(SessionError::InvalidPhase { .. })));
    assert!(matches!(
        s.set_replacement(&BlankId::from("noun-10"), "x"),
        Err(SessionError::InvalidPhase { .. })
    ));

    s.analyze(STORY).unwrap();
    assert!(matches!(s.analyze(STORY), Err(SessionError::InvalidPhase { .. })));
    assert!(matches!(
        s.start_conversation(STORY),
        Err(SessionError::InvalidPhase { .. })
    ));
}

#[test]
fn random_story_becomes_input() {
    let mut s = session(Mode::DirectFill);
    let mut stories = InMemoryStories::builtin(4);
    let story = s.load_story(&mut stories).unwrap().to_string();
    assert_eq!(s.input(), story);
    assert!(s.analyze(&story).unwrap().len() >= 1);
}

struct Offline;

impl StorySource for Offline {
    fn next_story(&mut self) -> Result<String, SourceError> {
        Err(SourceError::Unavailable("no network".to_string()))
    }
}

#[test]
fn unavailable_source_leaves_input_alone() {
    let mut s = session(Mode::DirectFill);
    s.analyze(STORY).unwrap();
    s.reset();
    assert!(matches!(s.load_story(&mut Offline), Err(SessionError::Source(_))));
    assert_eq!(s.input(), STORY);
    assert_eq!(s.phase(), Phase::Setup);
}
