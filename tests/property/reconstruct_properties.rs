use madlib_engine::core::pipeline::StoryEngine;
use madlib_engine::core::reconstruct::{reconstruct, story, template};
use madlib_engine::core::select::{select, SelectionConfig, SelectionPolicy};
use madlib_engine::schema::blank::{Blank, BlankSelection, ReplacementMap};
use madlib_engine::schema::token::{CandidateSet, PartOfSpeech, Tense, Token};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;

const WORDS: &[&str] = &[
    "the", "a", "quick", "lazy", "brown", "fox", "dog", "jumps", "ran", "slowly", "happily",
    "castle", "dragon", "brave", "knight", "fought", "over", "under", "and", "café", "naïve",
    "sparkling", "wandered", "ocean", "it's", "well-known", "42", "moonlight",
];

const PUNCT: &[&str] = &[" ", " ", " ", ", ", ". ", "! ", " - ", "? ", "\n"];

fn all_candidates() -> SelectionConfig {
    SelectionConfig {
        max_blanks: 1000,
        fraction: 1.0,
        policy: SelectionPolicy::EvenlySpaced,
    }
}

/// Sentence-like text built from a small vocabulary.
fn story_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (prop::sample::select(WORDS), prop::sample::select(PUNCT)),
        0..60,
    )
    .prop_map(|parts| {
        let mut text = String::new();
        for (word, sep) in parts {
            text.push_str(word);
            text.push_str(sep);
        }
        text
    })
}

fn token(text: &str, offset: usize, pos: PartOfSpeech) -> Token {
    Token {
        text: text.to_string(),
        offset,
        part_of_speech: pos,
        tense: (pos == PartOfSpeech::Verb).then_some(Tense::Present),
    }
}

proptest! {
    #[test]
    fn candidates_are_anchored_in_arbitrary_text(text in "\\PC{0,300}") {
        let mut engine = StoryEngine::builder().seed(1).selection(all_candidates()).build().unwrap();
        let analysis = engine.analyze(&text).unwrap();
        for token in &analysis.candidates {
            prop_assert!(token.is_anchored_in(&text), "{:?} not in {:?}", token, text);
        }
    }

    #[test]
    fn candidates_are_anchored_in_stories(text in story_text(), seed in any::<u64>()) {
        let mut engine = StoryEngine::builder().seed(seed).build().unwrap();
        let analysis = engine.analyze(&text).unwrap();
        for blank in &analysis.selection {
            prop_assert!(blank.token.is_anchored_in(&text));
        }
    }

    #[test]
    fn story_length_accounts_for_each_filled_blank(
        text in story_text(),
        words in prop::collection::vec(prop::option::of("[a-z]{1,10}"), 0..80),
    ) {
        let mut engine = StoryEngine::builder().seed(3).selection(all_candidates()).build().unwrap();
        let analysis = engine.analyze(&text).unwrap();

        let mut replacements = ReplacementMap::new();
        let mut expected = text.len() as isize;
        for (blank, word) in analysis.selection.iter().zip(&words) {
            if let Some(word) = word {
                replacements.insert(blank.id.clone(), word.as_str());
                expected += word.len() as isize - blank.token.text.len() as isize;
            }
        }

        let rendered = story(&text, &analysis.selection, &replacements);
        prop_assert_eq!(rendered.len() as isize, expected);
    }

    #[test]
    fn selected_blanks_never_overlap(text in story_text(), seed in any::<u64>()) {
        let mut engine = StoryEngine::builder().seed(seed).build().unwrap();
        let analysis = engine.analyze(&text).unwrap();
        let blanks = analysis.selection.blanks();
        for pair in blanks.windows(2) {
            prop_assert!(pair[0].token.end() <= pair[1].offset());
        }
        let numbers: Vec<usize> = blanks.iter().map(|b| b.display_index).collect();
        let expected: Vec<usize> = (1..=blanks.len()).collect();
        prop_assert_eq!(numbers, expected);
    }

    #[test]
    fn template_is_repeatable_for_a_fixed_seed(text in story_text(), seed in any::<u64>()) {
        let first = StoryEngine::builder().seed(seed).build().unwrap().analyze(&text).unwrap();
        let second = StoryEngine::builder().seed(seed).build().unwrap().analyze(&text).unwrap();
        prop_assert_eq!(first.template(), second.template());
        prop_assert_eq!(
            template(&text, &first.selection),
            template(&text, &second.selection)
        );
    }

    #[test]
    fn round_robin_covers_two_categories(
        nouns in 2usize..6,
        verbs in 2usize..6,
        adjectives in 2usize..6,
        target in 3usize..10,
        seed in any::<u64>(),
    ) {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for (count, pos) in [
            (nouns, PartOfSpeech::Noun),
            (verbs, PartOfSpeech::Verb),
            (adjectives, PartOfSpeech::Adjective),
        ] {
            for _ in 0..count {
                tokens.push(token("word", offset, pos));
                offset += 5;
            }
        }
        let candidates = CandidateSet::new(tokens);
        let config = SelectionConfig {
            max_blanks: target,
            fraction: 1.0,
            policy: SelectionPolicy::RoundRobinByCategory,
        };
        let selection = select(&candidates, &config, &mut StdRng::seed_from_u64(seed));

        prop_assert_eq!(selection.len(), target.min(candidates.len()));
        let categories: FxHashSet<PartOfSpeech> =
            selection.iter().map(|b| b.part_of_speech()).collect();
        prop_assert!(categories.len() >= 2);
    }

    #[test]
    fn overlapping_blanks_are_skipped_not_fatal(
        spans in prop::collection::vec((0usize..40, 1usize..8), 0..12),
    ) {
        let text = "abcdefghij klmnopqrst uvwxyzabcd efghijklmn";
        let blanks: Vec<Blank> = spans
            .iter()
            .filter_map(|&(start, len)| {
                let end = (start + len).min(text.len());
                text.get(start..end).map(|s| Blank::new(token(s, start, PartOfSpeech::Noun)))
            })
            .collect();
        let selection = BlankSelection::from_blanks(blanks);

        let untouched = reconstruct(text, selection.blanks(), |_| None);
        prop_assert_eq!(untouched, text);

        let marked = reconstruct(text, selection.blanks(), |_| Some("#".to_string()));
        prop_assert!(marked.len() <= text.len());
    }
}
