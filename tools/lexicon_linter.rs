//! Lexicon Linter: checks a lexicon file for tags the engine will ignore
//! and rules that can never fire.
//!
//! Usage: lexicon_linter <lexicon.ron | dir> [--with-builtin]

use madlib_engine::core::lexicon::Lexicon;
use madlib_engine::core::tagger::{CompromiseTagPolicy, RawTerm, TagPolicy};
use madlib_engine::schema::token::WordClass;
use std::collections::HashSet;
use std::path::Path;
use std::process;

/// Tags the default tag policy understands.
const KNOWN_TAGS: &[&str] = &[
    "Noun",
    "ProperNoun",
    "Verb",
    "Adjective",
    "Adverb",
    "PastTense",
    "PresentTense",
    "FutureTense",
    "Gerund",
    "Infinitive",
    "Function",
    "Value",
];

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: lexicon_linter <lexicon.ron | dir> [--with-builtin]");
        process::exit(0);
    }

    let lexicon_path = Path::new(&args[1]);
    let with_builtin = args.iter().skip(2).any(|a| a == "--with-builtin");

    let mut lexicon = if with_builtin {
        match Lexicon::builtin() {
            Ok(l) => l,
            Err(e) => {
                eprintln!("ERROR: built-in lexicon failed to load: {}", e);
                process::exit(1);
            }
        }
    } else {
        Lexicon::default()
    };

    if lexicon_path.is_file() {
        match Lexicon::load_from_ron(lexicon_path) {
            Ok(l) => lexicon.merge(l),
            Err(e) => {
                eprintln!("ERROR: Failed to load lexicon file: {}", e);
                process::exit(1);
            }
        }
    } else if lexicon_path.is_dir() {
        load_lexicons_recursive(lexicon_path, &mut lexicon);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }

    println!(
        "Loaded {} entries, {} stop words, {} suffix rules",
        lexicon.entries.len(),
        lexicon.stop_words.len(),
        lexicon.suffix_rules.len()
    );

    let (errors, warnings) = lint_lexicon(&lexicon);

    println!("\n=== Lexicon Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    process::exit(if errors.is_empty() { 0 } else { 1 });
}

fn load_lexicons_recursive(dir: &Path, lexicon: &mut Lexicon) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_lexicons_recursive(&path, lexicon);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                match Lexicon::load_from_ron(&path) {
                    Ok(l) => {
                        println!("  Loaded: {}", path.display());
                        lexicon.merge(l);
                    }
                    Err(e) => {
                        eprintln!("  ERROR loading {}: {}", path.display(), e);
                    }
                }
            }
        }
    }
}

fn lint_lexicon(lexicon: &Lexicon) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let known: HashSet<&str> = KNOWN_TAGS.iter().copied().collect();
    let policy = CompromiseTagPolicy;

    let mut words: Vec<&String> = lexicon.entries.keys().collect();
    words.sort();

    for word in words {
        let tags = &lexicon.entries[word];
        if tags.is_empty() {
            errors.push(format!("Entry '{}' has no tags", word));
            continue;
        }
        for tag in tags {
            if !known.contains(tag.as_str()) {
                warnings.push(format!("Entry '{}' uses unknown tag '{}'", word, tag));
            }
        }
        if lexicon.stop_words.contains(word.as_str()) {
            warnings.push(format!(
                "'{}' is both an entry and a stop word; the entry wins",
                word
            ));
        }
        if word.chars().any(char::is_whitespace) {
            errors.push(format!("Entry '{}' contains whitespace and can never match", word));
        }
    }

    for (index, rule) in lexicon.suffix_rules.iter().enumerate() {
        if rule.suffix.is_empty() {
            errors.push(format!("Suffix rule {} has an empty suffix", index));
        }
        if rule.min_len > 0 && rule.min_len <= rule.suffix.chars().count() {
            warnings.push(format!(
                "Suffix rule '-{}' has min_len {} which lets the bare suffix match",
                rule.suffix, rule.min_len
            ));
        }
        let probe = RawTerm {
            text: format!("x{}", rule.suffix),
            offset: None,
            tags: rule.tags.clone(),
        };
        if policy.classify(&probe).0 == WordClass::Other {
            warnings.push(format!(
                "Suffix rule '-{}' yields no replaceable category",
                rule.suffix
            ));
        }
        // An earlier rule whose suffix ends this one hides it.
        for earlier in &lexicon.suffix_rules[..index] {
            if rule.suffix.ends_with(earlier.suffix.as_str()) && earlier.min_len <= rule.min_len {
                errors.push(format!(
                    "Suffix rule '-{}' is shadowed by earlier rule '-{}'",
                    rule.suffix, earlier.suffix
                ));
            }
        }
    }

    for tag in &lexicon.default_tags {
        if !known.contains(tag.as_str()) {
            warnings.push(format!("Default tag '{}' is unknown", tag));
        }
    }

    (errors, warnings)
}
