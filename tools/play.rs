//! Play: interactive shell for trying stories in every mode.
//!
//! Usage: play [--config <path>] [--lexicon <path>] [--stories <path>] [--seed <n>]
//!
//! Logging goes to stderr and is filtered by `MADLIB_LOG` (default: warn).

use madlib_engine::core::export::{file_stem, share_text};
use madlib_engine::core::pipeline::StoryEngine;
use madlib_engine::core::session::{Mode, Phase, Sender, Session, SessionConfig};
use madlib_engine::core::source::InMemoryStories;
use madlib_engine::schema::blank::BlankId;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut config_path = None;
    let mut lexicon_path = None;
    let mut stories_path = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--lexicon" if i + 1 < args.len() => {
                i += 1;
                lexicon_path = Some(args[i].clone());
            }
            "--stories" if i + 1 < args.len() => {
                i += 1;
                stories_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    init_tracing();

    let mut source = match stories_path {
        Some(ref path) => match std::fs::read_to_string(path) {
            Ok(contents) => InMemoryStories::from_text(&contents, seed),
            Err(e) => {
                eprintln!("ERROR reading stories {}: {}", path, e);
                process::exit(1);
            }
        },
        None => InMemoryStories::builtin(seed),
    };
    println!("Loaded {} stories", source.eligible().len());

    let mut session = match build_session(config_path.as_deref(), lexicon_path.as_deref(), seed) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}> ", prompt_label(&session));
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // While chatting, anything that is not a command is an answer.
        if session.phase() == Phase::Chatting && !line.starts_with(':') {
            let seen = session.transcript().len();
            match session.answer(line) {
                Ok(_) => print_bot_messages(&session, seen + 1),
                Err(e) => println!("ERROR: {}", e),
            }
            if session.phase() == Phase::Completed {
                print_completion(&session);
            }
            continue;
        }

        let line = line.trim_start_matches(':');
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "mode" => match parse_mode(rest) {
                Some(mode) => match session.set_mode(mode) {
                    Ok(()) => println!("Mode set to {:?}", mode),
                    Err(e) => println!("ERROR: {}", e),
                },
                None => {
                    println!("Usage: mode <direct|template|chat>");
                    println!("  Current: {:?}", session.mode());
                }
            },
            "random" => match session.load_story(&mut source) {
                Ok(story) => println!("\n{}\n", story),
                Err(e) => println!("ERROR: {}", e),
            },
            "story" => {
                let text = if rest.is_empty() {
                    session.input().to_string()
                } else {
                    rest.to_string()
                };
                if text.is_empty() {
                    println!("Usage: story <text>  (or 'random' first)");
                    continue;
                }
                start(&mut session, &text);
            }
            "blanks" => print_blanks(&session),
            "fill" => {
                let Some((index, word)) = rest.split_once(char::is_whitespace) else {
                    println!("Usage: fill <n> <word>");
                    continue;
                };
                let id = match index.parse::<usize>().ok().and_then(|n| blank_id_at(&session, n)) {
                    Some(id) => id,
                    None => {
                        println!("No blank numbered {}", index);
                        continue;
                    }
                };
                if let Err(e) = session.set_replacement(&id, word.trim()) {
                    println!("ERROR: {}", e);
                }
            }
            "generate" | "go" => match session.generate() {
                Ok(_) => print_completion(&session),
                Err(e) => println!("ERROR: {}", e),
            },
            "sheet" => match session.printable_sheet() {
                Some(sheet) => println!("\n{}", sheet.render()),
                None => println!("Nothing analyzed yet."),
            },
            "reset" => {
                session.reset();
                println!("Back to setup.");
            }
            "seed" => match rest.parse::<u64>() {
                Ok(s) => {
                    let mode = session.mode();
                    match build_session(config_path.as_deref(), lexicon_path.as_deref(), s) {
                        Ok(mut fresh) => {
                            fresh.set_mode(mode).ok();
                            session = fresh;
                            println!("Seed set to {}", s);
                        }
                        Err(e) => println!("ERROR: {}", e),
                    }
                }
                Err(_) => println!("Usage: seed <n>"),
            },
            _ => println!("Unknown command: '{}'. Type 'help' for available commands.", cmd),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MADLIB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_session(
    config_path: Option<&str>,
    lexicon_path: Option<&str>,
    seed: u64,
) -> Result<Session, madlib_engine::core::pipeline::PipelineError> {
    let mut builder = StoryEngine::builder().seed(seed);
    if let Some(path) = config_path {
        builder = builder.config_path(path);
    }
    if let Some(path) = lexicon_path {
        builder = builder.lexicon_path(path);
    }
    Ok(Session::new(builder.build()?, SessionConfig::default()))
}

fn start(session: &mut Session, text: &str) {
    if session.mode() == Mode::Conversation {
        match session.start_conversation(text) {
            Ok(_) => print_bot_messages(session, 0),
            Err(e) => println!("ERROR: {}", e),
        }
        if session.phase() == Phase::Completed {
            print_completion(session);
        }
        return;
    }

    if let Err(e) = session.analyze(text) {
        println!("ERROR: {}", e);
        return;
    }
    if let Some(title) = session.title() {
        println!("\n{}", title);
    }
    if let Some(notice) = session.notice() {
        println!("{}", notice);
    }
    print_blanks(session);
}

fn print_blanks(session: &Session) {
    let Some(selection) = session.selection() else {
        println!("Nothing analyzed yet.");
        return;
    };
    println!();
    for blank in selection {
        let word = session.replacements().filled(&blank.id).unwrap_or("");
        println!(
            "  {:>2}) {:<24} {}",
            blank.display_index,
            blank.label(),
            word
        );
        println!("      {}", blank.token.definition());
    }
    println!();
}

fn print_bot_messages(session: &Session, from: usize) {
    for message in session.transcript().iter().skip(from) {
        if message.sender == Sender::Bot {
            println!("  bot: {}", message.text);
        }
    }
}

fn print_completion(session: &Session) {
    let Some(completion) = session.completion() else {
        return;
    };
    println!("\n--- {} ---", completion.title);
    println!("{}", completion.highlighted.as_deref().unwrap_or(&completion.text));
    println!("--- End ---");
    println!("Save as: {}.txt", file_stem(&completion.title));
    if completion.mode != Mode::Template {
        println!("{}", share_text(&completion.text));
    }
    println!();
}

fn blank_id_at(session: &Session, number: usize) -> Option<BlankId> {
    session
        .selection()?
        .iter()
        .find(|b| b.display_index == number)
        .map(|b| b.id.clone())
}

fn prompt_label(session: &Session) -> &'static str {
    match session.phase() {
        Phase::Setup => "setup",
        Phase::Playing => "fill",
        Phase::Chatting => "chat",
        Phase::Completed => "done",
    }
}

fn parse_mode(s: &str) -> Option<Mode> {
    match s.to_lowercase().as_str() {
        "direct" | "fill" => Some(Mode::DirectFill),
        "template" | "print" => Some(Mode::Template),
        "chat" | "conversation" => Some(Mode::Conversation),
        _ => None,
    }
}

fn print_usage() {
    println!("Play: interactive shell for word-substitution stories.");
    println!();
    println!("Usage: play [--config <path>] [--lexicon <path>] [--stories <path>] [--seed <n>]");
    println!();
    println!("  --config <path>   Engine settings (RON)");
    println!("  --lexicon <path>  Extra lexicon merged over the built-in one (RON)");
    println!("  --stories <path>  Stories separated by blank lines (default: built-in)");
    println!("  --seed <n>        Initial RNG seed (default: 42)");
}

fn print_help() {
    println!("Commands:");
    println!("  mode <direct|template|chat>  Choose how words are collected");
    println!("  random                       Load a random story");
    println!("  story [text]                 Analyze text (or the loaded story)");
    println!("  blanks                       List blanks and current words");
    println!("  fill <n> <word>              Set the word for blank n");
    println!("  generate                     Build the story or template");
    println!("  sheet                        Show a printable word sheet");
    println!("  reset                        Start over with the same text");
    println!("  seed <n>                     Rebuild the engine with a new seed");
    println!("  help                         Show this help");
    println!("  quit                         Exit");
    println!();
    println!("While chatting, type answers directly. Prefix commands with ':'.");
}
