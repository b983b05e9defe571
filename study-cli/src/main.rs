use std::cell::Cell;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flashcards_frontend_rs::{
    App, AssociationLanguage, CardDisplay, ContentType, Direction, DisplayState, DisplayText,
    Preferences, SessionMode, SettingsUpdate, StudyMode, Topic,
};
use lesson_utils::LessonId;
use stash::JsonFileStore;

#[derive(Parser)]
#[command(name = "study-cli")]
#[command(about = "Study Thai vocabulary and phrases in the terminal")]
struct Cli {
    /// Where preferences are saved
    #[arg(long, value_name = "FILE", default_value = "flashcards-prefs.json")]
    prefs: PathBuf,

    /// Seed for shuffled and quiz order (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the lessons, marking the selected ones
    Lessons,
    /// Change and save preferences, then print them
    Settings(SettingsArgs),
    /// Run a session with the saved preferences
    Study,
}

#[derive(Args)]
struct SettingsArgs {
    /// Comma-separated lesson numbers, e.g. `1,2`
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    lessons: Option<Vec<u32>>,

    /// ordered, shuffled or quiz
    #[arg(long, value_parser = stored(StudyMode::from_stored))]
    mode: Option<StudyMode>,

    /// thai-english or english-thai
    #[arg(long, value_parser = stored(Direction::from_stored))]
    direction: Option<Direction>,

    /// words, phrases or both
    #[arg(long, value_parser = stored(ContentType::from_stored))]
    content: Option<ContentType>,

    /// Show mnemonic associations on English to Thai cards
    #[arg(long)]
    associations: Option<bool>,

    /// Comma-separated association languages: en, ru
    #[arg(
        long,
        value_delimiter = ',',
        num_args = 0..,
        value_parser = stored(AssociationLanguage::from_stored)
    )]
    association_languages: Option<Vec<AssociationLanguage>>,
}

impl From<SettingsArgs> for SettingsUpdate {
    fn from(args: SettingsArgs) -> Self {
        SettingsUpdate {
            selected_lessons: args
                .lessons
                .map(|lessons| lessons.into_iter().map(LessonId).collect()),
            content_type: args.content,
            study_mode: args.mode,
            direction: args.direction,
            show_associations: args.associations,
            association_languages: args
                .association_languages
                .map(|languages| languages.into_iter().collect()),
        }
    }
}

fn stored<T: 'static>(
    from_stored: fn(&str) -> Option<T>,
) -> impl Fn(&str) -> Result<T, String> + Clone + Send + Sync + 'static {
    move |name: &str| from_stored(name.trim()).ok_or_else(|| format!("unknown value `{name}`"))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = JsonFileStore::open(&cli.prefs)
        .with_context(|| format!("Failed to open preferences at {}", cli.prefs.display()))?;
    let seed = cli.seed.unwrap_or_else(rand::random);
    log::debug!("Using seed {seed}");
    let app = App::with_bundled_lessons(store, seed).context("Failed to load lessons")?;

    match cli.command {
        Command::Lessons => print_lessons(&app),
        Command::Settings(args) => {
            if !app.save_settings(args.into()) {
                anyhow::bail!("Preferences not saved to {}", cli.prefs.display());
            }
            print_preferences(&app.preferences());
        }
        Command::Study => study(&app)?,
    }
    Ok(())
}

fn print_lessons(app: &App) {
    let selected = app.preferences().selected_lessons;
    for summary in app.lesson_summaries() {
        let mark = if selected.contains(&summary.id) { 'x' } else { ' ' };
        println!("[{mark}] {summary}");
    }
    if let Some(hint) = app.start_hint() {
        println!("{hint}");
    }
}

fn print_preferences(prefs: &Preferences) {
    let join = |items: Vec<String>| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };
    println!(
        "Lessons:      {}",
        join(prefs.selected_lessons.iter().map(ToString::to_string).collect())
    );
    println!("Mode:         {}", prefs.study_mode);
    println!("Direction:    {}", prefs.direction);
    println!("Content:      {}", prefs.content_type);
    println!(
        "Associations: {} ({})",
        if prefs.show_associations { "on" } else { "off" },
        join(prefs.association_languages.iter().map(ToString::to_string).collect())
    );
}

fn print_text(text: &DisplayText) {
    for line in text.lines() {
        println!("    {line}");
    }
}

fn read_line(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    prompt: &str,
) -> anyhow::Result<Option<String>> {
    print!("{prompt} ");
    std::io::stdout().flush().context("Failed to write prompt")?;
    lines
        .next()
        .transpose()
        .context("Failed to read from stdin")
}

fn study(app: &App) -> anyhow::Result<()> {
    let mode = match app.start_session() {
        Ok(mode) => mode,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    let changed = Rc::new(Cell::new(true));
    let flag = changed.clone();
    let key = app.subscribe(move |topic| {
        if topic == Topic::Session {
            flag.set(true);
        }
    });

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let result = match mode {
        SessionMode::Flashcard => run_flashcards(app, &changed, &mut lines),
        SessionMode::Quiz => run_quiz(app, &mut lines),
    };

    app.unsubscribe(key);
    app.end_session();
    result
}

fn print_card(card: &CardDisplay) {
    println!();
    println!("Card {}", card.progress);
    if card.showing_front {
        print_text(&card.front);
    } else {
        print_text(&card.back);
        for association in &card.back_associations {
            println!("    ({association})");
        }
    }
}

fn run_flashcards(
    app: &App,
    changed: &Cell<bool>,
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> anyhow::Result<()> {
    loop {
        if changed.replace(false) {
            if let DisplayState::Flashcard(card) = app.display_state() {
                print_card(&card);
            }
        }
        let Some(line) = read_line(lines, "[n]ext [p]revious [f]lip [q]uit >")? else {
            return Ok(());
        };
        match line.trim() {
            "n" | "" => {
                if !app.navigate(1) {
                    println!("That was the last card.");
                }
            }
            "p" => {
                if !app.navigate(-1) {
                    println!("This is the first card.");
                }
            }
            "f" => {
                app.flip();
            }
            "q" => return Ok(()),
            other => println!("Unknown command `{other}`"),
        }
    }
}

fn run_quiz(
    app: &App,
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> anyhow::Result<()> {
    loop {
        let DisplayState::Quiz(quiz) = app.display_state() else {
            return Ok(());
        };
        let Some(prompt) = &quiz.prompt else {
            if let Some(feedback) = &quiz.feedback {
                println!();
                println!("{feedback}");
            }
            return Ok(());
        };

        println!();
        println!("{}    {}", quiz.progress_line(), quiz.score_line());
        print_text(prompt);
        let Some(answer) = read_line(lines, &format!("{} >", quiz.answer_placeholder))? else {
            return Ok(());
        };
        let Some(graded) = app.submit_quiz_answer(answer) else {
            return Ok(());
        };
        println!("{}", graded.feedback);
        std::thread::sleep(graded.pending.delay);
        app.advance_quiz(graded.pending);
    }
}
