use clap::Parser;
use colored::*;
use movie_finder::app::{App, SearchOutcome};
use movie_finder::assistant::{Assistant, DEFAULT_TEMPERATURE};
use movie_finder::builder::{LLMBackend, LLMBuilder};
use movie_finder::error::FinderError;
use movie_finder::filter::{self, FilterCriteria};
use movie_finder::movie::MovieCatalog;
use movie_finder::secret_store::SecretStore;
use movie_finder::speech::{Audio, Speaker};
use movie_finder::LLMProvider;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use spinners::{Spinner, Spinners};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Command line arguments for the movie finder
#[derive(Parser)]
#[clap(
    name = "movie-finder",
    about = "Search a movie dataset and ask an AI assistant for recommendations",
    allow_hyphen_values = true
)]
struct CliArgs {
    /// Command to execute (search, ask, speak, set, get, delete)
    #[arg(index = 1)]
    command: Option<String>,

    /// Prompt for ask, text for speak, or secret key for set/get/delete
    #[arg(index = 2)]
    text_or_key: Option<String>,

    /// Secret value for set command
    #[arg(index = 3)]
    value: Option<String>,

    /// CSV dataset with title, year, genre, rating and description columns
    #[arg(long, default_value = "movies.csv")]
    dataset: PathBuf,

    /// Chat backend (groq, openai)
    #[arg(long, default_value = "groq")]
    provider: String,

    /// Chat model name
    #[arg(long)]
    model: Option<String>,

    /// API key for the chat backend
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL for the chat API
    #[arg(long)]
    base_url: Option<String>,

    /// Temperature setting (0.0-2.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens in the response
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// Speech backend (google-translate, groq, openai)
    #[arg(long, default_value = "google-translate")]
    speech_backend: String,

    /// Voice for speech synthesis
    #[arg(long)]
    voice: Option<String>,

    /// Text-to-speech model
    #[arg(long)]
    speech_model: Option<String>,

    /// Where synthesized audio is written
    #[arg(long, default_value = "movie-finder-reply.mp3")]
    audio_out: PathBuf,

    /// Title search text
    #[arg(long)]
    title: Option<String>,

    /// Release year, or "All"
    #[arg(long)]
    year: Option<String>,

    /// Minimum rating (0-10), or "All"
    #[arg(long)]
    rating: Option<String>,

    /// Genre, or "All"
    #[arg(long)]
    genre: Option<String>,
}

/// Resolves the API key for `backend`: flag, then secret store, then environment.
fn get_api_key(backend: LLMBackend, flag: Option<&String>) -> Option<String> {
    flag.cloned().or_else(|| match SecretStore::new() {
        Ok(store) => store.api_key_for(backend),
        Err(e) => {
            log::warn!("secret store unavailable: {e}");
            backend.api_key_env().and_then(|name| std::env::var(name).ok())
        }
    })
}

fn build_chat_provider(args: &CliArgs) -> Result<Box<dyn LLMProvider>, FinderError> {
    let backend = LLMBackend::from_str(&args.provider)?;
    if backend == LLMBackend::GoogleTranslate {
        return Err(FinderError::InvalidRequest(format!(
            "{backend} cannot answer questions, pick groq or openai"
        )));
    }

    let mut builder = LLMBuilder::new()
        .backend(backend)
        .temperature(args.temperature.unwrap_or(DEFAULT_TEMPERATURE));

    if let Some(model) = &args.model {
        builder = builder.model(model);
    }
    if let Some(key) = get_api_key(backend, args.api_key.as_ref()) {
        builder = builder.api_key(key);
    }
    if let Some(url) = &args.base_url {
        builder = builder.base_url(url);
    }
    if let Some(mt) = args.max_tokens {
        builder = builder.max_tokens(mt);
    }
    if let Some(timeout) = args.timeout_seconds {
        builder = builder.timeout_seconds(timeout);
    }

    builder.build()
}

fn build_speech_provider(args: &CliArgs) -> Result<Box<dyn LLMProvider>, FinderError> {
    let backend = LLMBackend::from_str(&args.speech_backend)?;
    let mut builder = LLMBuilder::new().backend(backend);

    // The chat key doubles as the speech key when both use the same backend.
    let flag = if args.provider.eq_ignore_ascii_case(&backend.to_string()) {
        args.api_key.as_ref()
    } else {
        None
    };
    if let Some(key) = get_api_key(backend, flag) {
        builder = builder.api_key(key);
    }
    if let Some(voice) = &args.voice {
        builder = builder.voice(voice);
    }
    if let Some(model) = &args.speech_model {
        builder = builder.speech_model(model);
    }
    if let Some(timeout) = args.timeout_seconds {
        builder = builder.timeout_seconds(timeout);
    }

    builder.build()
}

/// Draft form seeded from the `--title/--year/--rating/--genre` flags.
fn criteria_from_args(args: &CliArgs) -> Result<FilterCriteria, FinderError> {
    Ok(FilterCriteria {
        title: args.title.as_deref().unwrap_or_default().trim().to_string(),
        year: filter::parse_year(args.year.as_deref().unwrap_or_default())?,
        min_rating: filter::parse_rating(args.rating.as_deref().unwrap_or_default())?,
        genre: args.genre.as_deref().and_then(filter::parse_genre),
    })
}

fn print_separator() {
    println!("{}", "─".repeat(50).bright_black());
}

fn print_outcome(outcome: &SearchOutcome<'_>) {
    match outcome {
        SearchOutcome::Found(movies) => {
            println!("{} {}", "✓".bright_green(), outcome.message());
            for movie in movies {
                println!(
                    "{} ({}) {} {} {}",
                    movie.title.bold(),
                    movie.year,
                    movie.genre.bright_blue(),
                    "★".bright_yellow(),
                    movie.rating
                );
                if !movie.description.is_empty() {
                    println!("  {}", movie.description.bright_black());
                }
            }
        }
        SearchOutcome::NotFound => println!("{} {}", "!".bright_yellow(), outcome.message()),
    }
}

fn print_trending(genres: &[String]) {
    if genres.is_empty() {
        return;
    }
    println!("{} {}", "Trending genres:".bright_cyan(), genres.join(", "));
}

fn print_error(e: &FinderError) {
    if e.is_validation() {
        println!("{} {}", "!".bright_yellow(), e);
    } else {
        eprintln!("{} {}", "Error:".bright_red(), e);
    }
}

/// Writes the audio to disk and, with the `rodio` feature, plays it.
fn output_audio(audio: &Audio, path: &Path) -> Result<(), FinderError> {
    let saved = audio.save(path)?;
    println!("{} Audio written to {}", "✓".bright_green(), saved.display());
    #[cfg(feature = "rodio")]
    audio.play()?;
    Ok(())
}

/// Streams a reply to stdout, replacing the spinner with the first fragment.
fn fragment_printer(spinner: &mut Option<Spinner>) -> impl FnMut(&str) + '_ {
    move |fragment: &str| {
        if let Some(mut sp) = spinner.take() {
            sp.stop();
            print!("\r\x1B[K{} ", "> Assistant:".bright_green());
        }
        print!("{fragment}");
        let _ = io::stdout().flush();
    }
}

fn stop_spinner(spinner: &mut Option<Spinner>) {
    if let Some(mut sp) = spinner.take() {
        sp.stop();
        print!("\r\x1B[K");
    }
}

fn thinking() -> Option<Spinner> {
    Some(Spinner::new(
        Spinners::Dots12,
        "Thinking...".bright_magenta().to_string(),
    ))
}

fn print_help() {
    println!("{}", "Commands:".bright_cyan());
    println!("  title <text>         set the title search text");
    println!("  year <YYYY|All>      set the release year ({}-{})", filter::YEAR_RANGE.start(), filter::YEAR_RANGE.end());
    println!("  rating <0-10|All>    set the minimum rating");
    println!("  genre <name|All>     set the genre");
    println!("  form                 show the form values");
    println!("  search               run the search with the form values");
    println!("  clear                reset the form and the assistant reply");
    println!("  ask <question>       ask the movie assistant");
    println!("  speak                read the last reply aloud");
    println!("  genres               list the dataset genres");
    println!("  trending             show the trending genres");
    println!("  help                 show this help");
    println!("  exit                 quit");
}

fn handle_secret_command(cmd: &str, args: &CliArgs) -> Result<bool, Box<dyn std::error::Error>> {
    match cmd {
        "set" => {
            if let (Some(key), Some(value)) = (args.text_or_key.as_deref(), args.value.as_deref()) {
                let mut store = SecretStore::new()?;
                store.set(key, value)?;
                println!("{} Secret '{}' has been set.", "✓".bright_green(), key);
            } else {
                eprintln!("{} Usage: movie-finder set <key> <value>", "Error:".bright_red());
            }
            Ok(true)
        }
        "get" => {
            if let Some(key) = args.text_or_key.as_deref() {
                let store = SecretStore::new()?;
                match store.get(key) {
                    Some(value) => println!("{}: {}", key, value),
                    None => println!("{} Secret '{}' not found", "!".bright_yellow(), key),
                }
            } else {
                eprintln!("{} Usage: movie-finder get <key>", "Error:".bright_red());
            }
            Ok(true)
        }
        "delete" => {
            if let Some(key) = args.text_or_key.as_deref() {
                let mut store = SecretStore::new()?;
                store.delete(key)?;
                println!("{} Secret '{}' has been deleted.", "✓".bright_green(), key);
            } else {
                eprintln!("{} Usage: movie-finder delete <key>", "Error:".bright_red());
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

async fn run_command(app: &mut App, line: &str, audio_out: &Path) -> Result<(), FinderError> {
    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match cmd.to_lowercase().as_str() {
        "title" => app.set_title(rest),
        "year" => app.set_year(rest)?,
        "rating" => app.set_rating(rest)?,
        "genre" => app.set_genre(rest)?,
        "form" => println!("{}", app.draft()),
        "search" => {
            print_outcome(&app.search());
            print_trending(&app.trending());
        }
        "clear" => {
            app.clear();
            println!("{} Form and reply cleared.", "✓".bright_green());
        }
        "ask" => {
            Assistant::validate(rest)?;
            let mut spinner = thinking();
            let result = app.ask(rest, fragment_printer(&mut spinner)).await;
            stop_spinner(&mut spinner);
            match result {
                Ok(_) => println!(),
                Err(e) => {
                    println!();
                    return Err(e);
                }
            }
        }
        "speak" => {
            let mut sp = Spinner::new(
                Spinners::Dots12,
                "Synthesizing...".bright_magenta().to_string(),
            );
            let result = app.speak().await;
            sp.stop();
            print!("\r\x1B[K");
            output_audio(&result?, audio_out)?;
        }
        "genres" => println!("{}", app.catalog().genres().join(", ")),
        "trending" => print_trending(&app.trending()),
        "help" => print_help(),
        _ => println!(
            "{} Unknown command '{}'. Type 'help' for the list.",
            "!".bright_yellow(),
            cmd
        ),
    }
    Ok(())
}

/// Main entry point for the movie finder
///
/// Handles secret management, one-shot search/ask/speak and the interactive REPL.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    movie_finder::init_logging();
    let args = CliArgs::parse();

    if let Some(cmd) = args.command.as_deref() {
        if handle_secret_command(cmd, &args)? {
            return Ok(());
        }

        match cmd {
            "search" => {
                let catalog = MovieCatalog::from_path(&args.dataset)?;
                let criteria = criteria_from_args(&args)?;
                print_outcome(&SearchOutcome::from_matches(criteria.apply(catalog.movies())));
                print_trending(&catalog.trending_genres(movie_finder::app::TRENDING_COUNT));
                return Ok(());
            }
            "ask" => {
                let assistant = Assistant::new(
                    build_chat_provider(&args)
                        .map_err(|e| format!("Failed to build chat provider: {e}"))?,
                );
                let prompt = args.text_or_key.as_deref().unwrap_or_default();
                if let Err(e) = Assistant::validate(prompt) {
                    print_error(&e);
                    return Ok(());
                }
                let mut spinner = thinking();
                let result = assistant.ask(prompt, fragment_printer(&mut spinner)).await;
                stop_spinner(&mut spinner);
                match result {
                    Ok(_) => println!(),
                    Err(e) => print_error(&e),
                }
                return Ok(());
            }
            "speak" => {
                let speaker = Speaker::new(
                    build_speech_provider(&args)
                        .map_err(|e| format!("Failed to build speech provider: {e}"))?,
                );
                match speaker.speak(args.text_or_key.as_deref()).await {
                    Ok(audio) => output_audio(&audio, &args.audio_out)?,
                    Err(e) => print_error(&e),
                }
                return Ok(());
            }
            other => {
                eprintln!("{} Unknown command '{}'", "Error:".bright_red(), other);
                return Ok(());
            }
        }
    }

    let catalog = MovieCatalog::from_path(&args.dataset)?;
    let assistant = Assistant::new(
        build_chat_provider(&args).map_err(|e| format!("Failed to build chat provider: {e}"))?,
    );
    let speaker = Speaker::new(
        build_speech_provider(&args).map_err(|e| format!("Failed to build speech provider: {e}"))?,
    );
    let mut app = App::new(catalog, assistant, speaker);

    let seeded = criteria_from_args(&args)?;
    if let Some(genre) = &seeded.genre {
        app.set_genre(genre)?;
    }
    app.set_title(&seeded.title);
    if let Some(year) = seeded.year {
        app.set_year(&year.to_string())?;
    }
    if let Some(rating) = seeded.min_rating {
        app.set_rating(&rating.to_string())?;
    }

    println!("{}", "🎬 Movie Finder".bright_cyan());
    println!(
        "Dataset: {} ({} movies)",
        args.dataset.display().to_string().bright_green(),
        app.catalog().len()
    );
    println!("Assistant: {}", args.provider.bright_green());
    print_trending(&app.trending());
    println!("{}", "Type 'help' for commands, 'exit' to quit".bright_black());
    print_separator();

    let mut rl = DefaultEditor::new()?;

    loop {
        io::stdout().flush()?;
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit") {
                    println!("{}", "👋 Goodbye!".bright_cyan());
                    break;
                }
                let _ = rl.add_history_entry(trimmed);

                if let Err(e) = run_command(&mut app, trimmed, &args.audio_out).await {
                    print_error(&e);
                }
                print_separator();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{}", "👋 Goodbye!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".bright_red(), err);
                break;
            }
        }
    }

    Ok(())
}
