use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use rhyme_core::loaders::{self, write_plain};
use rhyme_core::persistence::save_to_disk;
use rhyme_core::{Query, QueryOptions, RhymeConfig, RhymeEngine, RhymeMatch, SourceFormat};
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rhyme_engine")]
#[command(about = "Find rhymes in a pronunciation dictionary")]
#[command(version)]
struct Cli {
    /// JSON config file; command-line flags override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Settings {
    /// Dictionary file
    #[arg(short, long, global = true)]
    dictionary: Option<PathBuf>,

    /// Dictionary format: plain, affix or binary (default: from the extension)
    #[arg(short, long, global = true)]
    format: Option<SourceFormat>,

    /// Affix rule file for the affix format
    #[arg(short, long, global = true)]
    affix: Option<PathBuf>,

    /// Maximum number of rhymes to show
    #[arg(short, long, global = true)]
    limit: Option<usize>,

    /// Minimum number of trailing sounds a rhyme must share
    #[arg(short, long = "min-shared", global = true)]
    min_shared: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up rhymes for a word, or for a transcription with --ipa
    Query {
        /// Dictionary word to rhyme with
        word: Option<String>,

        /// Phonetic transcription to rhyme with instead of a word
        #[arg(long, conflicts_with = "word")]
        ipa: Option<String>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,

        /// Let a word appear among its own rhymes
        #[arg(long)]
        include_self: bool,

        /// Leave this word out of the results
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Precompile a text dictionary into the binary format
    Compile {
        /// Source dictionary (read with --format/--affix)
        source: PathBuf,

        /// Output file
        output: PathBuf,
    },

    /// Print a dictionary in the plain text format
    Dump {
        /// Source dictionary (read with --format/--affix)
        source: PathBuf,
    },

    /// Interactive rhyme lookup
    Shell,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = load_config(cli.config.as_deref(), cli.settings)?;

    match cli.command {
        Commands::Query { word, ipa, json, include_self, exclude } => {
            config.exclude_query_word &= !include_self;
            let query = match (word, ipa) {
                (Some(word), None) => Query::Word(word),
                (None, Some(ipa)) => Query::Transcription(ipa),
                _ => bail!("give either a word or --ipa <transcription>"),
            };
            let options = QueryOptions { exclude_word: exclude, ..QueryOptions::from(&config) };
            run_query(&config, &query, &options, json)
        }
        Commands::Compile { source, output } => {
            config.dictionary = Some(source);
            let report = load(&config)?;
            save_to_disk(&report.list, &output).with_context(|| format!("writing {}", output.display()))?;
            println!(
                "Compiled {} entries into {} ({} skipped)",
                report.list.len(),
                output.display(),
                report.skipped
            );
            Ok(())
        }
        Commands::Dump { source } => {
            config.dictionary = Some(source);
            let report = load(&config)?;
            write_plain(&report.list, &mut stdout().lock())?;
            if report.skipped > 0 {
                eprintln!("{} rows skipped", report.skipped);
            }
            Ok(())
        }
        Commands::Shell => run_shell(config),
    }
}

/// The config file (if any) with command-line settings on top, validated
/// only once both are combined.
fn load_config(path: Option<&Path>, settings: Settings) -> Result<RhymeConfig> {
    let mut config = match path {
        Some(path) => RhymeConfig::read_file(path).with_context(|| format!("reading {}", path.display()))?,
        None => RhymeConfig::default(),
    };
    apply_settings(&mut config, settings);
    config.validate()?;
    Ok(config)
}

fn apply_settings(config: &mut RhymeConfig, settings: Settings) {
    if settings.dictionary.is_some() {
        config.dictionary = settings.dictionary;
    }
    if settings.format.is_some() {
        config.format = settings.format;
    }
    if settings.affix.is_some() {
        config.affix = settings.affix;
    }
    if let Some(limit) = settings.limit {
        config.limit = limit;
    }
    if let Some(min_shared) = settings.min_shared {
        config.min_shared_suffix = min_shared;
    }
}

fn load(config: &RhymeConfig) -> Result<rhyme_core::LoadReport> {
    let source = loaders::open_source(config)?;
    Ok(source.load()?)
}

fn open_engine(config: &RhymeConfig) -> Result<RhymeEngine> {
    if config.dictionary.is_none() {
        bail!("no dictionary given (use --dictionary or a config file)");
    }
    let (engine, skipped) = RhymeEngine::from_config(config)?;
    if skipped > 0 {
        eprintln!("{} dictionary rows skipped", skipped);
    }
    Ok(engine)
}

fn run_query(config: &RhymeConfig, query: &Query, options: &QueryOptions, json: bool) -> Result<()> {
    let engine = open_engine(config)?;
    let matches = engine.lookup(query, options)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        print_matches(&matches);
    }
    Ok(())
}

fn print_matches(matches: &[RhymeMatch]) {
    if matches.is_empty() {
        println!("{}", "No rhymes found.".dark_grey());
        return;
    }
    for (i, m) in matches.iter().enumerate() {
        println!(
            "{:>3}. {:<20} {} {:>10}  /{}/",
            i + 1,
            m.entry.word.as_str().bold(),
            format!("shared {}", m.shared_suffix_length).green(),
            m.entry.frequency,
            m.entry.pronunciation
        );
    }
}

fn run_shell(mut config: RhymeConfig) -> Result<()> {
    let engine = open_engine(&config)?;
    let mut last: Option<Query> = None;

    loop {
        print_header(&config, &engine)?;
        if let Some(query) = &last {
            match engine.lookup(query, &QueryOptions::from(&config)) {
                Ok(matches) => print_matches(&matches),
                Err(e) => println!("{}", e.to_string().red()),
            }
        }
        print!("\n> ");
        stdout().flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let cmd = input.trim();

        match cmd.split_once(' ').unwrap_or((cmd, "")) {
            ("exit", _) | ("/quit", _) => break,
            ("", _) => {}
            ("/ipa", text) => last = Some(Query::Transcription(text.trim().to_string())),
            ("/limit", n) => set_positive(&mut config.limit, n),
            ("/min", n) => set_positive(&mut config.min_shared_suffix, n),
            ("/reload", _) => {
                let reloaded = loaders::open_source(&config).and_then(|source| engine.reload(source.as_ref()));
                match reloaded {
                    Ok(skipped) => println!("Reloaded ({skipped} skipped)"),
                    Err(e) => println!("{}", format!("reload failed: {e}").red()),
                }
            }
            (word, _) => last = Some(Query::Word(word.to_string())),
        }
    }
    Ok(())
}

fn set_positive(setting: &mut usize, arg: &str) {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => *setting = n,
        _ => println!("{}", "expected a positive number".red()),
    }
}

fn print_header(config: &RhymeConfig, engine: &RhymeEngine) -> Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    let index = engine.snapshot();
    println!("{}", "Rhyme shell".bold());
    println!("---------------------------------------------------------------");
    println!(
        "{} entries, {} pronunciations | limit {} | min shared {}",
        index.len(),
        index.group_count(),
        config.limit,
        config.min_shared_suffix
    );
    println!("Type a word, '/ipa <transcription>', '/limit N', '/min N', '/reload' or 'exit'.\n");
    Ok(())
}
