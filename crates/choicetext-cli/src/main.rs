//! choicetext CLI - Resolve and inspect choice templates
//!
//! Usage:
//!   choicetext [OPTIONS] <COMMAND>
//!
//! Commands:
//!   resolve   Resolve a template read from a file or stdin
//!   tokens    Show the token stream
//!   check     Show template statistics and correction warnings
//!   card      Resolve a question/answer pair like the card render hook

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use choicetext_core::{analyze, tokenize, Card, MarkerConfig, RandomSource, Resolver, TokenKind};
use clap::{Args, Parser, Subcommand};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Parser)]
#[command(name = "choicetext", version, about = "Resolve nested random-choice text templates")]
struct Cli {
    #[command(flatten)]
    markers: MarkerArgs,

    /// Seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct MarkerArgs {
    /// JSON settings file with START_TAG, END_TAG and CHOICE_TAG
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Group start marker (overrides the settings file)
    #[arg(long, global = true)]
    start: Option<String>,

    /// Group end marker (overrides the settings file)
    #[arg(long, global = true)]
    end: Option<String>,

    /// Alternative separator (overrides the settings file)
    #[arg(long, global = true)]
    choice: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a template read from a file or stdin
    Resolve {
        /// Input file (stdin if omitted)
        file: Option<PathBuf>,

        /// Number of independent resolutions
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Show the token stream
    Tokens {
        /// Input file (stdin if omitted)
        file: Option<PathBuf>,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Show template statistics and correction warnings
    Check {
        /// Input file (stdin if omitted)
        file: Option<PathBuf>,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
    /// Resolve a question/answer pair like the card render hook
    Card {
        /// Question side template
        #[arg(short, long)]
        question: String,

        /// Answer side template
        #[arg(short, long)]
        answer: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli.markers)?;
    debug!(
        "markers: start={:?} end={:?} choice={:?}",
        config.start(),
        config.end(),
        config.choice()
    );

    match cli.command {
        Command::Resolve { file, count, json } => {
            let input = read_input(file.as_deref())?;
            let mut resolver = make_resolver(config, cli.seed);
            cmd_resolve(&mut resolver, &input, count, json)
        }
        Command::Tokens { file, json } => {
            let input = read_input(file.as_deref())?;
            cmd_tokens(&config, &input, json)
        }
        Command::Check { file, json } => {
            let input = read_input(file.as_deref())?;
            cmd_check(&config, &input, json)
        }
        Command::Card { question, answer } => {
            let mut resolver = make_resolver(config, cli.seed);
            cmd_card(&mut resolver, question, answer)
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

fn load_config(args: &MarkerArgs) -> Result<MarkerConfig> {
    let base = match &args.config {
        Some(path) => {
            let settings = fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?;
            MarkerConfig::from_json(&settings)
                .with_context(|| format!("invalid settings in '{}'", path.display()))?
        }
        None => MarkerConfig::default(),
    };

    if args.start.is_none() && args.end.is_none() && args.choice.is_none() {
        return Ok(base);
    }

    let config = MarkerConfig::new(
        args.start.as_deref().unwrap_or(base.start()),
        args.end.as_deref().unwrap_or(base.end()),
        args.choice.as_deref().unwrap_or(base.choice()),
    )?;
    Ok(config)
}

fn make_resolver(config: MarkerConfig, seed: Option<u64>) -> Resolver<StdRng> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Resolver::new(config, rng)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

fn cmd_resolve<R: RandomSource>(
    resolver: &mut Resolver<R>,
    input: &str,
    count: usize,
    json: bool,
) -> Result<()> {
    let outputs = (0..count)
        .map(|_| resolver.resolve(input))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        println!("{}", serde_json::json!({ "outputs": outputs }));
    } else {
        for output in outputs {
            println!("{}", output);
        }
    }
    Ok(())
}

// =============================================================================
// Tokens Command
// =============================================================================

fn cmd_tokens(config: &MarkerConfig, input: &str, json: bool) -> Result<()> {
    let tokens = tokenize(input, config);

    if json {
        let items: Vec<_> = tokens
            .iter()
            .map(|t| {
                let (kind, text) = describe(t.kind);
                serde_json::json!({ "kind": kind, "text": text, "span": t.span })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    for token in &tokens {
        let (kind, text) = describe(token.kind);
        println!(
            "{:>5}..{:<5} {:<8} {:?}",
            token.span.start, token.span.end, kind, text
        );
    }
    Ok(())
}

fn describe(kind: TokenKind<'_>) -> (&'static str, Option<&str>) {
    match kind {
        TokenKind::Start => ("start", None),
        TokenKind::End => ("end", None),
        TokenKind::Choice => ("choice", None),
        TokenKind::Literal(text) => ("literal", Some(text)),
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(config: &MarkerConfig, input: &str, json: bool) -> Result<()> {
    let stats = analyze(input, config);

    if stats.corrections.starts > 0 {
        warn!(
            "{} start marker(s) {:?} never closed; kept as text",
            stats.corrections.starts,
            config.start()
        );
    }
    if stats.corrections.choices > 0 {
        warn!(
            "{} choice marker(s) {:?} outside any group; kept as text",
            stats.corrections.choices,
            config.choice()
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Template Statistics");
    println!("-------------------");
    println!("Groups:         {}", stats.groups);
    println!("Alternatives:   {}", stats.alternatives);
    println!("Max depth:      {}", stats.max_depth);
    println!("Choice paths:   {}", stats.paths);
    println!();
    println!("Corrections:");
    println!("  Start markers:  {}", stats.corrections.starts);
    println!("  Choice markers: {}", stats.corrections.choices);

    Ok(())
}

// =============================================================================
// Card Command
// =============================================================================

fn cmd_card<R: RandomSource>(
    resolver: &mut Resolver<R>,
    question: String,
    answer: String,
) -> Result<()> {
    let mut card = Card::new(question, answer);
    resolver.render_card(&mut card)?;

    println!("Q: {}", card.question);
    println!("A: {}", card.answer);
    Ok(())
}
