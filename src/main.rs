mod debug_report;

use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use typetree::{Error, Lexicon, Options, RuleSet, annotate_verbose_with};

/// Annotate a qtree bracket tree with semantic types and print a debug report.
#[derive(Parser, Debug)]
#[command(name = "typetree", version)]
#[command(after_help = "Exit codes:
  0  Success (composition failures are reported, not fatal).
  1  The lexicon or stdin could not be read.
  2  Invalid arguments, malformed tree, or malformed lexicon.

Logging goes to stderr and is filtered by TYPETREE_LOG (default: warn).")]
struct Cli {
    /// JSON lexicon mapping type strings to lists of words.
    #[arg(short, long, env = "TYPETREE_LEXICON")]
    lexicon: Option<PathBuf>,

    /// Tree in qtree bracket notation. Read from stdin when omitted.
    #[arg(short, long)]
    tree: Option<String>,

    /// Enable predicate modification, predicate abstraction and vacuous words.
    #[arg(long)]
    all_rules: bool,

    /// Stop after this many composition passes.
    #[arg(long, value_name = "N")]
    max_passes: Option<usize>,

    /// Treat every ambiguous word as an error instead of narrowing it.
    #[arg(long)]
    ambiguity_fatal: bool,

    /// Force ANSI color output.
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable ANSI color output.
    #[arg(long)]
    no_color: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("TYPETREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(io::stderr).init();

    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        let code = match err {
            Error::Io(_) => 1,
            Error::Parse(_) | Error::Lexicon(_) => 2,
        };
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> typetree::Result<()> {
    let lexicon = match &cli.lexicon {
        Some(path) => {
            debug!(path = %path.display(), "loading lexicon");
            Lexicon::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Lexicon::new(),
    };

    let tree = match &cli.tree {
        Some(tree) => tree.clone(),
        None => read_stdin_input()?,
    };

    let options = Options {
        rules: if cli.all_rules { RuleSet::all() } else { RuleSet::default() },
        ambiguity_fatal: cli.ambiguity_fatal,
        max_passes: cli.max_passes,
    };
    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };

    let out = annotate_verbose_with(tree.trim(), &lexicon, &options)?;
    debug_report::print_run(tree.trim(), &out, color);
    Ok(())
}

fn read_stdin_input() -> io::Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}
