mod defs;

use anyhow::{Context, Result};
use argbind::{BundleKeys, FlatEvaluator, Parser as ArgParser, StderrReporter, render_usage};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

use crate::defs::load_definitions;

/// Exit status when arguments were rejected or help was requested.
const USAGE_EXIT: u8 = 2;

#[derive(Parser)]
#[command(name = "argbind")]
#[command(version, about = "Parse argument vectors against JSON definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse arguments and print the resulting state as JSON
    Parse(ParseArgs),

    /// Print usage text for a definitions file
    Usage(UsageArgs),

    /// Classify arguments without bundling or value lookahead
    Flat(FlatArgs),
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to the definitions file
    #[arg(short, long, value_name = "FILE")]
    defs: PathBuf,

    /// Key an unknown short bundle by its whole remainder
    #[arg(long)]
    whole_bundle_keys: bool,

    /// Program name used in usage output
    #[arg(short, long, default_value = "program")]
    program: String,

    /// Arguments to parse (after `--`)
    #[arg(last = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Parser)]
struct UsageArgs {
    /// Path to the definitions file
    #[arg(short, long, value_name = "FILE")]
    defs: PathBuf,

    /// Program name used in usage output
    #[arg(short, long, default_value = "program")]
    program: String,
}

#[derive(Parser)]
struct FlatArgs {
    /// Optional definitions file; only defaults and required checks apply
    #[arg(short, long, value_name = "FILE")]
    defs: Option<PathBuf>,

    /// Arguments to classify (after `--`)
    #[arg(last = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => parse(args),
        Commands::Usage(args) => usage(args),
        Commands::Flat(args) => flat(args),
    }
}

fn parse(args: ParseArgs) -> Result<ExitCode> {
    let defs = load_definitions(&args.defs)?;
    let registry = defs.registry()?;
    let mut config = defs.config;
    if args.whole_bundle_keys {
        config = config.bundle_keys(BundleKeys::Whole);
    }

    let parsed = ArgParser::new(args.args)
        .with_registry(registry)
        .with_config(config)
        .parse();

    let mut reporter = StderrReporter::new(args.program);
    let rejected = parsed.show_usage_if_necessary(&mut reporter);
    if rejected {
        tracing::debug!(errors = parsed.errors().len(), "usage shown");
    }

    print_json(parsed.state())?;
    Ok(if rejected {
        ExitCode::from(USAGE_EXIT)
    } else {
        ExitCode::SUCCESS
    })
}

fn usage(args: UsageArgs) -> Result<ExitCode> {
    let defs = load_definitions(&args.defs)?;
    let registry = defs.registry()?;
    let text = render_usage(&args.program, &registry);

    let mut out = std::io::stdout().lock();
    out.write_all(text.as_bytes())
        .context("failed to write usage")?;
    Ok(ExitCode::SUCCESS)
}

fn flat(args: FlatArgs) -> Result<ExitCode> {
    let mut evaluator = FlatEvaluator::new(args.args);
    if let Some(path) = &args.defs {
        let defs = load_definitions(path)?;
        for def in defs.arguments {
            evaluator = evaluator
                .argument(def)
                .with_context(|| format!("invalid argument definitions: {}", path.display()))?;
        }
    }

    let parsed = evaluator.evaluate();
    let status = if parsed.errors().is_empty() {
        ExitCode::SUCCESS
    } else {
        for err in parsed.errors() {
            eprintln!("error: {err}");
        }
        ExitCode::from(USAGE_EXIT)
    };
    print_json(&parsed.into_state())?;
    Ok(status)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize parse state")?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
