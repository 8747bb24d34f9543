//! `timex` - normalize temporal expressions from arguments or stdin.
//!
//! Each expression prints as `expression<TAB>value`. Strict-policy failures
//! print to stderr and make the process exit non-zero.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use timex_config::TimexConfig;
use timex_core::{AnchorPoint, FailurePolicy, Normalizer, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "timex",
    version,
    about = "Normalize natural-language temporal expressions",
    long_about = "Normalize natural-language temporal expressions such as \
                  \"next week\" or \"5/13, 2012\" into calendar values.\n\n\
                  Reads one expression per line from stdin when none are given."
)]
struct Cli {
    /// Expressions to normalize.
    #[arg(value_name = "EXPRESSION")]
    expressions: Vec<String>,

    /// Per-expression timeout in milliseconds (100-10000).
    #[arg(long = "timeout-ms", value_name = "MILLIS")]
    timeout_ms: Option<u64>,

    /// Print the full operator structure instead of the compact value.
    #[arg(long)]
    structured: bool,

    /// Print an empty value instead of failing.
    #[arg(long)]
    lenient: bool,

    /// Reference point, `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM`. Defaults to now.
    #[arg(long, value_name = "WHEN", value_parser = parse_anchor)]
    anchor: Option<AnchorPoint>,

    /// Config file to use instead of `~/.timex/config.toml`.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn parse_anchor(raw: &str) -> Result<AnchorPoint, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(AnchorPoint::from_date(date));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(AnchorPoint::from_date_time)
        .map_err(|_| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM, got '{raw}'"))
}

fn build_normalizer(cli: &Cli) -> Result<Normalizer> {
    let file = match &cli.config {
        Some(path) => Some(TimexConfig::load_from(path)?),
        None => TimexConfig::load()?,
    };
    let settings = timex_config::resolve(file.as_ref())?;

    let mut builder = Normalizer::builder().config(settings);
    if let Some(timeout_ms) = cli.timeout_ms {
        builder = builder.timeout_ms(timeout_ms);
    }
    if cli.structured {
        builder = builder.output_format(OutputFormat::Structured);
    }
    if cli.lenient {
        builder = builder.failure_policy(FailurePolicy::Lenient);
    }
    builder.build().context("failed to start normalizer")
}

fn expressions(cli: &Cli) -> Result<Vec<String>> {
    if !cli.expressions.is_empty() {
        return Ok(cli.expressions.clone());
    }
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Returns whether every expression normalized.
fn run(cli: &Cli) -> Result<bool> {
    let normalizer = build_normalizer(cli)?;
    let mut all_ok = true;

    for expression in expressions(cli)? {
        let result = match cli.anchor {
            Some(anchor) => normalizer.normalize_anchored(&expression, anchor),
            None => normalizer.normalize(&expression),
        };
        match result {
            Ok(value) => println!("{expression}\t{value}"),
            Err(err) => {
                all_ok = false;
                eprintln!("{expression}\terror: {:#}", Error::new(err));
            }
        }
    }

    let diagnostics = normalizer.diagnostics();
    tracing::info!(
        succeeded = diagnostics.succeeded,
        unsupported = diagnostics.unsupported,
        timed_out = diagnostics.timed_out,
        invalid_input = diagnostics.invalid_input,
        "done"
    );
    normalizer.close();
    Ok(all_ok)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
