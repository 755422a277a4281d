//! Alamat command-line tool
//!
//! Extracts structured Indonesian addresses from free text or pre-tagged
//! BIO files, reconciles them against the postal directory, and manages
//! the local SQLite copy of that directory.

mod bio;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use alamat_core::{
    AddressPipeline, DirectoryLookup, EntityRecord, KeywordTagger, NoDirectory, PipelineConfig,
    ReconcileOutcome,
};
use alamat_directory::http::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use alamat_directory::{HttpDirectoryConfig, PosIndonesiaDirectory, SqliteDirectory, default_db_path};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// CLI arguments
#[derive(Parser)]
#[command(name = "alamat")]
#[command(about = "Extract and reconcile Indonesian addresses")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pipeline configuration file (JSON)
    #[arg(short, long, env = "ALAMAT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory backend used for reconciliation and lookups
    #[arg(short, long, value_enum, default_value_t = Backend::Http, global = true)]
    directory: Backend,

    /// Postal directory search endpoint
    #[arg(long, env = "ALAMAT_DIRECTORY_URL", default_value = DEFAULT_ENDPOINT, global = true)]
    directory_url: String,

    /// HTTP timeout in seconds
    #[arg(long, env = "ALAMAT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    /// SQLite region store
    #[arg(long, env = "ALAMAT_DB", global = true)]
    db: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse free-text addresses (reads stdin lines when none are given)
    Parse {
        addresses: Vec<String>,

        /// Skip directory reconciliation
        #[arg(long)]
        no_reconcile: bool,
    },
    /// Aggregate addresses from a BIO-tagged file
    Tagged {
        file: PathBuf,

        /// Skip directory reconciliation
        #[arg(long)]
        no_reconcile: bool,
    },
    /// Import a JSON array of region records into the SQLite store
    Import { file: PathBuf },
    /// Print directory candidates for a postal code or region name
    Lookup { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Pos Indonesia web search
    Http,
    /// Local SQLite store
    Sqlite,
    /// No directory; reconciliation finds nothing
    #[value(name = "none")]
    Disabled,
}

/// One line of `parse` / `tagged` output.
#[derive(Debug, Serialize)]
struct ParseOutput {
    input: String,
    record: Option<EntityRecord>,
    outcome: Option<ReconcileOutcome>,
    error: Option<String>,
}

impl ParseOutput {
    fn failed(input: String, error: impl ToString) -> Self {
        Self {
            input,
            record: None,
            outcome: None,
            error: Some(error.to_string()),
        }
    }
}

type Pipeline = AddressPipeline<KeywordTagger, Box<dyn DirectoryLookup>>;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let file = File::open(path).with_context(|| format!("cannot open config {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(path = %path.display(), "loaded pipeline config");
    Ok(config)
}

fn db_path(cli: &Cli) -> PathBuf {
    cli.db.clone().unwrap_or_else(default_db_path)
}

fn open_directory(cli: &Cli) -> Result<Box<dyn DirectoryLookup>> {
    Ok(match cli.directory {
        Backend::Http => {
            let config = HttpDirectoryConfig::new()
                .with_endpoint(cli.directory_url.clone())
                .with_timeout_secs(cli.timeout_secs);
            Box::new(PosIndonesiaDirectory::new(config).context("cannot build HTTP client")?)
        }
        Backend::Sqlite => {
            let path = db_path(cli);
            Box::new(
                SqliteDirectory::open(&path)
                    .with_context(|| format!("cannot open region store {}", path.display()))?,
            )
        }
        Backend::Disabled => Box::new(NoDirectory),
    })
}

fn build_pipeline(cli: &Cli, reconcile: bool) -> Result<Pipeline> {
    let config = load_config(cli.config.as_deref())?;
    let directory: Box<dyn DirectoryLookup> = if reconcile {
        open_directory(cli)?
    } else {
        Box::new(NoDirectory)
    };
    Ok(AddressPipeline::new(config, KeywordTagger::new()?, directory))
}

fn parse_one(pipeline: &Pipeline, input: &str, reconcile: bool) -> ParseOutput {
    let input = input.to_string();
    let extracted = if reconcile {
        pipeline
            .process_with_outcome(&input)
            .map(|(record, outcome)| (record, Some(outcome)))
    } else {
        pipeline.extract(&input).map(|record| (record, None))
    };
    match extracted {
        Ok((record, outcome)) => ParseOutput {
            input,
            record: Some(record),
            outcome,
            error: None,
        },
        Err(e) => ParseOutput::failed(input, e),
    }
}

fn emit<W: Write>(out: &mut W, output: &ParseOutput) -> Result<()> {
    serde_json::to_writer(&mut *out, output)?;
    writeln!(out)?;
    Ok(())
}

fn run_parse(cli: &Cli, addresses: &[String], reconcile: bool) -> Result<()> {
    let pipeline = build_pipeline(cli, reconcile)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if addresses.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            emit(&mut out, &parse_one(&pipeline, line, reconcile))?;
        }
    } else {
        for address in addresses {
            emit(&mut out, &parse_one(&pipeline, address, reconcile))?;
        }
    }
    Ok(())
}

fn run_tagged(cli: &Cli, file: &Path, reconcile: bool) -> Result<()> {
    let pipeline = build_pipeline(cli, reconcile)?;
    let addresses = bio::load_bio_file(file)?;
    info!(count = addresses.len(), "loaded tagged addresses");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for address in &addresses {
        let input = address.text();
        let output = match pipeline.aggregate_labels(address.pairs()) {
            Ok(record) if reconcile => {
                let (record, outcome) = pipeline.reconcile(record);
                ParseOutput {
                    input,
                    record: Some(record),
                    outcome: Some(outcome),
                    error: None,
                }
            }
            Ok(record) => ParseOutput {
                input,
                record: Some(record),
                outcome: None,
                error: None,
            },
            Err(e) => ParseOutput::failed(input, e),
        };
        emit(&mut out, &output)?;
    }
    Ok(())
}

fn run_import(cli: &Cli, file: &Path) -> Result<()> {
    let path = db_path(cli);
    let mut store = SqliteDirectory::open(&path)
        .with_context(|| format!("cannot open region store {}", path.display()))?;
    let reader = BufReader::new(
        File::open(file).with_context(|| format!("cannot open {}", file.display()))?,
    );
    let written = store
        .import_json(reader)
        .with_context(|| format!("cannot import {}", file.display()))?;
    println!(
        "Imported {} records into {} ({} total)",
        written,
        path.display(),
        store.len()?
    );
    Ok(())
}

fn run_lookup(cli: &Cli, key: &str) -> Result<()> {
    let directory = open_directory(cli)?;
    let candidates = directory
        .lookup(key)
        .with_context(|| format!("lookup of {key:?} failed"))?;
    if candidates.is_empty() {
        eprintln!("No candidates for {key:?}");
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for candidate in &candidates {
        serde_json::to_writer(&mut out, candidate)?;
        writeln!(out)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Parse {
            addresses,
            no_reconcile,
        } => run_parse(&cli, addresses, !no_reconcile),
        Commands::Tagged { file, no_reconcile } => run_tagged(&cli, file, !no_reconcile),
        Commands::Import { file } => run_import(&cli, file),
        Commands::Lookup { key } => run_lookup(&cli, key),
    }
}
