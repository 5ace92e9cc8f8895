//! # hl7-cli
//!
//! Command-line interface for tidying HL7 v2 message segments.
//!
//! Reads message files, runs the tidy pipeline described by a YAML config
//! and writes the resulting table as CSV or JSON.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use hl7_adapter_csv::{CsvConfig, NullRepresentation, RecordTerminator, TableWriter};
use hl7_adapter_v2::{extract_wrapped, parse_messages, split_messages};
use hl7_ir::{Location, TidyTable};
use hl7_pipeline::{TidyConfig, dedupe_messages};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const EXIT_PROCESSING: u8 = 1;
const EXIT_CONFIG: u8 = 3;

#[derive(Parser)]
#[command(name = "hl7-tidy")]
#[command(about = "Tidy HL7 v2 message segments into a row-per-segment table")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tidy table for the locations in a config file
    Tidy {
        /// Message files; each may hold several messages
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// YAML config naming identity and report locations
        #[arg(short, long)]
        config: PathBuf,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// Read messages wrapped in <TAG>...</TAG> elements
        #[arg(long, value_name = "TAG")]
        wrapped: Option<String>,

        /// CSV field delimiter
        #[arg(long, default_value_t = ',')]
        delimiter: char,

        /// CSV quote character
        #[arg(long, default_value_t = '"')]
        quote: char,

        /// End CSV records with CRLF instead of LF
        #[arg(long)]
        crlf: bool,

        /// Text written for missing CSV values
        #[arg(long, value_name = "TEXT")]
        null: Option<String>,

        /// Omit the CSV header row
        #[arg(long)]
        no_header: bool,
    },

    /// Print the per-message outcomes of one location as JSON
    Extract {
        /// Location such as PID.3.1 or MSH.7
        location: String,

        /// Message files; each may hold several messages
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Read messages wrapped in <TAG>...</TAG> elements
        #[arg(long, value_name = "TAG")]
        wrapped: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

/// A failed command, classified for the process exit code
#[derive(Debug)]
enum Failure {
    Config(anyhow::Error),
    Processing(anyhow::Error),
}

impl Failure {
    fn config(error: impl Into<anyhow::Error>) -> Self {
        Self::Config(error.into())
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Processing(_) => EXIT_PROCESSING,
        }
    }

    fn error(&self) -> &anyhow::Error {
        match self {
            Self::Config(error) | Self::Processing(error) => error,
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        Self::Processing(error)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("ERROR: {:#}", failure.error());
            ExitCode::from(failure.exit_code())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), Failure> {
    match command {
        Commands::Tidy {
            inputs,
            config,
            output,
            format,
            wrapped,
            delimiter,
            quote,
            crlf,
            null,
            no_header,
        } => {
            tracing::info!("Tidying {} file(s) with {}", inputs.len(), config.display());
            let tidy = TidyConfig::from_path(&config).map_err(Failure::config)?;

            let mut csv = CsvConfig::new()
                .delimiter(delimiter)
                .quote_char(quote)
                .has_header(!no_header);
            if crlf {
                csv = csv.record_terminator(RecordTerminator::CRLF);
            }
            if let Some(text) = null {
                csv = csv.null_representation(NullRepresentation::Custom(text));
            }
            // Reject unusable CSV characters before reading any input
            csv.delimiter_u8().map_err(Failure::config)?;
            csv.quote_char_u8().map_err(Failure::config)?;

            let messages = read_messages(&inputs, wrapped.as_deref())?;
            let output_run = tidy
                .build_pipeline()
                .run(&tidy.identity, &tidy.report, &messages)
                .context("Tidy pipeline failed")?;
            tracing::info!(
                rows = output_run.stats.rows_out,
                pruned = output_run.stats.rows_pruned,
                "Pipeline finished"
            );

            write_table(&output_run.table, output.as_deref(), format, csv)?;
            Ok(())
        }
        Commands::Extract {
            location,
            inputs,
            wrapped,
        } => {
            let location = Location::parse(&location).map_err(Failure::config)?;
            let messages = read_messages(&inputs, wrapped.as_deref())?;
            let unique = dedupe_messages(&messages);
            let results = parse_messages(&location, &unique).context("Extraction failed")?;

            let report: Vec<_> = results
                .iter()
                .enumerate()
                .map(|(message, outcomes)| json!({ "message": message, "outcomes": outcomes }))
                .collect();
            let rendered = serde_json::to_string_pretty(&json!({
                "location": location.text(),
                "messages": report,
            }))
            .context("Failed to render JSON")?;

            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").context("Failed to write to stdout")?;
            Ok(())
        }
    }
}

/// Read and split every input file, in argument order
fn read_messages(inputs: &[PathBuf], wrapped: Option<&str>) -> anyhow::Result<Vec<String>> {
    let mut messages = Vec::new();
    for path in inputs {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let found = match wrapped {
            Some(tag) => extract_wrapped(&text, tag),
            None => split_messages(&text),
        }
        .with_context(|| format!("Failed to split messages in {}", path.display()))?;

        if found.is_empty() {
            tracing::warn!(path = %path.display(), "No messages found in input");
        }
        messages.extend(found);
    }
    tracing::debug!(files = inputs.len(), messages = messages.len(), "Read messages");
    Ok(messages)
}

fn write_table(
    table: &TidyTable,
    output: Option<&Path>,
    format: OutputFormat,
    csv: CsvConfig,
) -> anyhow::Result<()> {
    let mut sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match format {
        OutputFormat::Csv => TableWriter::new()
            .with_config(csv)
            .write(&mut sink, table)
            .context("Failed to write CSV")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut sink, table).context("Failed to write JSON")?;
            writeln!(sink).context("Failed to write JSON")?;
        }
    }
    sink.flush().context("Failed to flush output")?;
    Ok(())
}
