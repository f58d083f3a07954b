//! CLI tool to extract rows and columns from delimited text files.
//!
//! Usage:
//!   csvslice --all -c 0,2 -i input.csv
//!   csvslice --rows 100-200 --header -i input.csv -o out.csv
//!   csvslice --from "23/05/2016 11:00:00.000 +0000" --to "23/05/2016 14:00:00.000 +0000" < input.csv
//!
//! Reads stdin and writes stdout unless files are given.

use clap::Parser;
use csvslice::{CsvSink, CsvSource, ExtractError, Options, RunConfig, RunSummary};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Extract a subset of rows (by row number or time window) and columns from
/// a CSV-like file.
///
/// Timestamps use the layout `DD/MM/YYYY HH:MM:SS.mmm +HHMM`.
#[derive(Parser)]
#[command(name = "csvslice", version)]
struct Cli {
    /// Input file (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Field delimiter
    #[arg(short, long, default_value = ",")]
    delimiter: String,

    /// Lines starting with this character are skipped (empty to disable)
    #[arg(long, default_value = "#")]
    comment: String,

    /// Accept records with a varying number of fields
    #[arg(long)]
    loose: bool,

    /// Columns to export, in output order, e.g. 3,0-2
    #[arg(short, long)]
    columns: Option<String>,

    /// Select records by 0-based row number, e.g. 0-99,250
    #[arg(short, long)]
    rows: Option<String>,

    /// Select records by time window, "<start>-<end>"
    #[arg(short, long)]
    time_span: Option<String>,

    /// Start of the time window
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// End of the time window
    #[arg(long, requires = "from")]
    to: Option<String>,

    /// Only look for the timestamp in this column (default: first field that parses)
    #[arg(long)]
    time_column: Option<usize>,

    /// Select every record
    #[arg(short, long)]
    all: bool,

    /// Copy the first record through unfiltered
    #[arg(long)]
    header: bool,

    /// Drop records whose value in this column is blank
    #[arg(short = 'b', long)]
    skip_blank: Option<usize>,

    /// Show paths, selection mode and record counts on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_options(self) -> Options {
        Options {
            input: self.input,
            output: self.output,
            delimiter: self.delimiter,
            comment: self.comment,
            loose: self.loose,
            columns: self.columns,
            rows: self.rows,
            time_span: self.time_span,
            from: self.from,
            to: self.to,
            time_column: self.time_column,
            all: self.all,
            header: self.header,
            skip_blank: self.skip_blank,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_input(config: &RunConfig) -> Result<Box<dyn Read>, ExtractError> {
    match &config.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                ExtractError::Config(format!("cannot open input '{}': {e}", path.display()))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn open_output(config: &RunConfig) -> Result<Box<dyn Write>, ExtractError> {
    match &config.output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(|e| {
                    ExtractError::Config(format!(
                        "cannot create output directory for '{}': {e}",
                        path.display()
                    ))
                })?;
            }
            let file = File::create(path).map_err(|e| {
                ExtractError::Config(format!("cannot create output '{}': {e}", path.display()))
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn run(config: &RunConfig) -> Result<RunSummary, ExtractError> {
    let mut source = CsvSource::new(open_input(config)?, &config.format);
    let mut sink = CsvSink::new(open_output(config)?, &config.format);
    config.extractor.run(&mut source, &mut sink)
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);

    let config = match cli.into_options().validate() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Try 'csvslice --help' for usage.");
            process::exit(1);
        }
    };

    if verbose {
        let show = |p: &Option<PathBuf>, fallback: &str| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| fallback.to_string())
        };
        eprintln!("Input:    {}", show(&config.input, "(stdin)"));
        eprintln!("Output:   {}", show(&config.output, "(stdout)"));
        eprintln!("Mode:     {}", config.extractor.mode().name());
    }

    match run(&config) {
        Ok(summary) => {
            if verbose {
                eprintln!(
                    "Records:  {} in -> {} out ({} blank skipped)",
                    summary.records_read, summary.records_written, summary.blank_skipped
                );
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
