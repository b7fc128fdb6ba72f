//! dimscrub CLI - inspection report value rewriter

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dimscrub::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

#[derive(Parser)]
#[command(name = "dimscrub")]
#[command(
    author,
    version,
    about = "Rewrite inspection report measurements while keeping every pass/fail verdict"
)]
struct Cli {
    /// Increase log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a report and save the result
    Rewrite {
        /// Input workbook (xlsx, xlsm)
        input: PathBuf,

        /// Output workbook (default: <input>_scrubbed.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Run the rewrite in memory and report what it would change
    Inspect {
        /// Input workbook (xlsx, xlsm)
        input: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Columns holding measurements, as letters or 1-based numbers
    #[arg(short, long, default_value = "E,F,G")]
    columns: String,

    /// Column holding the feature description
    #[arg(long, default_value = "B")]
    description_column: String,

    /// Column holding the upper tolerance
    #[arg(long, default_value = "C")]
    upper_column: String,

    /// Column holding the lower tolerance
    #[arg(long, default_value = "D")]
    lower_column: String,

    /// Keep the tolerance window from one sheet to the next
    #[arg(long)]
    carry_window: bool,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print statistics as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn options(&self) -> Result<ScrubOptions> {
        let column = |flag: &str, value: &str| {
            ScrubOptions::parse_column(value).with_context(|| format!("Invalid --{} '{}'", flag, value))
        };

        Ok(ScrubOptions::default()
            .with_description_column(column("description-column", &self.description_column)?)
            .with_upper_column(column("upper-column", &self.upper_column)?)
            .with_lower_column(column("lower-column", &self.lower_column)?)
            .with_target_columns(
                ScrubOptions::parse_columns(&self.columns)
                    .with_context(|| format!("Invalid --columns '{}'", self.columns))?,
            )
            .with_reset_window_per_sheet(!self.carry_window))
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn report(&self, stats: &ProcessingStats) -> Result<()> {
        if self.json {
            let json = serde_json::to_string_pretty(stats).context("Failed to encode statistics")?;
            println!("{}", json);
        } else {
            eprintln!("{}", stats);
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Rewrite { input, output, run } => rewrite(&input, output, &run),
        Commands::Inspect { input, run } => inspect(&input, &run),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn rewrite(input: &Path, output: Option<PathBuf>, run: &RunArgs) -> Result<()> {
    check_extension(input)?;
    let output = match output {
        Some(path) => path,
        None => default_output(input)?,
    };
    if same_file(input, &output) {
        bail!("Refusing to overwrite the input file '{}'", input.display());
    }

    let options = run.options()?;
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read '{}'", input.display()))?;
    let (rewritten, stats) = process_with_rng(&bytes, &options, &mut run.rng())
        .with_context(|| format!("Failed to rewrite '{}'", input.display()))?;
    std::fs::write(&output, rewritten)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    tracing::info!(output = %output.display(), "saved");
    run.report(&stats)?;
    if !run.json {
        eprintln!("Saved {}", output.display());
    }
    Ok(())
}

fn inspect(input: &Path, run: &RunArgs) -> Result<()> {
    check_extension(input)?;
    let options = run.options()?;

    let mut document = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let stats = scrub_workbook(document.workbook_mut(), &options, &mut run.rng())
        .with_context(|| format!("Failed to scrub '{}'", input.display()))?;

    run.report(&stats)
}

fn check_extension(path: &Path) -> Result<()> {
    match extension(path).as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(()),
        _ => bail!(
            "Unsupported file format: {} (expected .xlsx or .xlsm)",
            path.display()
        ),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// `<dir>/<stem>_scrubbed.<ext>`
fn default_output(input: &Path) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Cannot derive an output name from '{}'", input.display()))?;
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("xlsx");
    Ok(input.with_file_name(format!("{}_scrubbed.{}", stem, ext)))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
