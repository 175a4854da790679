//! signoff CLI - Cleaning Sign-off Sheet Generator
//!
//! Command-line interface for generating monthly sign-off workbooks and
//! populating them from task completion data.

mod exit_code;
mod pipeline;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use signoff_core::{ReportPeriod, ReportType, RoomAliases, TaxonomyIndex};
use signoff_parser::{
    load_raw_entries, load_taxonomy, process_entries, write_default_configs, write_snapshot,
    UserDirectory,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::exit_code::ExitCode;
use crate::pipeline::{load_completion_data, run_batch, PipelineConfig};

#[derive(Parser)]
#[command(name = "signoff")]
#[command(author, version, about = "Cleaning sign-off sheet generator", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sign-off workbooks for one month
    Generate {
        /// Month to generate (1-12); defaults to the previous month
        #[arg(long, requires = "year")]
        month: Option<u32>,

        /// Year to generate; defaults to the previous month's year
        #[arg(long, requires = "month")]
        year: Option<i32>,

        /// Report type to generate
        #[arg(short, long, value_enum, default_value = "all")]
        config: ConfigChoice,

        /// Completion CSV to use instead of the latest snapshot
        #[arg(long, value_name = "FILE")]
        records: Option<PathBuf>,

        /// Directory holding the taxonomy documents
        #[arg(long, default_value = "configs", env = "SIGNOFF_CONFIG_DIR")]
        config_dir: PathBuf,

        /// Directory holding processed task snapshots
        #[arg(long, default_value = "data/processed", env = "SIGNOFF_DATA_DIR")]
        data_dir: PathBuf,

        /// Directory for generated workbooks
        #[arg(long, default_value = "data/signoff_sheets", env = "SIGNOFF_OUTPUT_DIR")]
        output_dir: PathBuf,

        /// Directory for unmatched-record review files
        #[arg(long, default_value = "data/review", env = "SIGNOFF_REVIEW_DIR")]
        review_dir: PathBuf,
    },

    /// Write the default taxonomy documents
    InitConfigs {
        /// Target directory
        #[arg(long, default_value = "configs")]
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Parse and validate a taxonomy document
    CheckConfig {
        /// Taxonomy document path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Turn raw task exports into a processed snapshot
    Process {
        /// Directory of raw JSON task pages
        #[arg(long, default_value = "data/raw_tasks")]
        raw_dir: PathBuf,

        /// Users listing: a JSON array of `{"user": {"_id": ..., "fullName": ...}}`
        #[arg(long, value_name = "FILE")]
        users: Option<PathBuf>,

        /// Directory receiving the snapshot
        #[arg(long, default_value = "data/processed", env = "SIGNOFF_DATA_DIR")]
        data_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConfigChoice {
    Production,
    Warehouse,
    Idf,
    All,
}

impl ConfigChoice {
    fn report_types(self) -> Vec<ReportType> {
        match self {
            ConfigChoice::Production => vec![ReportType::Production],
            ConfigChoice::Warehouse => vec![ReportType::Warehouse],
            ConfigChoice::Idf => vec![ReportType::Idf],
            ConfigChoice::All => ReportType::ALL.to_vec(),
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::Failure.into()
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Generate {
            month,
            year,
            config,
            records,
            config_dir,
            data_dir,
            output_dir,
            review_dir,
        } => {
            let period = match (year, month) {
                (Some(year), Some(month)) => ReportPeriod::new(year, month)?,
                _ => ReportPeriod::previous(Local::now().date_naive()),
            };
            let pipeline = PipelineConfig {
                config_dir,
                data_dir,
                output_dir,
                review_dir,
                ..PipelineConfig::default()
            };
            cmd_generate(&pipeline, period, &config.report_types(), records.as_deref())
        }
        Commands::InitConfigs { dir, force } => cmd_init_configs(&dir, force),
        Commands::CheckConfig { file } => cmd_check_config(&file),
        Commands::Process {
            raw_dir,
            users,
            data_dir,
        } => cmd_process(&raw_dir, users.as_deref(), &data_dir),
    }
}

fn cmd_generate(
    config: &PipelineConfig,
    period: ReportPeriod,
    types: &[ReportType],
    records: Option<&Path>,
) -> Result<ExitCode> {
    info!(%period, types = types.len(), "generating sign-off sheets");
    let data = load_completion_data(config, period, records);

    let mut stdout = std::io::stdout().lock();
    let outcome = run_batch(config, period, types, &data, &mut stdout)?;

    println!();
    println!(
        "Generated {} of {} workbooks for {period}",
        outcome.summaries.len(),
        types.len()
    );
    Ok(ExitCode::from_failure_count(outcome.failure_count()))
}

fn cmd_init_configs(dir: &Path, force: bool) -> Result<ExitCode> {
    let written = write_default_configs(dir, force)?;
    if written.is_empty() {
        println!("All taxonomy documents already exist in {} (use --force to overwrite)", dir.display());
    }
    for path in &written {
        println!("Wrote {}", path.display());
    }
    Ok(ExitCode::Success)
}

fn cmd_check_config(file: &Path) -> Result<ExitCode> {
    let taxonomy = load_taxonomy(file)?;
    let index = TaxonomyIndex::build(&taxonomy)
        .with_context(|| format!("indexing {}", file.display()))?;

    println!("{}: {} layout", file.display(), index.layout().as_str());
    for sheet in index.sheets() {
        let frequencies: Vec<&str> = sheet.frequencies().map(|(_, f)| f.name.as_str()).collect();
        println!(
            "  {}: {} columns ({})",
            sheet.name,
            sheet.last_column() - 1,
            frequencies.join(", ")
        );
    }
    println!("{} room labels indexed", index.len());
    Ok(ExitCode::Success)
}

fn cmd_process(raw_dir: &Path, users: Option<&Path>, data_dir: &Path) -> Result<ExitCode> {
    let users = match users {
        Some(path) => UserDirectory::load(path)?,
        None => UserDirectory::new(),
    };
    let entries = load_raw_entries(raw_dir)?;
    let rows = process_entries(&entries, &users, &RoomAliases::default());
    info!(raw = entries.len(), rows = rows.len(), "entries processed");

    let path = write_snapshot(data_dir, &rows, Local::now().naive_local())?;
    println!("Processed {} of {} entries into {}", rows.len(), entries.len(), path.display());
    Ok(ExitCode::Success)
}
