use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use fitwrapped::config::AppConfig;
use fitwrapped::error::{ErrorSeverity, WrappedError};
use fitwrapped::export::{self, text, ExportFormat};
use fitwrapped::hr_check::check_heart_rates;
use fitwrapped::import::wellness::import_wellness_file;
use fitwrapped::import::{ActivityBatch, ImportManager};
use fitwrapped::logging::{init_logging, LogFormat};
use fitwrapped::year_stats::YearStatsCalculator;

/// fitwrapped - your year in sport
///
/// Turns an activity export (CSV spreadsheet or activity JSON dump) and optional
/// wellness samples into a year-in-review summary: totals, records, patterns,
/// insights and badges.
#[derive(Parser)]
#[command(name = "fitwrapped")]
#[command(author = "fitwrapped Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Fitness year-in-review CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the year in review
    Analyze {
        /// Activity files or directories (CSV, JSON)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Wellness samples (JSON)
        #[arg(short, long)]
        wellness: Option<PathBuf>,

        /// Year to summarise (default: year of the latest activity)
        #[arg(short, long)]
        year: Option<i32>,

        /// Output format (text, json, csv)
        #[arg(short = 'f', long, default_value = "text")]
        format: ExportFormat,

        /// Write to a file instead of the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compare with the previous year when it has enough activities
        #[arg(long)]
        compare_previous: bool,
    },

    /// List the highest heart-rate readings to spot sensor artifacts
    HrCheck {
        /// Activity files or directories (CSV, JSON)
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Only check activities of this year
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    let mut log_config = config.logging.clone().with_verbosity(cli.verbose);
    if let Some(format) = cli.log_format {
        log_config.format = format;
    }
    init_logging(&log_config)?;

    match cli.command {
        Commands::Analyze {
            input,
            wellness,
            year,
            format,
            output,
            compare_previous,
        } => {
            let batch = import_activities(&config, &input)?;

            let wellness = match wellness {
                Some(path) => Some(import_wellness_file(&path).map_err(report_error)?),
                None => None,
            };

            let year = year.unwrap_or_else(|| latest_year(&batch));
            let calculator = YearStatsCalculator::with_settings(config.analysis.clone());
            let stats = calculator
                .calculate_batch(&batch, year, wellness.as_ref())
                .map_err(report_error)?;

            let comparison = if compare_previous {
                match calculator.compare_with_previous(&stats, &batch.activities) {
                    Ok(comparison) => Some(comparison),
                    Err(err) if err.is_recoverable() => {
                        eprintln!("{}", err.user_message().dimmed());
                        None
                    }
                    Err(err) => return Err(report_error(err)),
                }
            } else {
                None
            };

            match output {
                Some(path) => {
                    export::export_year(&stats, comparison.as_ref(), format, &path)
                        .map_err(|e| report_error(WrappedError::from(e)))?;
                    println!(
                        "{}",
                        format!("✓ Year {} written to {}", year, path.display()).green()
                    );
                }
                None => match format {
                    ExportFormat::Text => {
                        print!("{}", text::render_report(&stats, comparison.as_ref(), true));
                    }
                    ExportFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&stats)?);
                    }
                    ExportFormat::Csv => {
                        anyhow::bail!("CSV output needs --output <FILE>");
                    }
                },
            }
        }

        Commands::HrCheck { input, year } => {
            let batch = import_activities(&config, &input)?;
            let activities: Vec<_> = match year {
                Some(year) => batch
                    .activities
                    .into_iter()
                    .filter(|a| a.start_time.year() == year)
                    .collect(),
                None => batch.activities,
            };

            let report = check_heart_rates(&activities);
            print!("{}", text::render_heart_rate_report(&report, true));
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config)
                    .context("Failed to serialize configuration")?;
                println!("{}", content);
            }
            ConfigAction::Init { force } => {
                let path = cli.config.unwrap_or_else(AppConfig::default_config_path);
                init_config(&path, force)?;
            }
        },
    }

    Ok(())
}

/// Status lines go to stderr so stdout carries only the report
fn import_activities(config: &AppConfig, input: &[PathBuf]) -> Result<ActivityBatch> {
    eprintln!("{}", "Importing activities...".green().bold());

    let manager = ImportManager::new()
        .with_progress(config.import.show_progress)
        .with_recursion(config.import.recursive);
    let batch = manager.import_paths(input).map_err(report_error)?;

    eprintln!(
        "{}",
        format!(
            "✓ {} activities imported ({} rows skipped, {} unknown types)",
            batch.len(),
            batch.errors.len(),
            batch.unknown_labels.len()
        )
        .green()
    );
    Ok(batch)
}

/// Year of the most recent activity, or the current year for an empty batch
fn latest_year(batch: &ActivityBatch) -> i32 {
    batch
        .activities
        .iter()
        .map(|a| a.start_time)
        .max()
        .map(|start| start.year())
        .unwrap_or_else(|| chrono::Local::now().year())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file {} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let mut config = AppConfig::default();
    config.save_to_file(path)?;
    println!(
        "{}",
        format!("✓ Configuration written to {}", path.display()).green()
    );
    Ok(())
}

/// Log an error at its severity and turn it into a user-facing error
fn report_error(err: WrappedError) -> anyhow::Error {
    match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => tracing::error!(error = %err),
        ErrorSeverity::Warning => tracing::warn!(error = %err),
        ErrorSeverity::Info => tracing::info!(error = %err),
    }
    eprintln!("{}", err.user_message().red());
    anyhow::Error::new(err)
}
