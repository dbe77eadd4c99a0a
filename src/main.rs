//! rideplan - command line entry point.
//!
//! Converts a plan CSV into one workout file per row.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueHint};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rideplan::config::load_config;
use rideplan::convert::write_outputs;
use rideplan::workouts::RangeMode;
use rideplan::{Converter, OutputFormat, PlanTable};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a training plan CSV into trainer workouts", long_about = None)]
struct Cli {
    /// CSV file containing the plan
    #[arg(long, value_hint = ValueHint::FilePath)]
    csv: PathBuf,

    /// Directory the workout files are written to
    #[arg(short, long, default_value = ".", value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,

    /// Output format (zwo, mrc, json)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Prefix given to every workout name
    #[arg(long)]
    prefix: Option<String>,

    /// Field-test power the plan's zones refer to (watts)
    #[arg(long)]
    cts_power: Option<u16>,

    /// FTP set on the training platform (watts)
    #[arg(long)]
    ftp: Option<u16>,

    /// Point inside a zone's range to target (0.0 = low, 1.0 = high)
    #[arg(long, value_parser = parse_position)]
    midpoint: Option<f32>,

    /// Keep power ranges when the format supports them
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "midpoint")]
    native_ranges: bool,

    /// Always write unrolled segments
    #[arg(long, action = ArgAction::SetTrue)]
    flat: bool,

    /// Configuration file (TOML)
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
}

/// Parse a range position in `0.0..=1.0`.
fn parse_position(value: &str) -> Result<f32, String> {
    let position: f32 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=1.0).contains(&position) {
        Ok(position)
    } else {
        Err(format!("`{value}` is not within 0.0..=1.0"))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(cli.config.as_deref())?;

    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(prefix) = cli.prefix {
        config.output.prefix = prefix;
    }
    if cli.cts_power.is_some() {
        config.power.field_test_power = cli.cts_power;
    }
    if cli.ftp.is_some() {
        config.power.reference_ftp = cli.ftp;
    }
    if let Some(position) = cli.midpoint {
        config.builder.range_mode = RangeMode::Point { position };
    }
    if cli.native_ranges {
        config.builder.range_mode = RangeMode::Native;
    }
    if cli.flat {
        config.output.flat = true;
    }
    config.validate()?;

    tracing::info!(
        "Starting rideplan v{} ({} output)",
        env!("CARGO_PKG_VERSION"),
        config.output.format
    );

    let table = PlanTable::from_path(&cli.csv)?;
    let intensities = config.intensity_table();
    let report = Converter::new(&intensities, &config).convert_table(&table);

    let written = write_outputs(&report.workouts, &cli.output_dir)?;
    tracing::info!(
        "Wrote {} workouts to {}",
        written.len(),
        cli.output_dir.display()
    );

    for failure in &report.failures {
        eprintln!("error: {failure}");
    }

    Ok(if report.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
