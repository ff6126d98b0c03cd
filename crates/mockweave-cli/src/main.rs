mod logging;
mod output;
mod settings;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use mockweave_core::{
    DatasetSchema, PatternSpec, ValidationReport, build_dependency_report, dataset_json_schema,
    validate_schema,
};
use mockweave_generate::{GenerationEngine, GenerationError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use logging::{LogFormat, init_logging};
use output::write_json;
use settings::load_settings;

#[derive(Debug, Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("{0}")]
    Generation(#[from] GenerationError),
    #[error("schema invalid: {0}")]
    InvalidSchema(ValidationReport),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid output path: {0}")]
    InvalidPath(String),
}

#[derive(Parser, Debug)]
#[command(name = "mockweave", version, about = "Deterministic mock dataset generator")]
struct Cli {
    /// TOML file with a `[generation]` options table.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write JSON output to this file instead of stdout.
    #[arg(long, global = true, value_name = "FILE")]
    out: Option<PathBuf>,
    /// Log format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dataset from a schema file.
    Generate(GenerateArgs),
    /// Generate records from field pattern specs.
    Custom(CustomArgs),
    /// Validate a schema file and print the generation order.
    Validate(ValidateArgs),
    /// Print the JSON Schema of the dataset schema format.
    JsonSchema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Dataset schema (JSON).
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,
    /// Seed in `[0, 2^53 - 1]`.
    #[arg(long, conflicts_with = "seed_text")]
    seed: Option<i64>,
    /// Text hashed into a seed.
    #[arg(long)]
    seed_text: Option<String>,
    /// Locale hint such as `en_US` or `pt_BR`.
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Args, Debug)]
struct CustomArgs {
    /// JSON object mapping field names to pattern specs.
    #[arg(long, value_name = "FILE")]
    patterns: PathBuf,
    /// Number of records, `1..=10000`.
    #[arg(long)]
    count: i64,
    #[arg(long)]
    seed: Option<i64>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Dataset schema (JSON).
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,
}

/// Output of `mockweave validate`.
#[derive(Debug, Serialize)]
struct ValidateOutput {
    valid: bool,
    errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_order: Option<Vec<String>>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let timer = Instant::now();
    let result = run(&cli);
    match &result {
        Ok(()) => tracing::info!(
            duration_ms = timer.elapsed().as_millis() as u64,
            "command finished"
        ),
        Err(err) => tracing::error!(error = %err, "command failed"),
    }
    result
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let out = cli.out.as_deref();
    match &cli.command {
        Command::Generate(args) => run_generate(cli, args, out),
        Command::Custom(args) => run_custom(cli, args, out),
        Command::Validate(args) => run_validate(args, out),
        Command::JsonSchema => write_json(out, &dataset_json_schema()),
    }
}

fn run_generate(cli: &Cli, args: &GenerateArgs, out: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    let schema: DatasetSchema = read_json(&args.schema)?;
    let engine = GenerationEngine::new(settings.generation);

    let result = match &args.seed_text {
        Some(text) => engine.generate_dataset_from_text(&schema, text, args.locale.as_deref())?,
        None => engine.generate_dataset(&schema, args.seed, args.locale.as_deref())?,
    };
    write_json(out, &result)
}

fn run_custom(cli: &Cli, args: &CustomArgs, out: Option<&Path>) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    let patterns: BTreeMap<String, PatternSpec> = read_json(&args.patterns)?;
    let records = GenerationEngine::new(settings.generation).generate_custom(
        args.count,
        &patterns,
        args.seed,
    )?;
    write_json(out, &records)
}

fn run_validate(args: &ValidateArgs, out: Option<&Path>) -> Result<(), CliError> {
    let schema: DatasetSchema = read_json(&args.schema)?;
    let report = validate_schema(&schema);
    let generation_order = if report.is_valid() {
        build_dependency_report(&schema).order
    } else {
        None
    };

    write_json(
        out,
        &ValidateOutput {
            valid: report.is_valid(),
            errors: report.messages(),
            generation_order,
        },
    )?;

    if report.is_valid() {
        Ok(())
    } else {
        Err(CliError::InvalidSchema(report))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
