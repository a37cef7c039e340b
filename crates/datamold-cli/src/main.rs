mod config;
mod files;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use datamold_core::{IssueSeverity, ValidationReport};
use datamold_generate::{
    DataGenerator, GeneratedObject, GenerationError, GeneratorRegistry, LocaleKey,
};
use thiserror::Error;
use uuid::Uuid;

use config::{CliConfig, ConfigError, init_logging, load_config};
use files::{FileError, read_schema, write_output};

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("file error: {0}")]
    Files(#[from] FileError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema is invalid: {0} error(s)")]
    InvalidSchema(usize),
}

#[derive(Parser, Debug)]
#[command(name = "datamold", version, about = "Schema-driven synthetic data generator")]
struct Cli {
    /// TOML config file (defaults to ./datamold.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate records from a schema.
    Generate(GenerateArgs),
    /// Check a schema without generating anything.
    Validate(ValidateArgs),
    /// List the registered type tags.
    Types,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Schema file, or `-` for stdin.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
    /// Number of records; more than one is written as a JSON array.
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// Output file, written atomically. Defaults to stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
    /// Pretty-print the JSON output.
    #[arg(long, default_value_t = false)]
    pretty: bool,
    /// Content locale (en_US or pt_BR); overrides the config file.
    #[arg(long)]
    locale: Option<LocaleKey>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Schema file, or `-` for stdin.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging)?;

    match cli.command {
        Command::Generate(args) => run_generate(args, config),
        Command::Validate(args) => run_validate(args, config),
        Command::Types => run_types(),
    }
}

fn run_generate(args: GenerateArgs, config: CliConfig) -> Result<(), CliError> {
    let run_id = Uuid::new_v4();
    let timer = Instant::now();
    tracing::info!(event = "run_started", run_id = %run_id, command = "generate");

    let mut settings = config.generation;
    if let Some(locale) = args.locale {
        settings.locale = locale;
    }

    let text = read_schema(&args.schema)?;
    let generator = DataGenerator::with_settings(text, settings)?;
    let records = generator.generate_batch(args.count, args.seed)?;
    let rendered = render_records(&records, args.pretty)?;
    write_output(args.out.as_deref(), rendered.as_bytes())?;

    if let Some(out) = &args.out {
        tracing::info!(event = "output_written", path = %out.display());
    }
    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        status = "success",
        records = records.len(),
        duration_ms = timer.elapsed().as_millis()
    );
    Ok(())
}

fn run_validate(args: ValidateArgs, config: CliConfig) -> Result<(), CliError> {
    let text = read_schema(&args.schema)?;
    let generator = DataGenerator::with_settings(text, config.generation)?;
    let report = generator.validate();

    let rendered = if args.json {
        let mut json = serde_json::to_string_pretty(&report)?;
        json.push('\n');
        json
    } else {
        render_report(&report)
    };
    write_output(None, rendered.as_bytes())?;

    if report.is_ok() {
        Ok(())
    } else {
        Err(CliError::InvalidSchema(report.errors.len()))
    }
}

fn run_types() -> Result<(), CliError> {
    let registry = GeneratorRegistry::shared();
    let mut listing = String::new();
    for id in registry.generator_ids() {
        listing.push_str(id);
        listing.push('\n');
    }
    write_output(None, listing.as_bytes())?;
    Ok(())
}

/// A single record is written as an object, anything else as an array.
fn render_records(records: &[GeneratedObject], pretty: bool) -> serde_json::Result<String> {
    let mut rendered = match (records, pretty) {
        ([record], true) => serde_json::to_string_pretty(record)?,
        ([record], false) => serde_json::to_string(record)?,
        (_, true) => serde_json::to_string_pretty(records)?,
        (_, false) => serde_json::to_string(records)?,
    };
    rendered.push('\n');
    Ok(rendered)
}

fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    for issue in report.issues() {
        let label = match issue.severity {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        };
        let path = if issue.path.is_empty() { "/" } else { issue.path.as_str() };
        out.push_str(&format!("{label}[{}] {path}: {}\n", issue.code, issue.message));
    }
    out.push_str(&format!(
        "{} error(s), {} warning(s)\n",
        report.errors.len(),
        report.warnings.len()
    ));
    out
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use datamold_core::ValidationIssue;
    use datamold_generate::GeneratedValue;

    use super::*;

    fn record(id: i64) -> GeneratedObject {
        let mut object = GeneratedObject::new();
        object.insert("id".to_string(), GeneratedValue::Int(id));
        object
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "datamold", "generate", "--schema", "-", "--count", "3", "--seed", "7", "--locale",
            "pt_BR", "--pretty",
        ])
        .expect("parse args");
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.schema, PathBuf::from("-"));
        assert_eq!(args.count, 3);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.locale, Some(LocaleKey::PtBr));
        assert!(args.pretty);
        assert!(args.out.is_none());
    }

    #[test]
    fn unknown_locale_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "datamold", "generate", "--schema", "s.json", "--locale", "xx_XX",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn single_record_renders_as_object() {
        let rendered = render_records(&[record(1)], false).expect("render");
        assert_eq!(rendered, "{\"id\":1}\n");
    }

    #[test]
    fn many_or_zero_records_render_as_array() {
        let rendered = render_records(&[record(1), record(2)], false).expect("render");
        assert_eq!(rendered, "[{\"id\":1},{\"id\":2}]\n");
        assert_eq!(render_records(&[], false).expect("render"), "[]\n");
    }

    #[test]
    fn report_lists_errors_then_warnings() {
        let mut report = ValidationReport::default();
        report.push(ValidationIssue::warning("unknown_constraint", "/a/x", "ignored"));
        report.push(ValidationIssue::error("unknown_generator_type", "/b", "not registered"));
        let rendered = render_report(&report);
        assert_eq!(
            rendered,
            "error[unknown_generator_type] /b: not registered\n\
             warning[unknown_constraint] /a/x: ignored\n\
             1 error(s), 1 warning(s)\n"
        );
    }
}
