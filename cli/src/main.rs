mod config;

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;
use yaclap_core::{Coerce, ParseResult, ParserConfig, date_time_min, tokenize};

use crate::config::load_config;

/// Output format for `yaclap parse`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

/// Target type for `yaclap coerce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CoerceTarget {
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Bool,
    DateTime,
    Guid,
}

#[derive(Debug, Parser)]
#[command(name = "yaclap")]
#[command(about = "Inspect how command-line tokens are parsed and coerced")]
#[command(version)]
struct Cli {
    /// Print debug logs to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Tokenize arguments and print the parse result.
    Parse(ParseArgs),
    /// Convert a single value the way typed binding does.
    Coerce(CoerceArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Option prefix (default: "--").
    #[arg(long)]
    prefix: Option<String>,
    /// Treat every leading token as a positional argument and require
    /// arguments to precede options.
    #[arg(long)]
    arguments_first: bool,
    /// YAML file with parser settings; flags given here take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Tokens to parse, given after `--`.
    #[arg(last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CoerceArgs {
    /// Target type.
    #[arg(long)]
    to: CoerceTarget,
    /// Value returned when VALUE cannot be converted.
    #[arg(long, allow_hyphen_values = true)]
    default: Option<String>,
    /// Raw value to convert.
    #[arg(allow_hyphen_values = true)]
    value: String,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Coerce(args) => run_coerce(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let config = resolve_config(&args)?;
    debug!(?config, tokens = args.tokens.len(), "parsing tokens");

    let parsed = tokenize(&args.tokens, &config).map_err(|e| e.to_string())?;
    print!("{}", format_parse_result(&parsed, args.format)?);
    Ok(())
}

/// Settings file first, then command-line overrides.
fn resolve_config(args: &ParseArgs) -> Result<ParserConfig, String> {
    let mut config = match &args.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => ParserConfig::default(),
    };
    if let Some(prefix) = &args.prefix {
        config.prefix = prefix.clone();
    }
    if args.arguments_first {
        config.arguments_first = true;
    }
    Ok(config)
}

fn format_parse_result(parsed: &ParseResult, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(parsed)
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("failed to serialize parse result: {e}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(parsed)
            .map_err(|e| format!("failed to serialize parse result: {e}")),
    }
}

fn run_coerce(args: CoerceArgs) -> Result<(), String> {
    let output = coerce_value(&args.value, args.to, args.default.as_deref())?;
    println!("{output}");
    Ok(())
}

fn coerce_value(value: &str, to: CoerceTarget, default: Option<&str>) -> Result<String, String> {
    let output = match to {
        CoerceTarget::Int => value.to_int(parse_default(default, 0)?).to_string(),
        CoerceTarget::Long => value.to_long(parse_default(default, 0)?).to_string(),
        CoerceTarget::Float => value.to_float(parse_default(default, 0.0)?).to_string(),
        CoerceTarget::Double => value.to_double(parse_default(default, 0.0)?).to_string(),
        CoerceTarget::Decimal => value
            .to_decimal(parse_default(default, Decimal::ZERO)?)
            .to_string(),
        CoerceTarget::Bool => {
            if default.is_some() {
                return Err("--default is not supported for bool".to_string());
            }
            value.to_bool().to_string()
        }
        CoerceTarget::DateTime => {
            let default = default.map(parse_date_time_default).transpose()?;
            format_date_time(value.to_date_time(default))
        }
        CoerceTarget::Guid => value
            .to_guid(default.map(parse_default_guid).transpose()?)
            .to_string(),
    };
    debug!(?to, value, %output, "coerced value");
    Ok(output)
}

/// Defaults are parsed strictly; a malformed default is a usage error.
fn parse_default<T>(raw: Option<&str>, fallback: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid --default '{raw}': {e}")),
        None => Ok(fallback),
    }
}

fn parse_default_guid(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|e| format!("invalid --default '{raw}': {e}"))
}

fn parse_date_time_default(raw: &str) -> Result<NaiveDateTime, String> {
    let parsed = raw.to_date_time(None);
    if parsed == date_time_min() && !raw.trim().starts_with("0001") {
        return Err(format!("invalid --default '{raw}': not a recognized date/time"));
    }
    Ok(parsed)
}

fn format_date_time(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(tokens: &[&str]) -> ParseArgs {
        ParseArgs {
            prefix: None,
            arguments_first: false,
            config: None,
            format: CliOutputFormat::Json,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "prefix: \"/\"\narguments_first: false\n").unwrap();

        let mut args = parse_args(&[]);
        args.config = Some(path);
        args.arguments_first = true;
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.prefix, "/");
        assert!(config.arguments_first);

        args.prefix = Some("-".to_string());
        assert_eq!(resolve_config(&args).unwrap().prefix, "-");
    }

    #[test]
    fn test_default_config_without_file() {
        let config = resolve_config(&parse_args(&[])).unwrap();
        assert_eq!(config, ParserConfig::default());
    }

    #[test]
    fn test_format_parse_result_yaml() {
        let parsed = tokenize(["build", "--release"], &ParserConfig::default()).unwrap();
        let yaml = format_parse_result(&parsed, CliOutputFormat::Yaml).unwrap();
        assert!(yaml.contains("command: build"));
        assert!(yaml.contains("release:"));
        let back: ParseResult = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, parsed);
    }

    #[test]
    fn test_coerce_numbers_with_defaults() {
        assert_eq!(coerce_value("42", CoerceTarget::Int, None).unwrap(), "42");
        assert_eq!(coerce_value("abc", CoerceTarget::Int, Some("7")).unwrap(), "7");
        assert_eq!(
            coerce_value("9000000000", CoerceTarget::Long, None).unwrap(),
            "9000000000"
        );
        assert_eq!(coerce_value("x", CoerceTarget::Double, None).unwrap(), "0");
        assert_eq!(
            coerce_value("19.99", CoerceTarget::Decimal, None).unwrap(),
            "19.99"
        );
    }

    #[test]
    fn test_coerce_rejects_malformed_default() {
        let err = coerce_value("1", CoerceTarget::Int, Some("seven")).unwrap_err();
        assert!(err.contains("invalid --default 'seven'"));
        assert!(coerce_value("yes", CoerceTarget::Bool, Some("true")).is_err());
        assert!(coerce_value("x", CoerceTarget::DateTime, Some("later")).is_err());
    }

    #[test]
    fn test_coerce_bool_date_time_and_guid() {
        assert_eq!(coerce_value("YES", CoerceTarget::Bool, None).unwrap(), "true");
        assert_eq!(coerce_value("", CoerceTarget::Bool, None).unwrap(), "false");
        assert_eq!(
            coerce_value("2024-02-29", CoerceTarget::DateTime, None).unwrap(),
            "2024-02-29T00:00:00"
        );
        assert_eq!(
            coerce_value("someday", CoerceTarget::DateTime, None).unwrap(),
            "0001-01-01T00:00:00"
        );
        assert_eq!(
            coerce_value("nope", CoerceTarget::Guid, None).unwrap(),
            "00000000-0000-0000-0000-000000000000"
        );
    }
}
