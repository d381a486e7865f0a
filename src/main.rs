//! stomp - bind command-line tokens to a JSON-described option table.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use stomp::{render_env, render_json, TableConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Bind command-line tokens to typed option slots.
#[derive(Parser, Debug)]
#[command(name = "stomp", version, about, disable_help_subcommand = true)]
struct Cli {
    /// Log binding decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the option table comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct TableSource {
    /// JSON option table
    #[arg(long, env = "STOMP_TABLE")]
    table: Option<String>,

    /// Path to a JSON option table
    #[arg(long)]
    table_file: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// A JSON object of bound values
    Json,
    /// Shell export statements
    Env,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bind arguments against a table and print the resulting values
    Parse {
        #[command(flatten)]
        source: TableSource,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Shell variable prefix for env output (overrides the table)
        #[arg(long)]
        prefix: Option<String>,

        /// First argument index to match (inclusive)
        #[arg(long)]
        start: Option<usize>,

        /// Last argument index to match (exclusive)
        #[arg(long)]
        end: Option<usize>,

        /// Arguments to bind
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Check a table for naming problems and invalid defaults
    Check {
        #[command(flatten)]
        source: TableSource,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("STOMP_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_table(source: &TableSource) -> Result<TableConfig> {
    match (&source.table, &source.table_file) {
        (Some(json), _) => TableConfig::from_json(json).context("failed to parse table JSON"),
        (None, Some(path)) => read_table_file(path),
        (None, None) => bail!("either --table or --table-file is required"),
    }
}

fn read_table_file(path: &Path) -> Result<TableConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read table file {}", path.display()))?;
    TableConfig::from_json(&json)
        .with_context(|| format!("failed to parse table file {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            source,
            format,
            prefix,
            start,
            end,
            args,
        } => {
            let cfg = load_table(&source)?;
            let (table, mut store) = cfg.build().context("invalid option table")?;

            let range = start.unwrap_or(0)..end.unwrap_or(args.len());
            debug!(options = table.len(), ?range, "binding arguments");
            table
                .parse_range(&mut store, &args, range)
                .context("failed to bind arguments")?;

            match format {
                OutputFormat::Json => println!("{}", render_json(&store)?),
                OutputFormat::Env => {
                    let effective_prefix = prefix.as_deref().unwrap_or_else(|| cfg.effective_prefix());
                    print!("{}", render_env(&store, effective_prefix));
                }
            }
        }
        Commands::Check { source } => {
            let cfg = load_table(&source)?;
            cfg.validate().context("invalid option table")?;
            println!("ok: {} options", cfg.options.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    const TABLE: &str = r#"{"options":[{"name":"first","type":"string","required":true}]}"#;

    #[test]
    fn test_parse_subcommand_parses_table() {
        let cli = Cli::try_parse_from(["stomp", "parse", "--table", TABLE, "--"]).unwrap();

        match cli.command {
            Commands::Parse {
                source,
                format,
                prefix,
                start,
                end,
                args,
            } => {
                assert_eq!(source.table.as_deref(), Some(TABLE));
                assert!(source.table_file.is_none());
                assert_eq!(format, OutputFormat::Json);
                assert!(prefix.is_none());
                assert!(start.is_none());
                assert!(end.is_none());
                assert!(args.is_empty());
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_parse_subcommand_parses_args() {
        let cli = Cli::try_parse_from([
            "stomp", "parse", "--table", TABLE, "--format", "env", "--start", "1", "--", "sub",
            "--first", "x",
        ])
        .unwrap();

        match cli.command {
            Commands::Parse {
                format, start, args, ..
            } => {
                assert_eq!(format, OutputFormat::Env);
                assert_eq!(start, Some(1));
                assert_eq!(args, vec!["sub", "--first", "x"]);
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_parse_subcommand_requires_table() {
        let result = Cli::try_parse_from(["stomp", "parse", "--"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_table_and_table_file_conflict() {
        let result = Cli::try_parse_from([
            "stomp",
            "check",
            "--table",
            TABLE,
            "--table-file",
            "table.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["stomp", "check", "--table", TABLE, "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_requires_subcommand() {
        let result = Cli::try_parse_from(["stomp"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_load_table_inline() {
        let source = TableSource {
            table: Some(TABLE.to_string()),
            table_file: None,
        };
        let cfg = load_table(&source).unwrap();
        assert_eq!(cfg.options.len(), 1);
    }

    #[test]
    fn test_load_table_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();

        let source = TableSource {
            table: None,
            table_file: Some(file.path().to_path_buf()),
        };
        let cfg = load_table(&source).unwrap();
        assert_eq!(cfg.options[0].name, "first");
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = TableSource {
            table: None,
            table_file: Some(dir.path().join("missing.json")),
        };
        let err = load_table(&source).unwrap_err();
        assert!(err.to_string().contains("failed to read table file"));
    }

    #[test]
    fn test_load_table_invalid_json() {
        let source = TableSource {
            table: Some("{not json".to_string()),
            table_file: None,
        };
        assert!(load_table(&source).is_err());
    }
}
