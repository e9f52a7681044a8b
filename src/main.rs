//! linear-report - daily Linear progress report.
//!
//! Fetches labelled issues from Linear, classifies and ranks them, and writes
//! them into a spreadsheet tab named after today's date.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linear_report::core::{ReportRow, HEADERS};
use linear_report::{
    Config, CredentialType, MemoryWorkbook, ReportPipeline, ReportSettings, SecretValue,
    SecretsManager,
};

/// Daily Linear progress report
#[derive(Parser)]
#[command(name = "linear-report")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Dry run mode - build the report in memory and print it instead of writing
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch issues and write today's sheet (default)
    Run,

    /// Fetch issues and print the report rows without writing anything
    Preview {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = PreviewFormat::Text)]
        format: PreviewFormat,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Manage stored credentials
    Secrets {
        /// Secrets operation
        #[command(subcommand)]
        operation: SecretsOperation,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Output formats for `preview`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PreviewFormat {
    /// Tab separated rows under the header
    Text,
    /// Rows as a JSON array
    Json,
}

/// Credential store operations.
#[derive(Subcommand)]
enum SecretsOperation {
    /// Store a credential in the system keychain
    Set {
        /// Credential name (linear_api_key, spreadsheet_id, sheets_access_token)
        key: String,

        /// Value to store (read from stdin when omitted)
        #[arg(long)]
        value: Option<String>,
    },

    /// Remove a credential from the system keychain
    Delete {
        /// Credential name
        key: String,
    },

    /// Show where each credential is resolved from
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "Failed to load .env file");
        }
    }

    // Handle commands
    match cli.command {
        None | Some(Commands::Run) => {
            cmd_run(cli.config.as_deref(), cli.dry_run)?;
        }
        Some(Commands::Preview { format }) => {
            cmd_preview(cli.config.as_deref(), format)?;
        }
        Some(Commands::Config { path }) => {
            cmd_config(cli.config.as_deref(), path)?;
        }
        Some(Commands::Secrets { operation }) => {
            cmd_secrets(operation)?;
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Load the config file given on the command line, or the default one.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Resolve settings from the config file, environment and keychain.
fn resolve_settings(path: Option<&Path>) -> Result<ReportSettings> {
    let config = load_config(path)?;
    let settings = ReportSettings::resolve(&config, &SecretsManager::new())
        .map_err(linear_report::ReportError::from)?;
    Ok(settings)
}

/// Build and write today's report.
fn cmd_run(config_path: Option<&Path>, dry_run: bool) -> Result<()> {
    let pipeline = ReportPipeline::linear(resolve_settings(config_path)?);
    let rt = tokio::runtime::Runtime::new()?;
    let now = Local::now();

    if dry_run {
        let mut workbook = MemoryWorkbook::new();
        let summary = rt.block_on(pipeline.run(&mut workbook, now))?;

        println!("Dry run - sheet {} ({} row(s)):\n", summary.sheet, summary.write.rows_written);
        if let Some(sheet) = workbook.sheet(&summary.sheet) {
            print!("{}", sheet.to_tsv());
        }
        return Ok(());
    }

    // Fails on a missing destination before anything is fetched
    let mut workbook = pipeline.sheets_workbook()?;
    let summary = rt.block_on(pipeline.run(&mut workbook, now))?;

    println!(
        "Wrote {} row(s) to sheet {}{} ({} fetched, {} excluded)",
        summary.write.rows_written,
        summary.sheet,
        if summary.write.created { " (new)" } else { "" },
        summary.fetched,
        summary.report.dropped
    );

    Ok(())
}

/// Print the report rows without writing anything.
fn cmd_preview(config_path: Option<&Path>, format: PreviewFormat) -> Result<()> {
    let pipeline = ReportPipeline::linear(resolve_settings(config_path)?);
    let rt = tokio::runtime::Runtime::new()?;

    let (_, report) = rt.block_on(pipeline.build(chrono::Utc::now()))?;

    match format {
        PreviewFormat::Json => {
            let json = serde_json::to_string_pretty(&report.rows)?;
            println!("{json}");
        }
        PreviewFormat::Text => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", HEADERS.join("\t"))?;
            for row in &report.rows {
                writeln!(out, "{}", render_row(row))?;
            }
            writeln!(out, "\nTotal: {} row(s), {} excluded", report.rows.len(), report.dropped)?;
        }
    }

    Ok(())
}

fn render_row(row: &ReportRow) -> String {
    row.cells.iter().map(ToString::to_string).collect::<Vec<_>>().join("\t")
}

/// Show configuration.
fn cmd_config(config_path: Option<&Path>, show_path: bool) -> Result<()> {
    if show_path {
        match config_path.map(Path::to_path_buf).or_else(Config::default_path) {
            Some(path) => println!("{}", path.display()),
            None => {
                let global = Config::config_dir()
                    .map(|d| d.join("config.toml").display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                println!("No config file found (defaults in use). Global path: {global}");
            }
        }
        return Ok(());
    }

    let config = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config.redacted())?;
    println!("{toml_str}");
    Ok(())
}

/// Handle credential store commands.
fn cmd_secrets(operation: SecretsOperation) -> Result<()> {
    let manager = SecretsManager::new();

    match operation {
        SecretsOperation::Set { key, value } => {
            let credential: CredentialType = key.parse()?;
            let value = match value {
                Some(value) => value,
                None => {
                    let mut line = String::new();
                    io::stdin().lock().read_line(&mut line).context("Failed to read value")?;
                    line.trim().to_string()
                }
            };
            if value.is_empty() {
                anyhow::bail!("Refusing to store an empty value for {}", credential.key_name());
            }

            manager.store(credential, &SecretValue::new(value))?;
            println!("Stored {} in the system keychain", credential.key_name());
        }
        SecretsOperation::Delete { key } => {
            let credential: CredentialType = key.parse()?;
            manager.delete(credential)?;
            println!("Deleted {} from the system keychain", credential.key_name());
        }
        SecretsOperation::Status => {
            for credential in CredentialType::ALL {
                let source = if std::env::var(credential.env_var())
                    .is_ok_and(|v| !v.trim().is_empty())
                {
                    format!("environment ({})", credential.env_var())
                } else if manager.exists(credential) {
                    "keychain".to_string()
                } else {
                    "not set (config file only)".to_string()
                };
                println!("  {:<22} {}", credential.key_name(), source);
            }
        }
    }

    Ok(())
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "linear-report", &mut io::stdout());
}
