use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sheetscope_core::{ScanConfig, Scanner};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetscope")]
#[command(about = "Detect the tables of Excel/ODS sheets and trace where their columns come from", long_about = None)]
#[command(version)]
struct Cli {
    /// Excel/ODS files to scan
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Only report this sheet; repeat for several (all sheets are still scanned)
    #[arg(long, value_name = "SHEET")]
    sheet: Vec<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output
    Json,
}

fn load_config(cli: &Cli) -> Result<ScanConfig> {
    let config = if let Some(config_path) = &cli.config {
        ScanConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("sheetscope.toml");
        if default_config_path.exists() {
            ScanConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            ScanConfig::default()
        }
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetscope=info,sheetscope_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let scanner = Scanner::with_config(config);

    let mut failures = 0usize;
    for file in &cli.files {
        let mut tables = match scanner.scan_file(file) {
            Ok(tables) => tables,
            Err(e) => {
                // One unreadable file does not stop the batch
                tracing::error!(file = %file.display(), error = %e, "failed to load workbook");
                failures += 1;
                continue;
            }
        };

        if !cli.sheet.is_empty() {
            tables.sheets.retain(|s| cli.sheet.contains(&s.sheet));
        }

        match cli.format {
            OutputFormat::Human => {
                formatter::print_human(file, &tables, scanner.config().display_rows)
            }
            OutputFormat::Json => formatter::print_json(file, &tables)?,
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }

    Ok(())
}
