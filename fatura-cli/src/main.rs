use anyhow::{Context, Result, bail};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

mod config;

use fatura_core::ParsedTransaction;
use fatura_ingest::{CsvImportFormat, FORMATS, StatementGrammar, import_csv, import_statement_text};
use fatura_resolve::{MappingSnapshot, enrich_transactions};

#[derive(Parser, Debug)]
#[command(name = "fatura", version, about = "Statement ingestion and normalization")]
struct Cli {
    /// Path to fatura.toml (grammar patterns + description mappings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse extracted credit-card statement text into card sections
    Statement {
        /// Plain-text file produced by PDF text extraction
        file: PathBuf,

        /// Calendar year of the statement (lines carry DD/MM only;
        /// defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Import a bank/card CSV export
    Csv {
        file: PathBuf,

        /// Force a source format instead of header detection
        #[arg(long)]
        format: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    let mappings = cfg.mappings();
    let snapshot = MappingSnapshot::from_mappings(&mappings);

    match cli.command {
        Command::Statement { file, year } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let grammar = StatementGrammar::compile(&cfg.grammar)?;
            let year = year.unwrap_or_else(|| chrono::Local::now().year());

            let outcome =
                import_statement_text(&text, year, &grammar, &file_label(&file));
            let transactions: Vec<ParsedTransaction> = outcome
                .sections
                .into_iter()
                .flat_map(|s| s.transactions)
                .collect();
            print_outcome(&outcome.run, transactions, &snapshot)
        }

        Command::Csv { file, format } => {
            let declared = match format {
                Some(name) => match CsvImportFormat::from_name(&name) {
                    Some(f) => Some(f),
                    None => {
                        let available: Vec<_> =
                            FORMATS.iter().map(|s| s.name).collect();
                        bail!(
                            "unknown format: {} (available: {})",
                            name,
                            available.join(", ")
                        );
                    }
                },
                None => None,
            };
            let bytes =
                fs::read(&file).with_context(|| format!("read {}", file.display()))?;

            let outcome = import_csv(&bytes, declared, &file_label(&file));
            print_outcome(&outcome.run, outcome.transactions, &snapshot)
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_outcome(
    run: &fatura_core::ImportRun,
    transactions: Vec<ParsedTransaction>,
    snapshot: &MappingSnapshot,
) -> Result<()> {
    let report = enrich_transactions(transactions, snapshot);
    let out = json!({
        "run": run,
        "transactions": report.transactions,
        "unmapped": report.unmapped,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
