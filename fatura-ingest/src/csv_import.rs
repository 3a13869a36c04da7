//! CSV import pipeline.
//!
//! Rows parse independently: one malformed row is counted and recorded,
//! never fatal. Only the file's structure (an unrecognized header) fails a
//! run outright, and even that surfaces as a finalized FAILED run rather
//! than an error the caller must catch.

use chrono::NaiveDate;
use csv::ReaderBuilder;
use fatura_core::{ImportKind, ImportRun, ParsedTransaction, RunAggregator};
use log::debug;
use thiserror::Error;

use crate::formats::{CsvImportFormat, FormatSpec, detect_format, signature_matches};

/// Transactions plus the audit record for one CSV import.
#[derive(Debug)]
pub struct CsvImportOutcome {
    pub run: ImportRun,
    pub transactions: Vec<ParsedTransaction>,
}

/// Row-level failures, rendered into the run's error digest.
#[derive(Debug, Error)]
enum RowError {
    #[error("expected {expected} columns, got {got}")]
    ColumnCount { expected: usize, got: usize },
    #[error("invalid date `{0}`")]
    BadDate(String),
    #[error("invalid amount `{0}`")]
    BadAmount(String),
    #[error("empty description")]
    EmptyDescription,
}

/// Import a CSV export, detecting the source format from the header row
/// unless one is declared.
///
/// Empty rows and header rows are neither imported nor skipped; they do not
/// appear in the totals at all.
pub fn import_csv(
    bytes: &[u8],
    declared: Option<CsvImportFormat>,
    file_name: &str,
) -> CsvImportOutcome {
    let mut agg = RunAggregator::new(file_name, ImportKind::Csv);

    let spec = match declared {
        Some(format) => format.spec(),
        None => match detect_format(bytes) {
            Ok(spec) => spec,
            Err(err) => {
                agg.fail(err.to_string());
                return CsvImportOutcome {
                    run: agg.finalize(),
                    transactions: Vec::new(),
                };
            }
        },
    };
    agg.set_source_format(spec.name);
    debug!("importing {file_name} as {}", spec.name);

    let mut rdr = ReaderBuilder::new()
        .delimiter(spec.delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(bytes);

    let mut transactions = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(err) => {
                agg.record_skipped(idx as u64 + 1, &err.to_string());
                continue;
            }
        };
        let line_no = record
            .position()
            .map_or(idx as u64 + 1, |p| p.line());

        // Blank rows and (possibly repeated) header rows are excluded from
        // the totals.
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let joined = record.iter().collect::<Vec<_>>().join(&(spec.delimiter as char).to_string());
        if signature_matches(&joined, spec) {
            continue;
        }

        match parse_row(&record, spec, &joined) {
            Ok(txn) => {
                agg.record_imported();
                transactions.push(txn);
            }
            Err(err) => agg.record_skipped(line_no, &err.to_string()),
        }
    }

    CsvImportOutcome {
        run: agg.finalize(),
        transactions,
    }
}

fn parse_row(
    record: &csv::StringRecord,
    spec: &FormatSpec,
    raw_line: &str,
) -> Result<ParsedTransaction, RowError> {
    let expected = spec.signature.len();
    if record.len() < expected {
        return Err(RowError::ColumnCount {
            expected,
            got: record.len(),
        });
    }

    let date_str = record.get(spec.date_column).unwrap_or("").trim();
    let date = NaiveDate::parse_from_str(date_str, spec.date_format)
        .map_err(|_| RowError::BadDate(date_str.to_string()))?;

    let description = record.get(spec.description_column).unwrap_or("").trim();
    if description.is_empty() {
        return Err(RowError::EmptyDescription);
    }

    let amount_str = record.get(spec.amount_column).unwrap_or("").trim();
    let amount = parse_amount(amount_str, spec.comma_decimal)
        .ok_or_else(|| RowError::BadAmount(amount_str.to_string()))?;

    Ok(ParsedTransaction {
        date,
        description: description.to_string(),
        value_primary: amount,
        value_secondary: None,
        current_installment: None,
        total_installments: None,
        card_last_four: None,
        card_holder: None,
        raw_line: raw_line.to_string(),
    })
}

fn parse_amount(s: &str, comma_decimal: bool) -> Option<f64> {
    let mut t = s.trim();
    let mut negative = false;
    if let Some(stripped) = t.strip_prefix('-') {
        negative = true;
        t = stripped;
    }
    let t = t.trim().trim_start_matches("R$").trim_start_matches('$').trim();
    let cleaned = if comma_decimal {
        t.replace('.', "").replace(',', ".")
    } else {
        t.replace(',', "")
    };
    let v: f64 = cleaned.parse().ok()?;
    Some(if negative { -v } else { v })
}
