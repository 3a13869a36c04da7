//! CSV source formats and header-signature detection.
//!
//! Each supported bank export is one [`CsvImportFormat`] variant described
//! by a [`FormatSpec`] row. Adding a bank is one variant plus one table row;
//! the pipeline's control flow never changes.

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// Supported CSV export layouts. Closed set: matches on this enum are
/// exhaustive, so a new format is a compile-checked extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvImportFormat {
    /// Card app export: `date,category,title,amount`, ISO dates, dot
    /// decimals.
    NuCard,
    /// Bank extract: `data;lancamento;valor`, `DD/MM/YYYY`, comma decimals.
    BankExtract,
    /// Plain ledger export: `Date,Description,Amount`, `MM/DD/YYYY`, dot
    /// decimals.
    GenericLedger,
}

impl CsvImportFormat {
    pub fn spec(self) -> &'static FormatSpec {
        match self {
            CsvImportFormat::NuCard => &NUCARD,
            CsvImportFormat::BankExtract => &BANK_EXTRACT,
            CsvImportFormat::GenericLedger => &GENERIC_LEDGER,
        }
    }

    /// Lookup by the name used in config files and on the command line.
    pub fn from_name(name: &str) -> Option<CsvImportFormat> {
        FORMATS
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
            .map(|s| s.format)
    }
}

/// Column signature and parse rules for one CSV layout.
#[derive(Debug)]
pub struct FormatSpec {
    pub format: CsvImportFormat,
    pub name: &'static str,
    pub delimiter: u8,
    /// Lowercased header names, in order.
    pub signature: &'static [&'static str],
    pub date_column: usize,
    pub description_column: usize,
    pub amount_column: usize,
    /// `chrono` format string for the date column.
    pub date_format: &'static str,
    /// `1.234,56`-style amounts when set.
    pub comma_decimal: bool,
}

static NUCARD: FormatSpec = FormatSpec {
    format: CsvImportFormat::NuCard,
    name: "nucard",
    delimiter: b',',
    signature: &["date", "category", "title", "amount"],
    date_column: 0,
    description_column: 2,
    amount_column: 3,
    date_format: "%Y-%m-%d",
    comma_decimal: false,
};

static BANK_EXTRACT: FormatSpec = FormatSpec {
    format: CsvImportFormat::BankExtract,
    name: "bank-extract",
    delimiter: b';',
    signature: &["data", "lancamento", "valor"],
    date_column: 0,
    description_column: 1,
    amount_column: 2,
    date_format: "%d/%m/%Y",
    comma_decimal: true,
};

static GENERIC_LEDGER: FormatSpec = FormatSpec {
    format: CsvImportFormat::GenericLedger,
    name: "generic",
    delimiter: b',',
    signature: &["date", "description", "amount"],
    date_column: 0,
    description_column: 1,
    amount_column: 2,
    date_format: "%m/%d/%Y",
    comma_decimal: false,
};

/// Detection table, checked in order.
pub static FORMATS: [&FormatSpec; 3] = [&NUCARD, &BANK_EXTRACT, &GENERIC_LEDGER];

/// Inspect the header row and pick the matching format.
///
/// Fail-fast on structural mismatch: an unrecognized signature fails the
/// whole run before any data row is processed.
pub fn detect_format(bytes: &[u8]) -> Result<&'static FormatSpec, StructuralError> {
    let text = String::from_utf8_lossy(bytes);
    let header = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or(StructuralError::MissingCsvHeader)?;
    let header = header.trim_start_matches('\u{feff}');

    for spec in FORMATS {
        if signature_matches(header, spec) {
            return Ok(spec);
        }
    }
    Err(StructuralError::UnknownCsvSignature(header.to_string()))
}

/// Case- and accent-insensitive comparison of header fields against a
/// signature. Accents are folded so `lançamento` matches `lancamento`.
pub(crate) fn signature_matches(header: &str, spec: &FormatSpec) -> bool {
    let fields: Vec<String> = header
        .split(spec.delimiter as char)
        .map(fold_header_field)
        .collect();
    fields.len() == spec.signature.len()
        && fields.iter().zip(spec.signature).all(|(f, s)| f == s)
}

fn fold_header_field(field: &str) -> String {
    field
        .trim()
        .trim_matches('"')
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => Some('a'),
            'é' | 'ê' => Some('e'),
            'í' => Some('i'),
            'ó' | 'ô' | 'õ' => Some('o'),
            'ú' => Some('u'),
            'ç' => Some('c'),
            c if c.is_whitespace() => None,
            c => Some(c),
        })
        .collect()
}
