//! fatura-ingest: a configurable statement line grammar, the multi-card
//! statement-text parser, and the CSV import pipeline.

pub mod csv_import;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod line;
pub mod statement;

pub use csv_import::{CsvImportOutcome, import_csv};
pub use error::StructuralError;
pub use formats::{CsvImportFormat, FORMATS, FormatSpec, detect_format};
pub use grammar::{GrammarConfig, StatementGrammar};
pub use line::{LineReject, LineTransaction, parse_transaction_line};
pub use statement::{PdfImportOutcome, import_statement_text, parse_pdf_statement};
