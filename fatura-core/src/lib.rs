//! fatura-core: domain types and import bookkeeping for statement ingestion.

pub mod import_run;
pub mod transaction;

pub use import_run::{ImportKind, ImportRun, ImportStatus, RunAggregator};
pub use transaction::{CardSection, ParsedTransaction};
