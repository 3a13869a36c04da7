use thiserror::Error;

/// Unrecoverable import failures. A structural error aborts the whole run
/// before (or instead of) row processing and surfaces as a FAILED
/// [`fatura_core::ImportRun`]. Row- and line-level problems are typed
/// separately and absorbed into counters.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("statement text is empty")]
    EmptyStatement,

    #[error("CSV input has no header row")]
    MissingCsvHeader,

    #[error("CSV header matches no known format signature: `{0}`")]
    UnknownCsvSignature(String),

    #[error("invalid grammar pattern `{name}`: {source}")]
    BadPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("grammar pattern `{name}` is missing capture group `{capture}`")]
    MissingCapture {
        name: &'static str,
        capture: &'static str,
    },
}
