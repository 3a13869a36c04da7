//! Import run records and the streaming result aggregator.
//!
//! Every ingestion attempt, however bad, ends in a finalized [`ImportRun`]
//! so the import history stays consistent with what was attempted.

use log::debug;
use serde::{Deserialize, Serialize};

/// Which pipeline produced the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "pdf")]
    Pdf,
}

/// Outcome classification of a finished import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "partial")]
    Partial,
    #[serde(rename = "failed")]
    Failed,
}

/// Audit record of one ingestion attempt. Built incrementally by
/// [`RunAggregator`]; immutable once finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRun {
    pub file_name: String,
    pub kind: ImportKind,
    /// Detected or declared CSV format name, when known.
    pub source_format: Option<String>,
    pub total_rows: u64,
    pub imported_rows: u64,
    pub skipped_rows: u64,
    pub status: ImportStatus,
    /// Structural failure reason, or a digest of the first few row-level
    /// failures.
    pub error_message: Option<String>,
}

/// How many row-level failure reasons are kept verbatim in the digest.
/// Further skips only count.
const MAX_DIGEST_ERRORS: usize = 5;

/// Streaming accumulator for one in-flight import. Counters update as the
/// pipeline classifies rows, so very large inputs never require buffering
/// before partial progress can be reported. Dropping an aggregator mid-run
/// leaves nothing behind.
#[derive(Debug)]
pub struct RunAggregator {
    file_name: String,
    kind: ImportKind,
    source_format: Option<String>,
    imported: u64,
    skipped: u64,
    reasons: Vec<String>,
    structural: Option<String>,
}

impl RunAggregator {
    pub fn new(file_name: impl Into<String>, kind: ImportKind) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            source_format: None,
            imported: 0,
            skipped: 0,
            reasons: Vec::new(),
            structural: None,
        }
    }

    pub fn set_source_format(&mut self, name: impl Into<String>) {
        self.source_format = Some(name.into());
    }

    pub fn record_imported(&mut self) {
        self.imported += 1;
    }

    /// Row-level failure: counted as skipped, never fatal.
    pub fn record_skipped(&mut self, line: u64, reason: &str) {
        self.skipped += 1;
        if self.reasons.len() < MAX_DIGEST_ERRORS {
            self.reasons.push(format!("line {line}: {reason}"));
        }
        debug!("skipped line {line}: {reason}");
    }

    /// Structural failure: the whole run is FAILED regardless of counters.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.structural = Some(reason.into());
    }

    pub fn imported(&self) -> u64 {
        self.imported
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Freeze the run record. `imported_rows + skipped_rows == total_rows`
    /// always holds on the result.
    pub fn finalize(self) -> ImportRun {
        let status = if self.structural.is_some() || self.imported == 0 {
            ImportStatus::Failed
        } else if self.skipped > 0 {
            ImportStatus::Partial
        } else {
            ImportStatus::Success
        };

        let error_message = match self.structural {
            Some(msg) => Some(msg),
            None if self.reasons.is_empty() => None,
            None => {
                let hidden = self.skipped.saturating_sub(self.reasons.len() as u64);
                let mut digest = self.reasons.join("; ");
                if hidden > 0 {
                    digest.push_str(&format!(" (+{hidden} more)"));
                }
                Some(digest)
            }
        };

        ImportRun {
            file_name: self.file_name,
            kind: self.kind,
            source_format: self.source_format,
            total_rows: self.imported + self.skipped,
            imported_rows: self.imported,
            skipped_rows: self.skipped,
            status,
            error_message,
        }
    }
}
