//! Normalized transaction and card-section types shared by all parsers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One transaction recovered from a statement line or CSV row (source-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,
    /// Merchant description with installment markers already stripped.
    pub description: String,
    /// Home-currency amount. Positive means charge/spend; negative means
    /// credit/refund.
    pub value_primary: f64,
    /// Foreign-currency amount when the statement line carries two value
    /// tokens.
    pub value_secondary: Option<f64>,
    pub current_installment: Option<u32>,
    pub total_installments: Option<u32>,
    /// Set on the statement path; bank CSV exports carry no card section.
    pub card_last_four: Option<String>,
    pub card_holder: Option<String>,
    /// Original line/row text, kept for audit.
    pub raw_line: String,
}

impl ParsedTransaction {
    /// Installment fields are populated together by the line parser with
    /// `1 <= current <= total`; this checks the invariant held.
    pub fn installments_valid(&self) -> bool {
        match (self.current_installment, self.total_installments) {
            (None, None) => true,
            (Some(cur), Some(tot)) => cur >= 1 && cur <= tot,
            _ => false,
        }
    }

    /// Refunds and payments show up as negative home-currency values.
    pub fn is_credit(&self) -> bool {
        self.value_primary < 0.0
    }
}

/// The portion of a multi-card statement belonging to one physical card.
/// A section owns its transactions; both are constructed and dropped
/// together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSection {
    pub last_four: String,
    pub holder: String,
    pub transactions: Vec<ParsedTransaction>,
}

impl CardSection {
    pub fn new(holder: impl Into<String>, last_four: impl Into<String>) -> Self {
        Self {
            last_four: last_four.into(),
            holder: holder.into(),
            transactions: Vec::new(),
        }
    }
}
