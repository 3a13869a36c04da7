//! Configurable statement line grammar.
//!
//! The patterns that drive the statement parser (section headers, date
//! tokens, value tokens, installment markers, noise lines) are data, not
//! code: new bank layouts ship as a TOML config instead of a parser change.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// Pattern strings for one statement layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarConfig {
    /// Opens a new card section. Must expose `holder` and `last4` captures.
    pub section_header: String,
    /// Leading date token on a transaction line. Must expose `day` and
    /// `month` captures.
    pub date: String,
    /// One currency-value token.
    pub value: String,
    /// Installment progress marker embedded in the description. Must expose
    /// `current` and `total` captures.
    pub installment: String,
    /// Footer/noise lines dropped without being counted as candidates.
    pub noise: Vec<String>,
}

impl Default for GrammarConfig {
    /// Grammar for Brazilian credit-card bills: `DD/MM` dates, `1.234,56`
    /// values, `N/M` installment markers, `HOLDER •••• 1234` section
    /// headers.
    fn default() -> Self {
        Self {
            section_header:
                r"^(?P<holder>\p{Lu}[\p{Lu} .]*?)\s+(?:[•*Xx]{2,}[\s.]*)+(?P<last4>\d{4})\s*$"
                    .to_string(),
            date: r"^(?P<day>\d{2})/(?P<month>\d{2})\b".to_string(),
            value: r"-?\s?(?:R\$\s*)?\d+(?:\.\d{3})*,\d{2}-?".to_string(),
            installment: r"(?:(?i:parc(?:ela)?)\s*)?\b(?P<current>\d{1,2})/(?P<total>\d{1,2})\b"
                .to_string(),
            noise: vec![
                r"(?i)^total\b".to_string(),
                r"(?i)^subtotal\b".to_string(),
                r"(?i)^saldo\b".to_string(),
                r"(?i)^limite\b".to_string(),
                r"(?i)^pagamento m[ií]nimo\b".to_string(),
                r"(?i)^vencimento\b".to_string(),
                r"(?i)^encargos\b".to_string(),
                r"(?i)^data\s+.*valor\s*$".to_string(),
                r"(?i)lan[çc]amentos".to_string(),
                r"(?i)^p[áa]gina\s+\d+".to_string(),
            ],
        }
    }
}

/// Compiled form of [`GrammarConfig`]. Compiled once per run; a bad pattern
/// is a structural failure before any line is read.
#[derive(Debug, Clone)]
pub struct StatementGrammar {
    pub(crate) section_header: Regex,
    pub(crate) date: Regex,
    pub(crate) value: Regex,
    pub(crate) installment: Regex,
    noise: Vec<Regex>,
}

impl StatementGrammar {
    pub fn compile(cfg: &GrammarConfig) -> Result<Self, StructuralError> {
        Ok(Self {
            section_header: compile(
                "section_header",
                &cfg.section_header,
                &["holder", "last4"],
            )?,
            date: compile("date", &cfg.date, &["day", "month"])?,
            value: compile("value", &cfg.value, &[])?,
            installment: compile("installment", &cfg.installment, &["current", "total"])?,
            noise: cfg
                .noise
                .iter()
                .map(|p| compile("noise", p, &[]))
                .collect::<Result<_, _>>()?,
        })
    }

    pub(crate) fn is_noise(&self, line: &str) -> bool {
        self.noise.iter().any(|re| re.is_match(line))
    }
}

impl Default for StatementGrammar {
    fn default() -> Self {
        Self::compile(&GrammarConfig::default()).expect("default grammar compiles")
    }
}

fn compile(
    name: &'static str,
    pattern: &str,
    required: &[&'static str],
) -> Result<Regex, StructuralError> {
    let re = Regex::new(pattern).map_err(|source| StructuralError::BadPattern { name, source })?;
    for &capture in required {
        if !re.capture_names().flatten().any(|c| c == capture) {
            return Err(StructuralError::MissingCapture { name, capture });
        }
    }
    Ok(re)
}
