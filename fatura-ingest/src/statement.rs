//! Multi-card statement parser for PDF-extracted text.
//!
//! Expected text shape (page-ordered, layout-flattened):
//!   CARTÃO FINAL 1234
//!   JOHN DOE •••• 1234
//!   12/01 UBER TRIP 45,90
//!   12/01 NETFLIX 2/12 39,90
//!   MARIA DOE •••• 5678
//!   14/01 PADARIA CENTRAL 23,50
//!   TOTAL DA FATURA 109,30
//!
//! A section-header line opens a new card section; every following line
//! belongs to it until the next header or end of text. Lines before the
//! first header and configured noise lines are dropped silently: they are
//! not transaction candidates and never count as parse errors.

use fatura_core::{CardSection, ImportKind, ImportRun, ParsedTransaction, RunAggregator};
use log::{debug, trace};

use crate::error::StructuralError;
use crate::grammar::StatementGrammar;
use crate::line::{LineReject, parse_transaction_line};

/// Card sections plus the audit run for one statement-text import.
#[derive(Debug)]
pub struct PdfImportOutcome {
    pub sections: Vec<CardSection>,
    pub run: ImportRun,
}

/// Parse statement text into ordered card sections.
///
/// Section order is order of first appearance; within a section,
/// transaction order is line order. Re-parsing the same text yields an
/// identical result; the parser holds no hidden state.
pub fn parse_pdf_statement(
    raw_text: &str,
    statement_year: i32,
    grammar: &StatementGrammar,
) -> Result<Vec<CardSection>, StructuralError> {
    if raw_text.trim().is_empty() {
        return Err(StructuralError::EmptyStatement);
    }
    Ok(scan(raw_text, statement_year, grammar, |_, _| {}))
}

/// Like [`parse_pdf_statement`], but classifies every candidate line into a
/// finalized [`fatura_core::ImportRun`] instead of surfacing a `Result`.
/// Structural failure produces a FAILED run with no sections.
pub fn import_statement_text(
    raw_text: &str,
    statement_year: i32,
    grammar: &StatementGrammar,
    file_name: &str,
) -> PdfImportOutcome {
    let mut agg = RunAggregator::new(file_name, ImportKind::Pdf);

    if raw_text.trim().is_empty() {
        agg.fail(StructuralError::EmptyStatement.to_string());
        return PdfImportOutcome {
            sections: Vec::new(),
            run: agg.finalize(),
        };
    }

    let sections = scan(raw_text, statement_year, grammar, |line_no, reject| {
        agg.record_skipped(line_no, &reject.to_string());
    });
    for section in &sections {
        for _ in &section.transactions {
            agg.record_imported();
        }
    }

    PdfImportOutcome {
        sections,
        run: agg.finalize(),
    }
}

/// Single sequential pass. Section attribution is order-dependent, so lines
/// are never processed out of order.
fn scan(
    text: &str,
    statement_year: i32,
    grammar: &StatementGrammar,
    mut on_skip: impl FnMut(u64, &LineReject),
) -> Vec<CardSection> {
    let mut sections: Vec<CardSection> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx as u64 + 1;
        let line = raw.trim();
        if line.is_empty() || grammar.is_noise(line) {
            continue;
        }

        if let Some(caps) = grammar.section_header.captures(line) {
            if let (Some(holder), Some(last4)) = (caps.name("holder"), caps.name("last4")) {
                debug!(
                    "section header at line {line_no}: {} {}",
                    holder.as_str(),
                    last4.as_str()
                );
                sections.push(CardSection::new(holder.as_str().trim(), last4.as_str()));
                continue;
            }
        }

        let Some(section) = sections.last_mut() else {
            // Preamble before the first card section: address block,
            // statement summary. Not candidates.
            trace!("dropping preamble line {line_no}");
            continue;
        };

        match parse_transaction_line(line, statement_year, grammar) {
            Ok(t) => {
                section.transactions.push(ParsedTransaction {
                    date: t.date,
                    description: t.description,
                    value_primary: t.value_primary,
                    value_secondary: t.value_secondary,
                    current_installment: t.current_installment,
                    total_installments: t.total_installments,
                    card_last_four: Some(section.last_four.clone()),
                    card_holder: Some(section.holder.clone()),
                    raw_line: t.raw_line,
                });
            }
            Err(reject) => on_skip(line_no, &reject),
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fatura_core::ImportStatus;

    const STATEMENT: &str = "\
FATURA DE FEVEREIRO
Vencimento 10/02
JOHN DOE •••• 1234
Data Descrição Valor
12/01 UBER TRIP 45,90
12/01 NETFLIX 2/12 39,90
MARIA DOE •••• 5678
14/01 PADARIA CENTRAL 23,50
TOTAL DA FATURA 109,30
";

    #[test]
    fn test_sections_split_in_order() {
        let sections =
            parse_pdf_statement(STATEMENT, 2025, &StatementGrammar::default()).unwrap();
        assert_eq!(sections.len(), 2);

        assert_eq!(sections[0].holder, "JOHN DOE");
        assert_eq!(sections[0].last_four, "1234");
        assert_eq!(sections[0].transactions.len(), 2);
        assert_eq!(sections[0].transactions[0].description, "UBER TRIP");
        assert_eq!(sections[0].transactions[0].value_primary, 45.90);
        assert_eq!(
            sections[0].transactions[0].date,
            NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()
        );
        assert_eq!(
            sections[0].transactions[0].card_last_four.as_deref(),
            Some("1234")
        );

        assert_eq!(sections[1].holder, "MARIA DOE");
        assert_eq!(sections[1].last_four, "5678");
        assert_eq!(sections[1].transactions.len(), 1);
        assert_eq!(
            sections[1].transactions[0].card_holder.as_deref(),
            Some("MARIA DOE")
        );
    }

    #[test]
    fn test_preamble_and_noise_are_not_errors() {
        let outcome =
            import_statement_text(STATEMENT, 2025, &StatementGrammar::default(), "fev.txt");
        // 3 parsed lines, nothing skipped: preamble, column header and the
        // totals footer are discarded without counting.
        assert_eq!(outcome.run.total_rows, 3);
        assert_eq!(outcome.run.imported_rows, 3);
        assert_eq!(outcome.run.skipped_rows, 0);
        assert_eq!(outcome.run.status, ImportStatus::Success);
    }

    #[test]
    fn test_malformed_line_inside_section_is_skipped() {
        let text = "\
JOHN DOE •••• 1234
12/01 UBER TRIP 45,90
31/02 LOJA QUALQUER 10,00
";
        let outcome = import_statement_text(text, 2025, &StatementGrammar::default(), "fev.txt");
        assert_eq!(outcome.run.imported_rows, 1);
        assert_eq!(outcome.run.skipped_rows, 1);
        assert_eq!(outcome.run.status, ImportStatus::Partial);
        assert!(outcome.run.error_message.unwrap().contains("line 3"));
    }

    #[test]
    fn test_empty_text_is_structural() {
        assert!(matches!(
            parse_pdf_statement("  \n \n", 2025, &StatementGrammar::default()),
            Err(StructuralError::EmptyStatement)
        ));

        let outcome = import_statement_text("", 2025, &StatementGrammar::default(), "fev.txt");
        assert!(outcome.sections.is_empty());
        assert_eq!(outcome.run.status, ImportStatus::Failed);
        assert!(outcome.run.error_message.is_some());
    }

    #[test]
    fn test_reparse_is_deterministic() {
        let grammar = StatementGrammar::default();
        let a = parse_pdf_statement(STATEMENT, 2025, &grammar).unwrap();
        let b = parse_pdf_statement(STATEMENT, 2025, &grammar).unwrap();
        assert_eq!(a, b);
    }
}
