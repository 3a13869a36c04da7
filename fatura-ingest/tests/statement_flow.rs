//! End-to-end flow: statement text → card sections → enriched hand-off,
//! and the CSV pipeline's bookkeeping under mixed-quality input.

use chrono::NaiveDate;
use fatura_core::ImportStatus;
use fatura_ingest::{StatementGrammar, import_csv, import_statement_text, parse_pdf_statement};
use fatura_resolve::{DescriptionMapping, MappingSnapshot, enrich_transactions, normalize};

const STATEMENT: &str = "\
BANCO EXEMPLO S.A.
Fatura de janeiro, vencimento 10/02
JOHN DOE •••• 1234
Data Descrição Valor
12/01 UBER TRIP 45,90
12/01 NETFLIX 2/12 39,90
14/01 AIRBNB PARIS 120,00 648,30
20/01 ESTORNO COMPRA -45,90
MARIA DOE •••• 5678
14/01 PADARIA CENTRAL 23,50
15/01 POSTO SHELL 1022 180,00
TOTAL DA FATURA 892,60
Encargos e tarifas: consulte o contrato
";

fn mappings() -> Vec<DescriptionMapping> {
    vec![
        DescriptionMapping {
            original: "uber trip".to_string(),
            simplified: "Uber".to_string(),
            category: Some("Transport".to_string()),
            account_id: "acc-1".to_string(),
        },
        DescriptionMapping {
            original: "posto shell".to_string(),
            simplified: "Shell".to_string(),
            category: Some("Car".to_string()),
            account_id: "acc-1".to_string(),
        },
    ]
}

#[test]
fn test_statement_to_enriched_handoff() {
    let grammar = StatementGrammar::default();
    let outcome = import_statement_text(STATEMENT, 2025, &grammar, "janeiro.txt");

    assert_eq!(outcome.run.status, ImportStatus::Success);
    assert_eq!(outcome.run.total_rows, 6);
    assert_eq!(outcome.sections.len(), 2);

    let john = &outcome.sections[0];
    assert_eq!(john.holder, "JOHN DOE");
    assert_eq!(john.last_four, "1234");
    assert_eq!(john.transactions.len(), 4);

    // Installment marker extracted and stripped.
    let netflix = &john.transactions[1];
    assert_eq!(netflix.description, "NETFLIX");
    assert_eq!(netflix.current_installment, Some(2));
    assert_eq!(netflix.total_installments, Some(12));
    assert!(netflix.installments_valid());

    // Two-value line: rightmost token is the home-currency value.
    let airbnb = &john.transactions[2];
    assert_eq!(airbnb.value_primary, 648.30);
    assert_eq!(airbnb.value_secondary, Some(120.00));

    // Refund parsed as a credit.
    assert!(john.transactions[3].is_credit());

    let txns: Vec<_> = outcome
        .sections
        .into_iter()
        .flat_map(|s| s.transactions)
        .collect();
    let snapshot = MappingSnapshot::from_mappings(&mappings());
    let report = enrich_transactions(txns, &snapshot);

    let uber = &report.transactions[0];
    assert_eq!(uber.simplified_description, "Uber");
    assert_eq!(uber.category.as_deref(), Some("Transport"));

    // "POSTO SHELL 1022" hits the "posto shell" mapping through the
    // store-code strip.
    let shell = report
        .transactions
        .iter()
        .find(|t| t.simplified_description == "Shell")
        .unwrap();
    assert_eq!(shell.category.as_deref(), Some("Car"));

    // Unmapped residues are canonical, deduplicated, first-appearance order.
    assert_eq!(
        report.unmapped,
        vec![
            "netflix".to_string(),
            "airbnb paris".to_string(),
            "estorno compra".to_string(),
            "padaria central".to_string(),
        ]
    );
}

#[test]
fn test_scenario_single_section_single_line() {
    let text = "JOHN DOE •••• 1234\n12/01 UBER TRIP 45,90\n";
    let sections = parse_pdf_statement(text, 2025, &StatementGrammar::default()).unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].last_four, "1234");
    assert_eq!(sections[0].holder, "JOHN DOE");
    let t = &sections[0].transactions[0];
    assert_eq!(t.date, NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());
    assert_eq!(t.description, "UBER TRIP");
    assert_eq!(t.value_primary, 45.90);
    assert_eq!(t.value_secondary, None);
}

#[test]
fn test_reparse_yields_identical_sequences() {
    let grammar = StatementGrammar::default();
    let a = parse_pdf_statement(STATEMENT, 2025, &grammar).unwrap();
    let b = parse_pdf_statement(STATEMENT, 2025, &grammar).unwrap();
    assert_eq!(a, b);

    let json_a = serde_json::to_string(&a).unwrap();
    let json_b = serde_json::to_string(&b).unwrap();
    assert_eq!(json_a, json_b);
}

#[test]
fn test_csv_counts_reconcile_for_any_outcome() {
    let inputs: [&[u8]; 4] = [
        b"Date,Description,Amount\n01/12/2025,Uber,45.90\n",
        b"Date,Description,Amount\n01/12/2025,Uber,45.90\nbad,row,x\n",
        b"Date,Description,Amount\nbad,row,x\n",
        b"no,such,format\n1,2,3\n",
    ];
    for bytes in inputs {
        let outcome = import_csv(bytes, None, "export.csv");
        assert_eq!(
            outcome.run.total_rows,
            outcome.run.imported_rows + outcome.run.skipped_rows
        );
        assert_eq!(outcome.transactions.len() as u64, outcome.run.imported_rows);
    }
}

#[test]
fn test_csv_and_statement_transactions_share_shape() {
    // The resolver treats both sources identically.
    let csv = b"data;lancamento;valor\n12/01/2025;UBER   TRIP;45,90\n";
    let outcome = import_csv(csv, None, "extrato.csv");
    assert_eq!(outcome.run.status, ImportStatus::Success);

    let snapshot = MappingSnapshot::from_mappings(&mappings());
    let report = enrich_transactions(outcome.transactions, &snapshot);
    assert_eq!(report.transactions[0].simplified_description, "Uber");
    assert!(report.unmapped.is_empty());
}

#[test]
fn test_normalize_idempotent_over_statement_descriptions() {
    let sections =
        parse_pdf_statement(STATEMENT, 2025, &StatementGrammar::default()).unwrap();
    for section in &sections {
        for txn in &section.transactions {
            let once = normalize(&txn.description);
            assert_eq!(normalize(&once), once);
        }
    }
}
