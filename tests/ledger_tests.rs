// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use moneysheet::errors::LedgerError;
use moneysheet::ledger::{DataIssue, normalize, to_sheet};
use moneysheet::models::{
    AmountSign, Book, BookKind, DatePolicy, INVESTMENT_COLUMNS, TRANSACTION_COLUMNS, builtin_books,
};
use moneysheet::store::SheetData;
use rust_decimal::Decimal;
use std::str::FromStr;

fn book(id: &str) -> Book {
    builtin_books().into_iter().find(|b| b.id == id).unwrap()
}

fn sheet(header: &[&str], rows: &[&[&str]]) -> SheetData {
    SheetData::new(
        header,
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn transactions_are_typed_with_sheet_line_numbers() {
    let data = sheet(
        &TRANSACTION_COLUMNS,
        &[
            &["2024-01-05", "-50", "Salidas", "", "TRUE", "TRUE"],
            &["", "", "", "", "", ""],
            &["01/20/2024", "$2,000.00", "Salario", " pay ", "false", "yes"],
        ],
    );
    let out = normalize(&data, &book("colombia")).unwrap();
    assert!(out.issues.is_empty());
    let items = out.snapshot.transactions().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].date, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
    assert_eq!(items[1].amount, dec("2000.00"));
    assert_eq!(items[1].description.as_deref(), Some("pay"));
    assert!(!items[1].recurrent);
    assert!(items[1].include);
}

#[test]
fn bad_amount_reports_its_line() {
    let data = sheet(
        &TRANSACTION_COLUMNS,
        &[
            &["2024-01-05", "-50", "Salidas", "", "TRUE", "TRUE"],
            &["2024-01-06", "lots", "Salidas", "", "TRUE", "TRUE"],
        ],
    );
    match normalize(&data, &book("colombia")) {
        Err(LedgerError::InvalidAmount { row, value }) => {
            assert_eq!(row, 3);
            assert_eq!(value, "lots");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn bad_flag_names_the_column() {
    let data = sheet(
        &TRANSACTION_COLUMNS,
        &[&["2024-01-05", "-50", "Salidas", "", "maybe", "TRUE"]],
    );
    assert!(matches!(
        normalize(&data, &book("colombia")),
        Err(LedgerError::InvalidFlag {
            column: "recurrent",
            ..
        })
    ));
}

#[test]
fn header_mismatch_is_rejected() {
    let data = sheet(&["fecha", "monto", "categoria", "", "", ""], &[]);
    assert!(matches!(
        normalize(&data, &book("italy")),
        Err(LedgerError::HeaderMismatch { .. })
    ));
}

#[test]
fn headerless_empty_sheet_is_an_empty_snapshot() {
    let out = normalize(&SheetData::default(), &book("italy")).unwrap();
    assert!(out.snapshot.is_empty());
    assert!(out.snapshot.transactions().is_some());
}

#[test]
fn drop_policy_skips_undated_rows() {
    let mut lenient = book("italy");
    lenient.date_policy = DatePolicy::Drop;
    let data = sheet(
        &TRANSACTION_COLUMNS,
        &[
            &["someday", "4", "Mercado", "", "TRUE", "TRUE"],
            &["2024-02-01", "4", "Mercado", "", "TRUE", "TRUE"],
        ],
    );
    let out = normalize(&data, &lenient).unwrap();
    assert_eq!(out.snapshot.len(), 1);
    assert_eq!(
        out.issues,
        vec![DataIssue::DroppedRow {
            line: 2,
            value: "someday".into()
        }]
    );

    assert!(matches!(
        normalize(&data, &book("italy")),
        Err(LedgerError::InvalidDate { row: 2, .. })
    ));
}

#[test]
fn unknown_category_is_kept_and_reported() {
    let data = sheet(
        &TRANSACTION_COLUMNS,
        &[&["2024-02-01", "4", "Gelato", "", "TRUE", "TRUE"]],
    );
    let out = normalize(&data, &book("italy")).unwrap();
    assert_eq!(out.snapshot.len(), 1);
    assert_eq!(out.issues[0].line(), 2);
    assert!(out.issues[0].to_string().contains("Gelato"));
}

#[test]
fn investments_keep_optional_closing_fields() {
    let data = sheet(
        &INVESTMENT_COLUMNS,
        &[
            &["CDT", "Bank", "Fondo", "2024-01-01", "1000", "2024-07-01", "1100", "renewed"],
            &["Apple", "Broker", "Acciones", "2024-03-01", "500", "", "", ""],
            &["Odd", "Broker", "ETF", "2024-04-01", "300", "", "310", ""],
        ],
    );
    let out = normalize(&data, &book("investments")).unwrap();
    let items = out.snapshot.investments().unwrap();
    assert_eq!(items.len(), 3);
    assert!(!items[0].is_active());
    assert_eq!(items[0].comments.as_deref(), Some("renewed"));
    assert!(items[1].is_active());
    assert_eq!(items[1].amount_closing, None);
    assert_eq!(
        out.issues,
        vec![DataIssue::UnpairedClosing {
            line: 4,
            name: "Odd".into()
        }]
    );
}

#[test]
fn written_sheet_reads_back_unchanged() {
    let custom = Book {
        id: "home".into(),
        title: "Home".into(),
        sheet: "home".into(),
        currency_symbol: "\u{a3}".into(),
        categories: vec!["Food".into(), "Salary".into()],
        kind: BookKind::Spending {
            sign: AmountSign::Signed,
        },
        date_policy: DatePolicy::Reject,
    };
    let data = sheet(
        &TRANSACTION_COLUMNS,
        &[
            &["2024-01-05", "-50.10", "Food", "lunch, with friends", "TRUE", "FALSE"],
            &["2024-01-20", "2000", "Salary", "", "FALSE", "TRUE"],
        ],
    );
    let first = normalize(&data, &custom).unwrap().snapshot;
    let written = to_sheet(&first, &custom);
    assert_eq!(written, data);
    let second = normalize(&written, &custom).unwrap().snapshot;
    assert_eq!(first, second);
}
