// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use moneysheet::errors::LedgerError;
use moneysheet::ledger::normalize;
use moneysheet::models::{
    Book, Entries, INVESTMENT_COLUMNS, InvestmentPosition, Record, Snapshot, TRANSACTION_COLUMNS,
    Transaction, builtin_books,
};
use moneysheet::reconcile::{append, close_position, commit};
use moneysheet::store::{MemoryStore, TableStore};
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn book(id: &str) -> Book {
    builtin_books().into_iter().find(|b| b.id == id).unwrap()
}

fn tx(date: NaiveDate, amount: i64, category: &str, description: &str) -> Transaction {
    Transaction {
        date,
        amount: Decimal::from(amount),
        category: category.into(),
        description: Some(description.into()),
        recurrent: true,
        include: true,
    }
}

fn read_back(store: &MemoryStore, book: &Book) -> Snapshot {
    let data = store.read(&book.sheet, book.column_count()).unwrap();
    normalize(&data, book).unwrap().snapshot
}

#[test]
fn commit_writes_ascending_and_keeps_ties_in_order() {
    let colombia = book("colombia");
    let mut store = MemoryStore::new();
    let edited = Snapshot {
        book_id: "colombia".into(),
        entries: Entries::Transactions(vec![
            tx(d(2024, 3, 1), -1, "Salidas", "late"),
            tx(d(2024, 1, 1), -2, "Salidas", "first tie"),
            tx(d(2024, 1, 1), -3, "Compras", "second tie"),
        ]),
    };
    let committed = commit(&mut store, &colombia, edited).unwrap();
    let items = committed.transactions().unwrap();
    let descriptions: Vec<&str> = items
        .iter()
        .map(|t| t.description.as_deref().unwrap())
        .collect();
    assert_eq!(descriptions, vec!["first tie", "second tie", "late"]);
    assert!(items.windows(2).all(|w| w[0].date <= w[1].date));

    let (sheet, data) = &store.writes()[0];
    assert_eq!(sheet, "personal");
    assert_eq!(data.header, TRANSACTION_COLUMNS.to_vec());
    assert_eq!(read_back(&store, &colombia), committed);
}

#[test]
fn commit_rejects_category_outside_vocabulary() {
    let italy = book("italy");
    let mut store = MemoryStore::new();
    let edited = Snapshot {
        book_id: "italy".into(),
        entries: Entries::Transactions(vec![tx(d(2024, 1, 1), 3, "Groceries", "")]),
    };
    let err = commit(&mut store, &italy, edited).unwrap_err();
    assert!(matches!(err, LedgerError::UnknownCategory { .. }));
    assert!(store.writes().is_empty());
}

#[test]
fn commit_rejects_snapshot_of_another_book() {
    let italy = book("italy");
    let mut store = MemoryStore::new();
    let edited = Snapshot {
        book_id: "colombia".into(),
        entries: Entries::Transactions(Vec::new()),
    };
    assert!(matches!(
        commit(&mut store, &italy, edited),
        Err(LedgerError::ShapeMismatch(_))
    ));
    assert!(store.writes().is_empty());
}

#[test]
fn commit_of_what_was_read_is_stable() {
    let colombia = book("colombia");
    let mut store = MemoryStore::new().with_sheet(
        "personal",
        &TRANSACTION_COLUMNS,
        vec![
            vec!["2024-02-01", "-10.50", "Salidas", "", "TRUE", "TRUE"],
            vec!["2024-01-01", "1500", "Salario", "jan", "FALSE", "TRUE"],
        ],
    );
    let first = read_back(&store, &colombia);
    commit(&mut store, &colombia, first).unwrap();
    let once = store.sheet("personal").unwrap().clone();

    let second = read_back(&store, &colombia);
    commit(&mut store, &colombia, second).unwrap();
    assert_eq!(store.sheet("personal").unwrap(), &once);
    assert_eq!(once.rows[0][0], "2024-01-01");
    assert_eq!(once.rows[1][1], "-10.50");
}

#[test]
fn append_rewrites_prior_rows_plus_the_new_one() {
    let colombia = book("colombia");
    let mut store = MemoryStore::new().with_sheet(
        "personal",
        &TRANSACTION_COLUMNS,
        vec![
            vec!["2024-01-01", "1500", "Salario", "", "FALSE", "TRUE"],
            vec!["2024-03-01", "-20", "Salidas", "", "TRUE", "TRUE"],
        ],
    );
    let current = read_back(&store, &colombia);
    let record = Record::Transaction(tx(d(2024, 2, 10), -99, "Viajes", "train"));
    let committed = append(&mut store, &colombia, &current, record).unwrap();
    assert_eq!(committed.len(), 3);

    assert_eq!(store.writes().len(), 1);
    let (_, data) = &store.writes()[0];
    let dates: Vec<&str> = data.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-02-10", "2024-03-01"]);
    assert_eq!(data.rows[1][3], "train");
    // the caller's snapshot is untouched
    assert_eq!(current.len(), 2);
}

#[test]
fn append_of_wrong_shape_is_rejected() {
    let italy = book("italy");
    let mut store = MemoryStore::new();
    let current = italy.empty_snapshot();
    let record = Record::Investment(InvestmentPosition {
        name: "X".into(),
        platform: "P".into(),
        r#type: "Mercado".into(),
        opening_date: d(2024, 1, 1),
        amount_opening: Decimal::ONE,
        closing_date: None,
        amount_closing: None,
        comments: None,
    });
    assert!(matches!(
        append(&mut store, &italy, &current, record),
        Err(LedgerError::ShapeMismatch(_))
    ));
    assert!(store.writes().is_empty());
}

fn investments_store() -> MemoryStore {
    MemoryStore::new().with_sheet(
        "inversiones",
        &INVESTMENT_COLUMNS,
        vec![
            vec!["CDT", "Bank", "Fondo", "2024-01-01", "1000", "", "", ""],
            vec!["Apple", "Broker", "Acciones", "2024-02-01", "500", "", "", ""],
            vec!["Apple", "Broker", "Acciones", "2023-02-01", "300", "2023-09-01", "350", ""],
        ],
    )
}

#[test]
fn append_investment_needs_paired_closing_fields() {
    let investments = book("investments");
    let mut store = investments_store();
    let current = read_back(&store, &investments);
    let record = Record::Investment(InvestmentPosition {
        name: "Half".into(),
        platform: "Broker".into(),
        r#type: "ETF".into(),
        opening_date: d(2024, 1, 1),
        amount_opening: Decimal::from(10),
        closing_date: Some(d(2024, 2, 1)),
        amount_closing: None,
        comments: None,
    });
    assert!(matches!(
        append(&mut store, &investments, &current, record),
        Err(LedgerError::InvalidRecord(_))
    ));
    assert!(store.writes().is_empty());
}

#[test]
fn closing_a_position_sets_both_fields() {
    let investments = book("investments");
    let mut store = investments_store();
    let current = read_back(&store, &investments);
    let committed = close_position(
        &mut store,
        &investments,
        &current,
        "cdt",
        d(2024, 7, 1),
        Decimal::from(1100),
    )
    .unwrap();
    let cdt = committed
        .investments()
        .unwrap()
        .iter()
        .find(|p| p.name == "CDT")
        .unwrap();
    assert_eq!(cdt.closing_date, Some(d(2024, 7, 1)));
    assert_eq!(cdt.amount_closing, Some(Decimal::from(1100)));
    assert_eq!(read_back(&store, &investments), committed);
}

#[test]
fn closing_only_considers_open_positions() {
    let investments = book("investments");
    let mut store = investments_store();
    let current = read_back(&store, &investments);
    // one open and one closed "Apple": the open one is closed
    let committed = close_position(
        &mut store,
        &investments,
        &current,
        "Apple",
        d(2024, 6, 1),
        Decimal::from(650),
    )
    .unwrap();
    let open: Vec<&InvestmentPosition> = committed
        .investments()
        .unwrap()
        .iter()
        .filter(|p| p.is_active())
        .collect();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].name, "CDT");
}

#[test]
fn closing_errors_leave_store_alone() {
    let investments = book("investments");
    let mut store = investments_store();
    let current = read_back(&store, &investments);

    let missing = close_position(
        &mut store,
        &investments,
        &current,
        "Tesla",
        d(2024, 6, 1),
        Decimal::ONE,
    );
    assert!(matches!(missing, Err(LedgerError::InvalidRecord(_))));

    let backwards = close_position(
        &mut store,
        &investments,
        &current,
        "CDT",
        d(2023, 12, 31),
        Decimal::ONE,
    );
    assert!(matches!(backwards, Err(LedgerError::InvalidRecord(_))));
    assert!(store.writes().is_empty());
}
