// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneysheet::config::BookRegistry;
use moneysheet::gate::AccessGate;
use moneysheet::models::TRANSACTION_COLUMNS;
use moneysheet::session::Session;
use moneysheet::store::MemoryStore;
use moneysheet::{cli, commands::transactions};

fn setup() -> Session<MemoryStore> {
    let store = MemoryStore::new().with_sheet(
        "personal",
        &TRANSACTION_COLUMNS,
        vec![
            vec!["2025-01-01", "-10", "Salidas", "", "TRUE", "TRUE"],
            vec!["2025-01-02", "-10", "Transporte", "bus", "FALSE", "TRUE"],
            vec!["2025-01-03", "-10", "Salidas", "", "TRUE", "TRUE"],
            vec!["2025-02-01", "2000", "Salario", "", "TRUE", "TRUE"],
        ],
    );
    Session::new(store, BookRegistry::builtin(), AccessGate::new(Some("1234")))
}

fn tx_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["moneysheet", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("tx", tx_m)) => tx_m.clone(),
        _ => panic!("no tx subcommand"),
    }
}

#[test]
fn list_limit_respected() {
    let mut session = setup();
    session.select("colombia").unwrap();
    let tx_m = tx_matches(&["list", "--book", "colombia", "--limit", "2"]);
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::query_rows(&session, list_m).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-02-01");
    assert_eq!(rows[1].date, "2025-01-03");
}

#[test]
fn list_filters_by_month_and_category() {
    let mut session = setup();
    session.select("colombia").unwrap();
    let tx_m = tx_matches(&[
        "list", "--book", "colombia", "--month", "2025-01", "--category", "salidas",
    ]);
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = transactions::query_rows(&session, list_m).unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-01-03", "2025-01-01"]);
    assert!(rows.iter().all(|r| r.category == "Salidas"));
}

#[test]
fn add_appends_and_rewrites_whole_sheet() {
    let mut session = setup();
    let tx_m = tx_matches(&[
        "add", "--book", "colombia", "--date", "2025-01-15", "--amount", "-25.50",
        "--category", "Compras", "--description", "shoes", "--recurrent", "false", "--pin", "1234",
    ]);
    transactions::handle(&mut session, &tx_m).unwrap();

    let writes = session.store().writes();
    assert_eq!(writes.len(), 1);
    let (sheet, data) = &writes[0];
    assert_eq!(sheet, "personal");
    assert_eq!(data.rows.len(), 5);
    assert_eq!(
        data.rows[3],
        vec!["2025-01-15", "-25.50", "Compras", "shoes", "FALSE", "TRUE"]
    );
    assert_eq!(data.rows[4][0], "2025-02-01");
}

#[test]
fn add_with_wrong_pin_writes_nothing() {
    let mut session = setup();
    let tx_m = tx_matches(&[
        "add", "--book", "colombia", "--date", "2025-01-15", "--amount", "-5",
        "--category", "Compras", "--pin", "9999",
    ]);
    assert!(transactions::handle(&mut session, &tx_m).is_err());
    assert!(session.store().writes().is_empty());
    assert_eq!(session.snapshot().unwrap().len(), 4);
}

#[test]
fn add_rejects_category_outside_vocabulary() {
    let mut session = setup();
    let tx_m = tx_matches(&[
        "add", "--book", "colombia", "--date", "2025-01-15", "--amount", "-5",
        "--category", "Groceries", "--pin", "1234",
    ]);
    assert!(transactions::handle(&mut session, &tx_m).is_err());
    assert!(session.store().writes().is_empty());
}
