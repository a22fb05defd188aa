// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::select_book;
use crate::ledger::DataIssue;
use crate::models::Entries;
use crate::session::Session;
use crate::store::TableStore;
use crate::utils::pretty_table;
use anyhow::Result;

/// Issue code and detail for every questionable row of the selected book.
pub fn findings<S: TableStore>(session: &Session<S>) -> Result<Vec<Vec<String>>> {
    let mut rows: Vec<Vec<String>> = session
        .issues()
        .iter()
        .map(|issue| {
            let code = match issue {
                DataIssue::DroppedRow { .. } => "dropped_row",
                DataIssue::UnknownCategory { .. } => "unknown_category",
                DataIssue::UnpairedClosing { .. } => "unpaired_closing",
            };
            vec![code.to_string(), issue.to_string()]
        })
        .collect();
    if !session.writes_enabled() {
        rows.push(vec![
            "writes_disabled".into(),
            "no PIN configured, demo identity or dropped rows".into(),
        ]);
    }

    match &session.snapshot()?.entries {
        Entries::Transactions(items) => {
            for t in items.iter().filter(|t| t.amount.is_zero()) {
                rows.push(vec![
                    "zero_amount".into(),
                    format!("{} {}", t.date, t.category),
                ]);
            }
        }
        Entries::Investments(items) => {
            for p in items {
                if p.amount_opening.is_sign_negative() && !p.amount_opening.is_zero() {
                    rows.push(vec!["negative_opening".into(), p.name.clone()]);
                }
                if p.closing_date.is_some_and(|c| c < p.opening_date) {
                    rows.push(vec!["closed_before_opened".into(), p.name.clone()]);
                }
            }
        }
    }
    Ok(rows)
}

pub fn handle<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    select_book(session, sub)?;
    let rows = findings(session)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
