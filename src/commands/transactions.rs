// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::select_book;
use crate::errors::LedgerError;
use crate::models::{Record, Transaction, YearMonth};
use crate::session::Session;
use crate::store::TableStore;
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::{Result, anyhow};
use serde::Serialize;

pub fn handle<S: TableStore>(session: &mut Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("list", sub)) => list(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn flag(sub: &clap::ArgMatches, name: &str) -> Result<bool> {
    let raw = sub.get_one::<String>(name).map(String::as_str).unwrap_or("true");
    crate::ledger::parse_flag(raw).ok_or_else(|| anyhow!("Invalid --{} value '{}'", name, raw))
}

fn add<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    select_book(session, sub)?;
    let symbol = session.book()?.currency_symbol.clone();
    let date = parse_date(required(sub, "date")?)?;
    let amount = parse_decimal(required(sub, "amount")?, &symbol)?;
    let category = required(sub, "category")?.trim().to_string();
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let transaction = Transaction {
        date,
        amount,
        category: category.clone(),
        description,
        recurrent: flag(sub, "recurrent")?,
        include: flag(sub, "include")?,
    };

    let pin = required(sub, "pin")?;
    let rows = session.append(Record::Transaction(transaction), pin)?.len();
    println!(
        "Recorded {} on {} in '{}' ({} rows)",
        fmt_money(&amount, &symbol),
        date,
        category,
        rows
    );
    Ok(())
}

fn required<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("--{} is required", name))
}

fn list<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    select_book(session, sub)?;
    let data = query_rows(session, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.recurrent.to_string(),
                    r.include.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Amount", "Category", "Description", "Recurrent", "Include"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub recurrent: bool,
    pub include: bool,
}

/// Transactions of the selected book, most recent first.
pub fn query_rows<S: TableStore>(
    session: &Session<S>,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let book = session.book()?;
    let items = session
        .snapshot()?
        .transactions()
        .ok_or_else(|| LedgerError::ShapeMismatch(book.id.clone()))?;

    let month = sub
        .get_one::<String>("month")
        .map(|m| parse_month(m).map(YearMonth::of))
        .transpose()?;
    let category = sub.get_one::<String>("category").map(|c| c.trim());

    let mut selected: Vec<&Transaction> = items
        .iter()
        .filter(|t| month.is_none_or(|m| YearMonth::of(t.date) == m))
        .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
        .collect();
    // snapshot order is ascending; later rows of the same day come first
    selected.reverse();
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        selected.truncate(*limit);
    }

    Ok(selected
        .into_iter()
        .map(|t| TransactionRow {
            date: t.date.to_string(),
            amount: t.amount.to_string(),
            category: t.category.clone(),
            description: t.description.clone().unwrap_or_default(),
            recurrent: t.recurrent,
            include: t.include,
        })
        .collect())
}
