// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::select_book;
use crate::aggregate::{
    CategoryPivot, CurrentMonth, FlagSet, Filters, MonthlyTotals, category_pivot,
};
use crate::models::Book;
use crate::session::Session;
use crate::store::TableStore;
use crate::utils::{
    fmt_money, maybe_print_json, parse_flag_list, parse_month, pretty_table, render_view, today,
};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
pub struct Report {
    pub book: String,
    pub filters: Filters,
    pub totals: MonthlyTotals,
    pub pivot: Option<CategoryPivot>,
}

pub fn filters_from(sub: &clap::ArgMatches) -> Result<Filters> {
    let mut filters = Filters::default();
    if let Some(v) = sub.get_one::<String>("recurrent") {
        filters.recurrent = FlagSet::from_values(&parse_flag_list(v)?);
    }
    if let Some(v) = sub.get_one::<String>("include") {
        filters.include = FlagSet::from_values(&parse_flag_list(v)?);
    }
    Ok(filters)
}

fn as_of_from(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("month") {
        Some(m) => parse_month(m),
        None => Ok(today()),
    }
}

pub fn build_report<S: TableStore>(
    session: &Session<S>,
    filters: &Filters,
    as_of: NaiveDate,
) -> Result<Report> {
    let book = session.book()?;
    let totals = session.monthly_totals(filters, as_of)?;
    let pivot = session
        .snapshot()?
        .transactions()
        .map(|items| category_pivot(items, book, filters))
        .transpose()?;
    Ok(Report {
        book: book.id.clone(),
        filters: *filters,
        totals,
        pivot,
    })
}

pub fn handle<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    select_book(session, sub)?;
    let filters = filters_from(sub)?;
    let as_of = as_of_from(sub)?;

    if json_flag || jsonl_flag {
        let report = build_report(session, &filters, as_of)?;
        maybe_print_json(json_flag, jsonl_flag, &report)?;
        return Ok(());
    }

    let failed = render_report(session, &filters, as_of)?;
    tracing::debug!(failed, "report rendered");
    Ok(())
}

/// Prints every view of the selected book; returns how many could not be rendered.
pub fn render_report<S: TableStore>(
    session: &Session<S>,
    filters: &Filters,
    as_of: NaiveDate,
) -> Result<usize> {
    let book = session.book()?.clone();
    if session.is_demo() {
        println!("Amounts are randomized for this identity.");
    }
    let views = [
        render_view("current month", || {
            let totals = session.monthly_totals(filters, as_of)?;
            print_current(&totals.current, &book);
            Ok(())
        }),
        render_view("monthly series", || {
            let totals = session.monthly_totals(filters, as_of)?;
            if totals.series.is_empty() {
                return Ok(());
            }
            println!("{}", series_table(&totals, &book));
            Ok(())
        }),
        render_view("category pivot", || {
            let Some(items) = session.snapshot()?.transactions() else {
                return Ok(());
            };
            let pivot = category_pivot(items, &book, filters)?;
            if pivot.rows.is_empty() {
                println!("No rows match the filters.");
                return Ok(());
            }
            println!("{}", pivot_table(&pivot));
            Ok(())
        }),
    ];
    Ok(views.iter().filter(|ok| !**ok).count())
}

fn print_current(current: &CurrentMonth, book: &Book) {
    let sym = book.currency_symbol.as_str();
    match current {
        CurrentMonth::Spending {
            month,
            spent,
            balance,
            ..
        } => {
            println!("{}: this month you have spent {}", month, fmt_money(spent, sym));
            if let Some(balance) = balance {
                println!("{}: this month your balance is {}", month, fmt_money(balance, sym));
            }
        }
        CurrentMonth::Investments {
            month,
            invested,
            received,
        } => {
            println!("{}: this month you have invested {}", month, fmt_money(invested, sym));
            println!("{}: this month you have received {}", month, fmt_money(received, sym));
        }
    }
}

fn series_table(totals: &MonthlyTotals, book: &Book) -> comfy_table::Table {
    let split = totals.series.iter().any(|p| p.include.is_some());
    let rows = totals
        .series
        .iter()
        .map(|p| {
            let mut row = vec![p.month.to_string()];
            if split {
                row.push(p.include.map(|i| i.to_string()).unwrap_or_default());
            }
            row.push(fmt_money(&p.total, &book.currency_symbol));
            row
        })
        .collect();
    if split {
        pretty_table(&["Month", "Include", "Total"], rows)
    } else {
        pretty_table(&["Month", "Total"], rows)
    }
}

fn pivot_table(pivot: &CategoryPivot) -> comfy_table::Table {
    let mut header = vec!["Month".to_string()];
    header.extend(pivot.header());
    let header_refs: Vec<&str> = header.iter().map(String::as_str).collect();
    let rows = pivot
        .rows
        .iter()
        .map(|r| {
            let mut row = vec![r.month.to_string()];
            row.extend(r.cells.iter().map(|c| format!("{:.0}", c)));
            row.push(format!("{:.0}", r.total));
            row
        })
        .collect();
    pretty_table(&header_refs, rows)
}
