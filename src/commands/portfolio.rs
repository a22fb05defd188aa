// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::select_book;
use crate::aggregate::{PositionMetrics, TypeSummary, portfolio_summary, position_metrics};
use crate::errors::LedgerError;
use crate::models::{InvestmentPosition, Record};
use crate::session::Session;
use crate::store::TableStore;
use crate::utils::{fmt_money, fmt_ratio, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

pub fn handle<S: TableStore>(session: &mut Session<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(session, sub)?,
        Some(("summary", sub)) => summary(session, sub)?,
        Some(("add", sub)) => add(session, sub)?,
        Some(("close", sub)) => close(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn text<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("--{} is required", name))
}

fn positions<S: TableStore>(session: &Session<S>) -> Result<&[InvestmentPosition]> {
    let book = session.book()?;
    Ok(session
        .snapshot()?
        .investments()
        .ok_or_else(|| LedgerError::ShapeMismatch(book.id.clone()))?)
}

#[derive(Debug, Serialize)]
pub struct PositionRow {
    #[serde(flatten)]
    pub position: InvestmentPosition,
    #[serde(flatten)]
    pub metrics: PositionMetrics,
}

/// Positions with their derived metrics, optionally only the open ones.
pub fn position_rows<S: TableStore>(session: &Session<S>, active_only: bool) -> Result<Vec<PositionRow>> {
    Ok(positions(session)?
        .iter()
        .filter(|p| !active_only || p.is_active())
        .map(|p| PositionRow {
            metrics: position_metrics(p),
            position: p.clone(),
        })
        .collect())
}

fn list<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    select_book(session, sub)?;
    let data = position_rows(session, sub.get_flag("active"))?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }

    let sym = session.book()?.currency_symbol.clone();
    let money = |d: Option<Decimal>| match d {
        Some(d) => fmt_money(&d, &sym),
        None => "n/a".to_string(),
    };
    let rows = data
        .iter()
        .map(|r| {
            let p = &r.position;
            vec![
                p.name.clone(),
                p.platform.clone(),
                p.r#type.clone(),
                p.opening_date.to_string(),
                fmt_money(&p.amount_opening, &sym),
                p.closing_date.map(|d| d.to_string()).unwrap_or_default(),
                money(p.amount_closing),
                money(r.metrics.earnings),
                fmt_ratio(r.metrics.roi.and_then(|d| d.to_f64())),
                fmt_ratio(r.metrics.annualized_return),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Name", "Platform", "Type", "Opened", "Opening", "Closed", "Closing", "Earnings",
                "ROI", "Annualized",
            ],
            rows,
        )
    );
    Ok(())
}

fn summary<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    select_book(session, sub)?;
    let book = session.book()?;
    let data: Vec<TypeSummary> = portfolio_summary(positions(session)?, book)?;
    if maybe_print_json(json_flag, jsonl_flag, &data)? {
        return Ok(());
    }
    let sym = book.currency_symbol.as_str();
    let rows = data
        .iter()
        .map(|s| {
            vec![
                s.r#type.clone(),
                s.open_positions.to_string(),
                s.closed_positions.to_string(),
                fmt_money(&s.active_capital, sym),
                fmt_money(&s.realized_earnings, sym),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Type", "Open", "Closed", "Active capital", "Realized"], rows)
    );
    Ok(())
}

fn add<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    select_book(session, sub)?;
    let symbol = session.book()?.currency_symbol.clone();
    let position = InvestmentPosition {
        name: text(sub, "name")?.to_string(),
        platform: text(sub, "platform")?.to_string(),
        r#type: text(sub, "type")?.to_string(),
        opening_date: parse_date(text(sub, "opening-date")?)?,
        amount_opening: parse_decimal(text(sub, "amount")?, &symbol)?,
        closing_date: None,
        amount_closing: None,
        comments: sub
            .get_one::<String>("comments")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
    };
    let summary = format!(
        "Opened '{}' on {} with {}",
        position.name,
        position.opening_date,
        fmt_money(&position.amount_opening, &symbol)
    );
    session.append(Record::Investment(position), text(sub, "pin")?)?;
    println!("{}", summary);
    Ok(())
}

fn close<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    select_book(session, sub)?;
    let symbol = session.book()?.currency_symbol.clone();
    let name = text(sub, "name")?;
    let date = parse_date(text(sub, "date")?)?;
    let amount = parse_decimal(text(sub, "amount")?, &symbol)?;
    session.close_position(name, date, amount, text(sub, "pin")?)?;

    let closed = positions(session)?
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name) && p.closing_date == Some(date));
    match closed.map(position_metrics).and_then(|m| m.earnings) {
        Some(earnings) => println!(
            "Closed '{}' on {}, earnings {}",
            name,
            date,
            fmt_money(&earnings, &symbol)
        ),
        None => println!("Closed '{}' on {}", name, date),
    }
    Ok(())
}
