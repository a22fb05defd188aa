// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Conversion between raw sheet rows and typed snapshots.

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{
    Book, BookKind, DatePolicy, Entries, InvestmentPosition, Snapshot, Transaction,
};
use crate::store::{RawRow, SheetData};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[ T].*)?$").expect("valid regex")
});
static YEAR_LAST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})(?:[ T].*)?$").expect("valid regex")
});
static THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(,\d{3})+(\.\d+)?$").expect("valid regex"));

/// Parses a calendar date, reading ambiguous numeric forms year-first.
///
/// A trailing time of day (`2024-01-05 00:00:00`) is ignored. When the year comes last
/// the month is read first, unless the first component cannot be a month.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Some(c) = YEAR_FIRST.captures(s) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = YEAR_LAST.captures(s) {
        let first: u32 = c[1].parse().ok()?;
        return if first > 12 {
            ymd(&c[3], &c[2], &c[1])
        } else {
            ymd(&c[3], &c[1], &c[2])
        };
    }
    None
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Boolean cells; an empty cell reads as false.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" | "" => Some(false),
        _ => None,
    }
}

pub fn format_flag(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

/// Parses an amount, tolerating a currency symbol and `,` thousands separators.
pub fn parse_amount(raw: &str, currency_symbol: &str) -> Option<Decimal> {
    let mut s = raw.trim();
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest.trim_start();
    }
    if !currency_symbol.is_empty() {
        s = s.strip_prefix(currency_symbol).unwrap_or(s).trim_start();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest;
    }
    let cleaned;
    if THOUSANDS.is_match(s) {
        cleaned = s.replace(',', "");
        s = &cleaned;
    }
    if s.is_empty() {
        return None;
    }
    let value = Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()?;
    Some(if negative { -value } else { value })
}

fn optional_text(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() { None } else { Some(t.to_string()) }
}

/// Something odd in the stored data that does not prevent reading it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DataIssue {
    DroppedRow { line: usize, value: String },
    UnknownCategory { line: usize, category: String },
    UnpairedClosing { line: usize, name: String },
}

impl DataIssue {
    pub fn line(&self) -> usize {
        match self {
            DataIssue::DroppedRow { line, .. }
            | DataIssue::UnknownCategory { line, .. }
            | DataIssue::UnpairedClosing { line, .. } => *line,
        }
    }
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssue::DroppedRow { line, value } => {
                write!(f, "line {}: dropped, unparsable date '{}'", line, value)
            }
            DataIssue::UnknownCategory { line, category } => {
                write!(f, "line {}: category '{}' not in vocabulary", line, category)
            }
            DataIssue::UnpairedClosing { line, name } => write!(
                f,
                "line {}: '{}' has only one of closing date / closing amount",
                line, name
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub snapshot: Snapshot,
    pub issues: Vec<DataIssue>,
}

fn check_header(data: &SheetData, book: &Book) -> LedgerResult<()> {
    if data.header.is_empty() {
        return Ok(());
    }
    let expected = book.columns();
    let matches = data.header.len() == expected.len()
        && data
            .header
            .iter()
            .zip(expected)
            .all(|(found, want)| found.trim().eq_ignore_ascii_case(want));
    if matches {
        Ok(())
    } else {
        Err(LedgerError::HeaderMismatch {
            sheet: book.sheet.clone(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: data.header.clone(),
        })
    }
}

fn is_blank(row: &RawRow) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn cell(row: &RawRow, idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

enum DateOutcome {
    Parsed(NaiveDate),
    Dropped,
}

fn required_date(
    raw: &str,
    line: usize,
    book: &Book,
    issues: &mut Vec<DataIssue>,
) -> LedgerResult<DateOutcome> {
    match parse_date(raw) {
        Some(d) => Ok(DateOutcome::Parsed(d)),
        None => match book.date_policy {
            DatePolicy::Reject => Err(LedgerError::InvalidDate {
                row: line,
                value: raw.to_string(),
            }),
            DatePolicy::Drop => {
                issues.push(DataIssue::DroppedRow {
                    line,
                    value: raw.to_string(),
                });
                Ok(DateOutcome::Dropped)
            }
        },
    }
}

fn amount(raw: &str, line: usize, book: &Book) -> LedgerResult<Decimal> {
    parse_amount(raw, &book.currency_symbol).ok_or_else(|| LedgerError::InvalidAmount {
        row: line,
        value: raw.to_string(),
    })
}

fn flag(raw: &str, line: usize, column: &'static str) -> LedgerResult<bool> {
    parse_flag(raw).ok_or_else(|| LedgerError::InvalidFlag {
        row: line,
        column,
        value: raw.to_string(),
    })
}

/// Turns raw sheet content into a typed snapshot of `book`.
///
/// Blank rows are skipped. Sheet line numbers in errors and issues count the header as
/// line 1.
pub fn normalize(data: &SheetData, book: &Book) -> LedgerResult<Normalized> {
    check_header(data, book)?;
    let mut issues = Vec::new();
    let lines = data
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !is_blank(row))
        .map(|(i, row)| (i + 2, row));

    let entries = match book.kind {
        BookKind::Spending { .. } => {
            let mut out = Vec::with_capacity(data.rows.len());
            for (line, row) in lines {
                let date = match required_date(cell(row, 0), line, book, &mut issues)? {
                    DateOutcome::Parsed(d) => d,
                    DateOutcome::Dropped => continue,
                };
                let category = cell(row, 2).trim().to_string();
                if !book.allows_category(&category) {
                    issues.push(DataIssue::UnknownCategory {
                        line,
                        category: category.clone(),
                    });
                }
                out.push(Transaction {
                    date,
                    amount: amount(cell(row, 1), line, book)?,
                    category,
                    description: optional_text(cell(row, 3)),
                    recurrent: flag(cell(row, 4), line, "recurrent")?,
                    include: flag(cell(row, 5), line, "include")?,
                });
            }
            Entries::Transactions(out)
        }
        BookKind::Investments => {
            let mut out = Vec::with_capacity(data.rows.len());
            for (line, row) in lines {
                let opening_date = match required_date(cell(row, 3), line, book, &mut issues)? {
                    DateOutcome::Parsed(d) => d,
                    DateOutcome::Dropped => continue,
                };
                let closing_raw = cell(row, 5).trim();
                let closing_date = if closing_raw.is_empty() {
                    None
                } else {
                    match required_date(closing_raw, line, book, &mut issues)? {
                        DateOutcome::Parsed(d) => Some(d),
                        DateOutcome::Dropped => continue,
                    }
                };
                let amount_closing = if cell(row, 6).trim().is_empty() {
                    None
                } else {
                    Some(amount(cell(row, 6), line, book)?)
                };
                let position = InvestmentPosition {
                    name: cell(row, 0).trim().to_string(),
                    platform: cell(row, 1).trim().to_string(),
                    r#type: cell(row, 2).trim().to_string(),
                    opening_date,
                    amount_opening: amount(cell(row, 4), line, book)?,
                    closing_date,
                    amount_closing,
                    comments: optional_text(cell(row, 7)),
                };
                if !book.allows_category(&position.r#type) {
                    issues.push(DataIssue::UnknownCategory {
                        line,
                        category: position.r#type.clone(),
                    });
                }
                if !position.is_paired() {
                    issues.push(DataIssue::UnpairedClosing {
                        line,
                        name: position.name.clone(),
                    });
                }
                out.push(position);
            }
            Entries::Investments(out)
        }
    };

    for issue in &issues {
        tracing::warn!(book = %book.id, %issue, "data issue");
    }
    Ok(Normalized {
        snapshot: Snapshot {
            book_id: book.id.clone(),
            entries,
        },
        issues,
    })
}

fn opt_date(d: Option<NaiveDate>) -> String {
    d.map(format_date).unwrap_or_default()
}

fn opt_amount(a: Option<Decimal>) -> String {
    a.map(|a| a.to_string()).unwrap_or_default()
}

/// Renders a snapshot in the fixed column order of its book, header first.
pub fn to_sheet(snapshot: &Snapshot, book: &Book) -> SheetData {
    let rows = match &snapshot.entries {
        Entries::Transactions(items) => items
            .iter()
            .map(|t| {
                vec![
                    format_date(t.date),
                    t.amount.to_string(),
                    t.category.clone(),
                    t.description.clone().unwrap_or_default(),
                    format_flag(t.recurrent),
                    format_flag(t.include),
                ]
            })
            .collect(),
        Entries::Investments(items) => items
            .iter()
            .map(|p| {
                vec![
                    p.name.clone(),
                    p.platform.clone(),
                    p.r#type.clone(),
                    format_date(p.opening_date),
                    p.amount_opening.to_string(),
                    opt_date(p.closing_date),
                    opt_amount(p.amount_closing),
                    p.comments.clone().unwrap_or_default(),
                ]
            })
            .collect(),
    };
    SheetData::new(book.columns(), rows)
}
