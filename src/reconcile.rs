// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Writing an edited snapshot back to the store.
//!
//! The store only offers whole-sheet overwrites, so every mutation (full edit, single
//! append, closing a position) goes through [`commit`].

use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::to_sheet;
use crate::models::{Book, Entries, InvestmentPosition, Record, Snapshot};
use crate::store::TableStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Checks shape and vocabulary before anything is written.
pub fn validate(snapshot: &Snapshot, book: &Book) -> LedgerResult<()> {
    if snapshot.book_id != book.id || !snapshot.entries.matches(book.kind) {
        return Err(LedgerError::ShapeMismatch(book.id.clone()));
    }
    let labels: Vec<&str> = match &snapshot.entries {
        Entries::Transactions(items) => items.iter().map(|t| t.category.as_str()).collect(),
        Entries::Investments(items) => items.iter().map(|p| p.r#type.as_str()).collect(),
    };
    if let Some(bad) = labels.into_iter().find(|l| !book.allows_category(l)) {
        return Err(LedgerError::UnknownCategory {
            book: book.id.clone(),
            category: bad.to_string(),
        });
    }
    Ok(())
}

/// Ascending by the primary date; rows sharing a date keep their relative order.
pub fn canonical_order(mut snapshot: Snapshot) -> Snapshot {
    match &mut snapshot.entries {
        Entries::Transactions(items) => items.sort_by_key(|t| t.date),
        Entries::Investments(items) => items.sort_by_key(|p| p.opening_date),
    }
    snapshot
}

/// Persists `edited` as the complete content of the book's sheet.
///
/// Returns the snapshot exactly as written. Nothing is written when validation fails.
pub fn commit<S: TableStore + ?Sized>(
    store: &mut S,
    book: &Book,
    edited: Snapshot,
) -> LedgerResult<Snapshot> {
    validate(&edited, book)?;
    let committed = canonical_order(edited);
    let sheet = to_sheet(&committed, book);
    store.write(&book.sheet, &sheet)?;
    tracing::info!(book = %book.id, rows = committed.len(), "committed snapshot");
    Ok(committed)
}

fn check_record(record: &Record, book: &Book) -> LedgerResult<()> {
    match record {
        Record::Investment(p) => {
            if p.name.trim().is_empty() {
                return Err(LedgerError::InvalidRecord(
                    "Investment name must not be empty".into(),
                ));
            }
            if !p.is_paired() {
                return Err(LedgerError::InvalidRecord(format!(
                    "Investment '{}' needs both closing date and closing amount, or neither",
                    p.name
                )));
            }
        }
        Record::Transaction(_) => {}
    }
    let label = match record {
        Record::Transaction(t) => &t.category,
        Record::Investment(p) => &p.r#type,
    };
    if !book.allows_category(label) {
        return Err(LedgerError::UnknownCategory {
            book: book.id.clone(),
            category: label.clone(),
        });
    }
    Ok(())
}

/// Appends one record to a copy of `current` and commits the whole table.
pub fn append<S: TableStore + ?Sized>(
    store: &mut S,
    book: &Book,
    current: &Snapshot,
    record: Record,
) -> LedgerResult<Snapshot> {
    check_record(&record, book)?;
    let mut next = current.clone();
    match (&mut next.entries, record) {
        (Entries::Transactions(items), Record::Transaction(t)) => items.push(t),
        (Entries::Investments(items), Record::Investment(p)) => items.push(p),
        _ => return Err(LedgerError::ShapeMismatch(book.id.clone())),
    }
    commit(store, book, next)
}

fn open_position_index(items: &[InvestmentPosition], name: &str) -> LedgerResult<usize> {
    let matches: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_active() && p.name.eq_ignore_ascii_case(name.trim()))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [idx] => Ok(*idx),
        [] => Err(LedgerError::InvalidRecord(format!(
            "No open investment named '{}'",
            name
        ))),
        _ => Err(LedgerError::InvalidRecord(format!(
            "{} open investments are named '{}'",
            matches.len(),
            name
        ))),
    }
}

/// Records the closing of the open investment called `name`.
pub fn close_position<S: TableStore + ?Sized>(
    store: &mut S,
    book: &Book,
    current: &Snapshot,
    name: &str,
    closing_date: NaiveDate,
    amount_closing: Decimal,
) -> LedgerResult<Snapshot> {
    let mut next = current.clone();
    let Entries::Investments(items) = &mut next.entries else {
        return Err(LedgerError::ShapeMismatch(book.id.clone()));
    };
    let idx = open_position_index(items, name)?;
    let position = &mut items[idx];
    if closing_date < position.opening_date {
        return Err(LedgerError::InvalidRecord(format!(
            "Closing date {} is before opening date {}",
            closing_date, position.opening_date
        )));
    }
    position.closing_date = Some(closing_date);
    position.amount_closing = Some(amount_closing);
    commit(store, book, next)
}
