// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::select_book;
use crate::ledger::{Normalized, normalize};
use crate::models::Book;
use crate::session::Session;
use crate::store::{SheetData, TableStore};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use std::path::Path;

/// Reads an edited CSV (header row first) as the full content of `book`.
pub fn read_edited(path: &Path, book: &Book) -> Result<Normalized> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let mut records = rdr.records();
    let header = match records.next() {
        Some(rec) => rec?.iter().map(|c| c.trim().to_string()).collect(),
        None => Vec::new(),
    };
    let mut rows = Vec::new();
    for result in records {
        let rec = result?;
        rows.push(rec.iter().map(str::to_string).collect());
    }
    let data = SheetData { header, rows }.fit_columns(book.column_count());
    Ok(normalize(&data, book)?)
}

pub fn handle<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub
        .get_one::<String>("path")
        .ok_or_else(|| anyhow!("--path is required"))?
        .trim()
        .to_string();
    let pin = sub
        .get_one::<String>("pin")
        .ok_or_else(|| anyhow!("--pin is required"))?;
    select_book(session, sub)?;
    let book = session.book()?.clone();

    let edited = read_edited(Path::new(&path), &book)?;
    for issue in &edited.issues {
        eprintln!("{}: {}", path, issue);
    }
    let rows = session
        .commit(edited.snapshot, pin)
        .with_context(|| format!("Commit of '{}' rejected", book.id))?
        .len();
    println!("Committed {} rows from {} to '{}'", rows, path, book.id);
    Ok(())
}
