// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::select_book;
use crate::ledger::to_sheet;
use crate::session::Session;
use crate::store::TableStore;
use anyhow::{Result, anyhow};

pub fn handle<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|f| f.to_lowercase())
        .unwrap_or_else(|| "csv".into());
    let out = sub
        .get_one::<String>("out")
        .ok_or_else(|| anyhow!("--out is required"))?;
    select_book(session, sub)?;
    let book = session.book()?;
    let snapshot = session.snapshot()?;

    match fmt.as_str() {
        // Same layout as the sheet, so the file can be edited and fed back to `commit`.
        "csv" => {
            let sheet = to_sheet(snapshot, book);
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(&sheet.header)?;
            for row in &sheet.rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&snapshot.entries)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    println!("Exported {} rows of '{}' to {}", snapshot.len(), book.id, out);
    Ok(())
}
