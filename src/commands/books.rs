// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::BookRegistry;
use crate::models::{AmountSign, BookKind};
use crate::utils::pretty_table;
use anyhow::Result;

fn kind_label(kind: BookKind) -> &'static str {
    match kind {
        BookKind::Spending {
            sign: AmountSign::Signed,
        } => "spending (signed)",
        BookKind::Spending {
            sign: AmountSign::Magnitude,
        } => "spending",
        BookKind::Investments => "investments",
    }
}

pub fn book_rows(books: &BookRegistry) -> Vec<Vec<String>> {
    books
        .iter()
        .map(|b| {
            vec![
                b.id.clone(),
                b.title.clone(),
                b.sheet.clone(),
                b.currency_symbol.clone(),
                kind_label(b.kind).to_string(),
                b.categories.join(", "),
            ]
        })
        .collect()
}

pub fn handle(books: &BookRegistry) -> Result<()> {
    println!(
        "{}",
        pretty_table(
            &["Book", "Title", "Sheet", "CCY", "Kind", "Categories"],
            book_rows(books)
        )
    );
    Ok(())
}
