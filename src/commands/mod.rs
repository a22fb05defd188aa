// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod books;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod portfolio;
pub mod reports;
pub mod transactions;

use crate::session::Session;
use crate::store::TableStore;
use anyhow::{Context, Result};

/// Reads the `--book` argument and loads that book into the session.
pub(crate) fn select_book<S: TableStore>(session: &mut Session<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub
        .get_one::<String>("book")
        .context("--book is required")?
        .trim()
        .to_string();
    session
        .select(&id)
        .with_context(|| format!("Could not load book '{}'", id))?;
    Ok(())
}
