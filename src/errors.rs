// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures raised by a [`crate::store::TableStore`] adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed response for sheet '{sheet}': {detail}")]
    Malformed { sheet: String, detail: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the ledger model, reconciliation flow and session.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Unknown book '{0}'")]
    UnknownBook(String),
    #[error("No book selected")]
    NoBookSelected,
    #[error("Category '{category}' is not valid for book '{book}'")]
    UnknownCategory { book: String, category: String },
    #[error("Invalid date '{value}' (row {row})")]
    InvalidDate { row: usize, value: String },
    #[error("Invalid amount '{value}' (row {row})")]
    InvalidAmount { row: usize, value: String },
    #[error("Invalid flag '{value}' in column '{column}' (row {row})")]
    InvalidFlag {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Header mismatch for sheet '{sheet}': expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        sheet: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("Snapshot shape does not match book '{0}'")]
    ShapeMismatch(String),
    #[error("{0}")]
    InvalidRecord(String),
    #[error("Amounts are too large to total")]
    Overflow,
    #[error("Book '{0}' has rows that could not be read; fix them in the sheet before writing")]
    DroppedRows(String),
    #[error("Incorrect PIN")]
    PinMismatch,
    #[error("Writes are disabled for the demo identity")]
    DemoReadOnly,
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// True for errors the user can fix by correcting input.
    pub fn is_validation(&self) -> bool {
        !matches!(self, LedgerError::Store(_))
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
