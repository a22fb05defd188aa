// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Tabular stores holding one sheet per book.
//!
//! Every adapter speaks the same row-oriented shape: a header line followed by data rows
//! of plain strings, where an empty string is an absent cell. Writes always replace the
//! whole sheet.

pub mod csv_dir;
pub mod sheets;
pub mod sqlite;

use crate::errors::StoreError;
use std::collections::HashMap;

pub use csv_dir::CsvStore;
pub use sheets::SheetsStore;
pub use sqlite::SqliteStore;

pub type RawRow = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetData {
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl SheetData {
    pub fn new(header: &[&str], rows: Vec<RawRow>) -> Self {
        Self {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    /// Pads or truncates every line to `column_count` cells.
    pub fn fit_columns(mut self, column_count: usize) -> Self {
        self.header.resize(column_count, String::new());
        for row in &mut self.rows {
            row.resize(column_count, String::new());
        }
        if self.header.iter().all(|h| h.trim().is_empty()) {
            self.header.clear();
        }
        self
    }
}

pub trait TableStore {
    /// Reads the first `column_count` columns of `sheet`. A missing sheet reads as empty.
    fn read(&self, sheet: &str, column_count: usize) -> Result<SheetData, StoreError>;

    /// Replaces the entire content of `sheet`.
    fn write(&mut self, sheet: &str, data: &SheetData) -> Result<(), StoreError>;
}

impl<T: TableStore + ?Sized> TableStore for Box<T> {
    fn read(&self, sheet: &str, column_count: usize) -> Result<SheetData, StoreError> {
        (**self).read(sheet, column_count)
    }

    fn write(&mut self, sheet: &str, data: &SheetData) -> Result<(), StoreError> {
        (**self).write(sheet, data)
    }
}

/// Process-local store. Keeps a log of every write so callers can observe them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: HashMap<String, SheetData>,
    writes: Vec<(String, SheetData)>,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: &str, header: &[&str], rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(str::to_string).collect())
            .collect();
        self.sheets
            .insert(sheet.to_string(), SheetData::new(header, rows));
        self
    }

    pub fn sheet(&self, sheet: &str) -> Option<&SheetData> {
        self.sheets.get(sheet)
    }

    pub fn writes(&self) -> &[(String, SheetData)] {
        &self.writes
    }

    /// While offline every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }
}

impl TableStore for MemoryStore {
    fn read(&self, sheet: &str, column_count: usize) -> Result<SheetData, StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable(format!("memory store offline ({sheet})")));
        }
        let data = self.sheets.get(sheet).cloned().unwrap_or_default();
        Ok(data.fit_columns(column_count))
    }

    fn write(&mut self, sheet: &str, data: &SheetData) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable(format!("memory store offline ({sheet})")));
        }
        self.sheets.insert(sheet.to_string(), data.clone());
        self.writes.push((sheet.to_string(), data.clone()));
        Ok(())
    }
}
