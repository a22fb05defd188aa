// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{SheetData, TableStore};
use crate::errors::StoreError;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// One `<sheet>.csv` file per sheet inside a directory.
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl TableStore for CsvStore {
    fn read(&self, sheet: &str, column_count: usize) -> Result<SheetData, StoreError> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "csv sheet missing, reading as empty");
            return Ok(SheetData::default());
        }
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;
        let mut records = rdr.records();
        let header = match records.next() {
            Some(rec) => rec?.iter().map(|s| s.to_string()).collect(),
            None => Vec::new(),
        };
        let mut rows = Vec::new();
        for rec in records {
            rows.push(rec?.iter().map(|s| s.to_string()).collect());
        }
        Ok(SheetData { header, rows }.fit_columns(column_count))
    }

    fn write(&mut self, sheet: &str, data: &SheetData) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.sheet_path(sheet);
        let tmp = tmp_path(&path);
        {
            let mut wtr = WriterBuilder::new().flexible(true).from_path(&tmp)?;
            wtr.write_record(&data.header)?;
            for row in &data.rows {
                wtr.write_record(row)?;
            }
            wtr.flush()?;
        }
        fs::rename(&tmp, &path)?;
        tracing::debug!(path = %path.display(), rows = data.rows.len(), "csv overwrite");
        Ok(())
    }
}
