// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{SheetData, TableStore};
use crate::errors::StoreError;
use rusqlite::{Connection, OptionalExtension, params};

/// Sheets kept in a local SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps an already initialized connection (see [`crate::db::init_schema`]).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn decode_cells(sheet: &str, raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|e| StoreError::Malformed {
        sheet: sheet.to_string(),
        detail: format!("invalid cells '{}': {}", raw, e),
    })
}

impl TableStore for SqliteStore {
    fn read(&self, sheet: &str, column_count: usize) -> Result<SheetData, StoreError> {
        let header: Option<String> = self
            .conn
            .query_row(
                "SELECT header FROM sheets WHERE name=?1",
                params![sheet],
                |r| r.get(0),
            )
            .optional()?;
        let Some(header) = header else {
            tracing::debug!(sheet, "sqlite sheet missing, reading as empty");
            return Ok(SheetData::default());
        };

        let mut stmt = self
            .conn
            .prepare_cached("SELECT cells FROM sheet_rows WHERE sheet=?1 ORDER BY position")?;
        let lines = stmt.query_map(params![sheet], |r| r.get::<_, String>(0))?;
        let mut rows = Vec::new();
        for line in lines {
            rows.push(decode_cells(sheet, &line?)?);
        }
        tracing::debug!(sheet, rows = rows.len(), "sqlite read");
        Ok(SheetData {
            header: decode_cells(sheet, &header)?,
            rows,
        }
        .fit_columns(column_count))
    }

    fn write(&mut self, sheet: &str, data: &SheetData) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sheet_rows WHERE sheet=?1", params![sheet])?;
        tx.execute(
            "INSERT INTO sheets(name, header) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET header=excluded.header, updated_at=datetime('now')",
            params![sheet, serde_json::to_string(&data.header)?],
        )?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO sheet_rows(sheet, position, cells) VALUES (?1, ?2, ?3)",
            )?;
            for (position, row) in data.rows.iter().enumerate() {
                insert.execute(params![sheet, position as i64, serde_json::to_string(row)?])?;
            }
        }
        tx.commit()?;
        tracing::debug!(sheet, rows = data.rows.len(), "sqlite overwrite");
        Ok(())
    }
}
