// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{SheetData, TableStore};
use crate::errors::StoreError;
use reqwest::Url;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::Deserialize;
use serde_json::{Number, Value, json};
use std::str::FromStr;

const UA: &str = concat!(
    "moneysheet/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/moneysheet)"
);

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

/// Google Sheets values API adapter. One spreadsheet, one tab per book.
pub struct SheetsStore {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsStore {
    pub fn new(spreadsheet_id: &str, token: &str) -> Result<Self, StoreError> {
        Self::with_base_url(DEFAULT_BASE_URL, spreadsheet_id, token)
    }

    pub fn with_base_url(
        base_url: &str,
        spreadsheet_id: &str,
        token: &str,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .user_agent(UA)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            token: token.to_string(),
        })
    }

    pub fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| StoreError::Unavailable(format!("bad base url '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable(format!("bad base url '{}'", self.base_url)))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }
}

/// Spreadsheet column letter for a 1-based index (1 -> A, 27 -> AA).
pub fn column_letter(mut index: usize) -> String {
    let mut out = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        out.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// A1 notation for `sheet`, quoting names that are not plain identifiers.
pub fn a1_range(sheet: &str, from: &str, to: Option<&str>) -> String {
    let name = if sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    };
    match to {
        Some(to) => format!("{}!{}:{}", name, from, to),
        None => format!("{}!{}", name, from),
    }
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".into(),
        Value::Bool(false) => "FALSE".into(),
        other => other.to_string(),
    }
}

fn exact_number(cell: &str) -> Option<Number> {
    let value = Decimal::from_str(cell.trim()).ok()?;
    if value.scale() == 0 {
        return value.to_i64().map(Number::from);
    }
    let f = value.to_f64()?;
    if Decimal::from_f64(f)? != value {
        return None;
    }
    Number::from_f64(f)
}

fn typed_cell(column: &str, cell: &str) -> Value {
    let column = column.to_ascii_lowercase();
    if column.starts_with("amount") {
        if let Some(n) = exact_number(cell) {
            return Value::Number(n);
        }
    } else if column == "recurrent" || column == "include" {
        match cell {
            "TRUE" => return Value::Bool(true),
            "FALSE" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::String(cell.to_string())
}

/// Rows for a RAW update. Amount columns are sent as numbers and flag columns as
/// booleans; everything else, dates included, stays text. An amount that a JSON number
/// cannot carry exactly stays text.
pub fn typed_values(data: &SheetData) -> Vec<Vec<Value>> {
    let mut values = Vec::with_capacity(data.rows.len() + 1);
    values.push(data.header.iter().cloned().map(Value::String).collect());
    for row in &data.rows {
        values.push(
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    let column = data.header.get(i).map(String::as_str).unwrap_or("");
                    typed_cell(column, cell)
                })
                .collect(),
        );
    }
    values
}

/// Parses a `ValueRange` body; the first line is the header.
pub fn parse_value_range(sheet: &str, body: &str) -> Result<SheetData, StoreError> {
    let range: ValueRange = serde_json::from_str(body).map_err(|e| StoreError::Malformed {
        sheet: sheet.to_string(),
        detail: e.to_string(),
    })?;
    let mut lines = range
        .values
        .iter()
        .map(|line| line.iter().map(cell_text).collect::<Vec<_>>());
    let header = lines.next().unwrap_or_default();
    Ok(SheetData {
        header,
        rows: lines.collect(),
    })
}

impl TableStore for SheetsStore {
    fn read(&self, sheet: &str, column_count: usize) -> Result<SheetData, StoreError> {
        let range = a1_range(sheet, "A", Some(&column_letter(column_count)));
        let url = self.values_url(&range)?;
        tracing::debug!(%url, "sheets read");
        let body = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("majorDimension", "ROWS")])
            .send()?
            .error_for_status()?
            .text()?;
        Ok(parse_value_range(sheet, &body)?.fit_columns(column_count))
    }

    fn write(&mut self, sheet: &str, data: &SheetData) -> Result<(), StoreError> {
        // The values API has no replace primitive: clear the tab, then write from A1.
        let clear_url = self.values_url(&format!("{}:clear", sheet_only(sheet)))?;
        self.client
            .post(clear_url)
            .bearer_auth(&self.token)
            .json(&json!({}))
            .send()?
            .error_for_status()?;

        let range = a1_range(sheet, "A1", None);
        let url = self.values_url(&range)?;
        let values = typed_values(data);
        self.client
            .put(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": values }))
            .send()?
            .error_for_status()?;
        tracing::debug!(sheet, rows = data.rows.len(), "sheets overwrite");
        Ok(())
    }
}

fn sheet_only(sheet: &str) -> String {
    let a1 = a1_range(sheet, "A1", None);
    a1.trim_end_matches("!A1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(6), "F");
        assert_eq!(column_letter(8), "H");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
    }

    #[test]
    fn a1_quotes_names_with_spaces() {
        assert_eq!(a1_range("personal", "A", Some("F")), "personal!A:F");
        assert_eq!(a1_range("my book", "A1", None), "'my book'!A1");
        assert_eq!(sheet_only("my book"), "'my book'");
    }

    #[test]
    fn value_range_splits_header_and_stringifies_cells() {
        let body = r#"{
            "range": "personal!A1:F3",
            "majorDimension": "ROWS",
            "values": [
                ["date", "amount", "category", "description", "recurrent", "include"],
                ["2024-01-05", -50, "Salidas", "", true, true],
                ["2024-01-20", "2000"]
            ]
        }"#;
        let data = parse_value_range("personal", body).unwrap().fit_columns(6);
        assert_eq!(data.header[0], "date");
        assert_eq!(data.rows.len(), 2);
        assert_eq!(data.rows[0][1], "-50");
        assert_eq!(data.rows[0][4], "TRUE");
        assert_eq!(data.rows[1], vec!["2024-01-20", "2000", "", "", "", ""]);
    }

    #[test]
    fn amounts_and_flags_are_written_typed() {
        let data = SheetData {
            header: vec!["date".into(), "amount".into(), "description".into(), "include".into()],
            rows: vec![
                vec!["2024-01-05".into(), "-50".into(), "42".into(), "TRUE".into()],
                vec!["2024-01-06".into(), "10.25".into(), "".into(), "FALSE".into()],
                vec![
                    "2024-01-07".into(),
                    "0.1234567890123456789".into(),
                    "".into(),
                    "".into(),
                ],
            ],
        };
        let values = typed_values(&data);
        assert_eq!(values[0][1], json!("amount"));
        assert_eq!(values[1], vec![json!("2024-01-05"), json!(-50), json!("42"), json!(true)]);
        assert_eq!(values[2][1], json!(10.25));
        assert_eq!(values[2][3], json!(false));
        assert_eq!(values[3][1], json!("0.1234567890123456789"));
        assert_eq!(values[3][3], json!(""));

        let investments = SheetData {
            header: vec!["Name".into(), "Amount opening".into(), "Amount closing".into()],
            rows: vec![vec!["CDT".into(), "1000".into(), "".into()]],
        };
        let values = typed_values(&investments);
        assert_eq!(values[1], vec![json!("CDT"), json!(1000), json!("")]);
    }

    #[test]
    fn empty_value_range_reads_as_empty_sheet() {
        let data = parse_value_range("x", r#"{"range":"x!A1:F1"}"#).unwrap();
        assert!(data.header.is_empty());
        assert!(data.rows.is_empty());
    }

    #[test]
    fn malformed_body_is_reported() {
        assert!(matches!(
            parse_value_range("x", "not json"),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn values_url_encodes_range_segment() {
        let store = SheetsStore::with_base_url("https://example.test/v4/spreadsheets/", "abc", "t")
            .unwrap();
        let url = store.values_url("'my book'!A1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/v4/spreadsheets/abc/values/'my%20book'!A1"
        );
    }
}
