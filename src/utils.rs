// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. `RUST_LOG` wins over the built-in `moneysheet=warn`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("moneysheet=warn"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    crate::ledger::parse_date(s)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

pub fn parse_month(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s.trim()))
}

pub fn parse_decimal(s: &str, currency_symbol: &str) -> Result<Decimal> {
    crate::ledger::parse_amount(s, currency_symbol)
        .ok_or_else(|| anyhow!("Invalid decimal '{}'", s.trim()))
}

/// Parses `true,false`-style lists used by the filter flags.
pub fn parse_flag_list(s: &str) -> Result<Vec<bool>> {
    s.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            crate::ledger::parse_flag(p).ok_or_else(|| anyhow!("Invalid flag '{}'", p.trim()))
        })
        .collect()
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    if d.is_sign_negative() && !d.is_zero() {
        format!("-{}{:.2}", symbol, d.abs())
    } else {
        format!("{}{:.2}", symbol, d)
    }
}

pub fn fmt_ratio(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".into(),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Runs one independent view. A failure is reported inline and does not stop the
/// remaining views; the return value tells whether the view rendered.
pub fn render_view<F>(name: &str, view: F) -> bool
where
    F: FnOnce() -> Result<()>,
{
    match view() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(view = name, error = %e, "view failed");
            eprintln!("[{}] could not be rendered: {:#}", name, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_keeps_sign_in_front_of_symbol() {
        assert_eq!(fmt_money(&Decimal::new(-505, 1), "$"), "-$50.50");
        assert_eq!(fmt_money(&Decimal::from(1950), "\u{20ac}"), "\u{20ac}1950.00");
    }

    #[test]
    fn flag_lists_parse() {
        assert_eq!(parse_flag_list("true,false").unwrap(), vec![true, false]);
        assert_eq!(parse_flag_list("TRUE").unwrap(), vec![true]);
        assert!(parse_flag_list("true,perhaps").is_err());
    }

    #[test]
    fn failing_view_does_not_stop_the_next() {
        let first = render_view("broken", || Err(anyhow!("boom")));
        let second = render_view("fine", || Ok(()));
        assert!(!first);
        assert!(second);
    }

    #[test]
    fn ratios_print_undefined_as_na() {
        assert_eq!(fmt_ratio(Some(0.21)), "21.00%");
        assert_eq!(fmt_ratio(None), "n/a");
    }
}
