// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRANSACTION_COLUMNS: [&str; 6] = [
    "date",
    "amount",
    "category",
    "description",
    "recurrent",
    "include",
];

pub const INVESTMENT_COLUMNS: [&str; 8] = [
    "Name",
    "Platform",
    "Type",
    "Opening date",
    "Amount opening",
    "Closing date",
    "Amount closing",
    "Comments",
];

/// How amounts in a spending book are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSign {
    /// Negative amounts are expenses, positive amounts are income.
    Signed,
    /// Every amount is a spending magnitude.
    Magnitude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BookKind {
    Spending { sign: AmountSign },
    Investments,
}

/// What to do with a row whose date column cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    #[default]
    Reject,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub sheet: String,
    pub currency_symbol: String,
    pub categories: Vec<String>,
    #[serde(flatten)]
    pub kind: BookKind,
    #[serde(default)]
    pub date_policy: DatePolicy,
}

impl Book {
    pub fn columns(&self) -> &'static [&'static str] {
        match self.kind {
            BookKind::Spending { .. } => &TRANSACTION_COLUMNS,
            BookKind::Investments => &INVESTMENT_COLUMNS,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns().len()
    }

    pub fn allows_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn empty_snapshot(&self) -> Snapshot {
        let entries = match self.kind {
            BookKind::Spending { .. } => Entries::Transactions(Vec::new()),
            BookKind::Investments => Entries::Investments(Vec::new()),
        };
        Snapshot {
            book_id: self.id.clone(),
            entries,
        }
    }
}

fn vocabulary(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Books shipped with the binary; a settings file may replace them.
pub fn builtin_books() -> Vec<Book> {
    vec![
        Book {
            id: "italy".into(),
            title: "Italy".into(),
            sheet: "doubledeg".into(),
            currency_symbol: "\u{20ac}".into(),
            categories: vocabulary(&[
                "Administrativo",
                "Alojamiento",
                "Celular",
                "Comida U",
                "Compras varias",
                "Mercado",
                "Salidas",
                "Salud",
                "Transporte",
                "Viajes",
            ]),
            kind: BookKind::Spending {
                sign: AmountSign::Magnitude,
            },
            date_policy: DatePolicy::Reject,
        },
        Book {
            id: "colombia".into(),
            title: "Colombia".into(),
            sheet: "personal".into(),
            currency_symbol: "$".into(),
            categories: vocabulary(&[
                "Ahorros",
                "Salidas",
                "Transporte",
                "Compras",
                "Viajes",
                "Salario",
                "Clases particulares",
            ]),
            kind: BookKind::Spending {
                sign: AmountSign::Signed,
            },
            date_policy: DatePolicy::Reject,
        },
        Book {
            id: "investments".into(),
            title: "Investments".into(),
            sheet: "inversiones".into(),
            currency_symbol: "$".into(),
            categories: vocabulary(&["Acciones", "Fondo", "Divisas", "ETF", "Particular"]),
            kind: BookKind::Investments,
            date_policy: DatePolicy::Reject,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub recurrent: bool,
    pub include: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentPosition {
    pub name: String,
    pub platform: String,
    pub r#type: String,
    pub opening_date: NaiveDate,
    pub amount_opening: Decimal,
    pub closing_date: Option<NaiveDate>,
    pub amount_closing: Option<Decimal>,
    pub comments: Option<String>,
}

impl InvestmentPosition {
    pub fn is_active(&self) -> bool {
        self.closing_date.is_none()
    }

    /// Closing date and closing amount must be set together.
    pub fn is_paired(&self) -> bool {
        self.closing_date.is_some() == self.amount_closing.is_some()
    }
}

/// Records of a snapshot, tagged by the shape of the owning book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "rows", rename_all = "snake_case")]
pub enum Entries {
    Transactions(Vec<Transaction>),
    Investments(Vec<InvestmentPosition>),
}

impl Entries {
    pub fn len(&self) -> usize {
        match self {
            Entries::Transactions(v) => v.len(),
            Entries::Investments(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn matches(&self, kind: BookKind) -> bool {
        matches!(
            (self, kind),
            (Entries::Transactions(_), BookKind::Spending { .. })
                | (Entries::Investments(_), BookKind::Investments)
        )
    }
}

/// A single new record to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Transaction(Transaction),
    Investment(InvestmentPosition),
}

/// Full in-memory copy of one book's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub book_id: String,
    pub entries: Entries,
}

impl Snapshot {
    pub fn transactions(&self) -> Option<&[Transaction]> {
        match &self.entries {
            Entries::Transactions(v) => Some(v),
            Entries::Investments(_) => None,
        }
    }

    pub fn investments(&self) -> Option<&[InvestmentPosition]> {
        match &self.entries {
            Entries::Investments(v) => Some(v),
            Entries::Transactions(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Calendar month used as the grouping key of every monthly view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
