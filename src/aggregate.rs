// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly views derived from a snapshot. Everything here is pure: the reference date
//! is passed in by the caller.

use crate::errors::{LedgerError, LedgerResult};
use crate::models::{
    AmountSign, Book, BookKind, Entries, InvestmentPosition, Snapshot, Transaction, YearMonth,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const TOTAL_COLUMN: &str = "Total";

/// Allowed values of one boolean column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagSet {
    pub allow_true: bool,
    pub allow_false: bool,
}

impl FlagSet {
    pub const BOTH: FlagSet = FlagSet {
        allow_true: true,
        allow_false: true,
    };
    pub const ONLY_TRUE: FlagSet = FlagSet {
        allow_true: true,
        allow_false: false,
    };
    pub const ONLY_FALSE: FlagSet = FlagSet {
        allow_true: false,
        allow_false: true,
    };

    pub fn from_values(values: &[bool]) -> Self {
        Self {
            allow_true: values.contains(&true),
            allow_false: values.contains(&false),
        }
    }

    pub fn contains(self, value: bool) -> bool {
        if value { self.allow_true } else { self.allow_false }
    }

    pub fn is_both(self) -> bool {
        self.allow_true && self.allow_false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Filters {
    pub recurrent: FlagSet,
    pub include: FlagSet,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            recurrent: FlagSet::BOTH,
            include: FlagSet::ONLY_TRUE,
        }
    }
}

impl Filters {
    pub fn keeps(&self, t: &Transaction) -> bool {
        self.recurrent.contains(t.recurrent) && self.include.contains(t.include)
    }

    pub fn apply<'a>(&self, items: &'a [Transaction]) -> Vec<&'a Transaction> {
        items.iter().filter(|t| self.keeps(t)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentMonth {
    Spending {
        month: YearMonth,
        spent: Decimal,
        /// Present for signed books only.
        income: Option<Decimal>,
        /// Present for signed books only.
        balance: Option<Decimal>,
    },
    Investments {
        month: YearMonth,
        invested: Decimal,
        received: Decimal,
    },
}

/// One bar of the monthly series. `include` is set only when the series is split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    pub include: Option<bool>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotals {
    pub current: CurrentMonth,
    pub series: Vec<MonthlyPoint>,
}

fn shape_of<'a>(snapshot: &'a Snapshot, book: &Book) -> LedgerResult<&'a Entries> {
    if snapshot.book_id != book.id || !snapshot.entries.matches(book.kind) {
        return Err(LedgerError::ShapeMismatch(book.id.clone()));
    }
    Ok(&snapshot.entries)
}

fn add(a: Decimal, b: Decimal) -> LedgerResult<Decimal> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

fn total(values: impl IntoIterator<Item = Decimal>) -> LedgerResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, add)
}

/// Current-month figures plus the month-by-month series.
pub fn monthly_totals(
    snapshot: &Snapshot,
    book: &Book,
    filters: &Filters,
    as_of: NaiveDate,
) -> LedgerResult<MonthlyTotals> {
    let month = YearMonth::of(as_of);
    match (shape_of(snapshot, book)?, book.kind) {
        (Entries::Transactions(items), BookKind::Spending { sign }) => {
            let kept = filters.apply(items);
            let this_month: Vec<Decimal> = kept
                .iter()
                .filter(|t| YearMonth::of(t.date) == month)
                .map(|t| t.amount)
                .collect();
            let current = match sign {
                AmountSign::Signed => {
                    let spent = -total(this_month.iter().copied().filter(|a| a.is_sign_negative()))?;
                    let income = total(this_month.iter().copied().filter(|a| *a > Decimal::ZERO))?;
                    CurrentMonth::Spending {
                        month,
                        spent,
                        income: Some(income),
                        balance: Some(total(this_month.iter().copied())?),
                    }
                }
                AmountSign::Magnitude => CurrentMonth::Spending {
                    month,
                    spent: total(this_month.iter().copied())?,
                    income: None,
                    balance: None,
                },
            };
            Ok(MonthlyTotals {
                current,
                series: monthly_series(&kept, filters.include.is_both())?,
            })
        }
        (Entries::Investments(items), BookKind::Investments) => {
            let invested = total(
                items
                    .iter()
                    .filter(|p| YearMonth::of(p.opening_date) == month)
                    .map(|p| p.amount_opening),
            )?;
            let received = total(
                items
                    .iter()
                    .filter(|p| p.closing_date.map(YearMonth::of) == Some(month))
                    .filter_map(|p| p.amount_closing),
            )?;
            Ok(MonthlyTotals {
                current: CurrentMonth::Investments {
                    month,
                    invested,
                    received,
                },
                series: Vec::new(),
            })
        }
        _ => Err(LedgerError::ShapeMismatch(book.id.clone())),
    }
}

/// Sum of amounts per month in chronological order.
///
/// Split by `include` when `split` is set; otherwise one point per month, with empty
/// months between the first and the last filled with zero.
pub fn monthly_series(items: &[&Transaction], split: bool) -> LedgerResult<Vec<MonthlyPoint>> {
    if split {
        let mut sums: BTreeMap<(YearMonth, bool), Decimal> = BTreeMap::new();
        for t in items {
            let sum = sums.entry((YearMonth::of(t.date), t.include)).or_default();
            *sum = add(*sum, t.amount)?;
        }
        return Ok(sums
            .into_iter()
            .map(|((month, include), total)| MonthlyPoint {
                month,
                include: Some(include),
                total,
            })
            .collect());
    }

    let mut sums: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for t in items {
        let sum = sums.entry(YearMonth::of(t.date)).or_default();
        *sum = add(*sum, t.amount)?;
    }
    let (Some(first), Some(last)) = (
        sums.keys().next().copied(),
        sums.keys().next_back().copied(),
    ) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    let mut month = first;
    while month <= last {
        out.push(MonthlyPoint {
            month,
            include: None,
            total: sums.get(&month).copied().unwrap_or(Decimal::ZERO),
        });
        month = month.next();
    }
    Ok(out)
}

/// Book vocabulary order first, then any other values seen (alphabetical).
fn ordered_labels<'a>(book: &Book, seen: impl Iterator<Item = &'a str>) -> Vec<String> {
    let extra: BTreeSet<&str> = seen.filter(|c| !book.allows_category(c)).collect();
    book.categories
        .iter()
        .cloned()
        .chain(extra.into_iter().map(str::to_string))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub month: YearMonth,
    /// Aligned with [`CategoryPivot::categories`].
    pub cells: Vec<Decimal>,
    pub total: Decimal,
}

/// Amounts by month and category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPivot {
    pub categories: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl CategoryPivot {
    /// Column headers including the synthetic total.
    pub fn header(&self) -> Vec<String> {
        let mut h = self.categories.clone();
        h.push(TOTAL_COLUMN.to_string());
        h
    }

    pub fn cell(&self, month: YearMonth, category: &str) -> Option<Decimal> {
        let col = self.categories.iter().position(|c| c == category)?;
        let row = self.rows.iter().find(|r| r.month == month)?;
        row.cells.get(col).copied()
    }
}

pub fn category_pivot(
    items: &[Transaction],
    book: &Book,
    filters: &Filters,
) -> LedgerResult<CategoryPivot> {
    let kept = filters.apply(items);
    let categories = ordered_labels(book, kept.iter().map(|t| t.category.as_str()));
    let index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut by_month: BTreeMap<YearMonth, Vec<Decimal>> = BTreeMap::new();
    for t in &kept {
        let row = by_month
            .entry(YearMonth::of(t.date))
            .or_insert_with(|| vec![Decimal::ZERO; categories.len()]);
        if let Some(&col) = index.get(t.category.as_str()) {
            row[col] = add(row[col], t.amount)?;
        }
    }

    let rows = by_month
        .into_iter()
        .map(|(month, cells)| {
            Ok(PivotRow {
                month,
                total: total(cells.iter().copied())?,
                cells,
            })
        })
        .collect::<LedgerResult<Vec<_>>>()?;
    Ok(CategoryPivot { categories, rows })
}

/// Derived figures of one investment; `None` wherever the value is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionMetrics {
    pub active: bool,
    pub earnings: Option<Decimal>,
    pub roi: Option<Decimal>,
    pub duration_months: Option<f64>,
    pub annualized_return: Option<f64>,
}

pub fn position_metrics(p: &InvestmentPosition) -> PositionMetrics {
    let earnings = p.amount_closing.and_then(|c| c.checked_sub(p.amount_opening));
    let roi = earnings.and_then(|e| e.checked_div(p.amount_opening));
    let duration_months = p
        .closing_date
        .map(|c| (c - p.opening_date).num_days() as f64 / 30.0);

    let annualized_return = match (p.amount_closing, duration_months) {
        (Some(closing), Some(months)) if months > 0.0 && !p.amount_opening.is_zero() => closing
            .checked_div(p.amount_opening)
            .and_then(|ratio| ratio.to_f64())
            .map(|ratio| ratio.powf(12.0 / months) - 1.0)
            .filter(|r| r.is_finite()),
        _ => None,
    };

    PositionMetrics {
        active: p.is_active(),
        earnings,
        roi,
        duration_months,
        annualized_return,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub r#type: String,
    pub open_positions: usize,
    pub closed_positions: usize,
    /// Opening amounts of positions still open.
    pub active_capital: Decimal,
    /// Earnings of closed positions.
    pub realized_earnings: Decimal,
}

/// Per investment type totals, in the book's vocabulary order.
pub fn portfolio_summary(
    items: &[InvestmentPosition],
    book: &Book,
) -> LedgerResult<Vec<TypeSummary>> {
    let labels = ordered_labels(book, items.iter().map(|p| p.r#type.as_str()));
    let mut out = Vec::new();
    for label in labels {
        let group: Vec<&InvestmentPosition> = items.iter().filter(|p| p.r#type == label).collect();
        if group.is_empty() {
            continue;
        }
        let (open, closed): (Vec<&InvestmentPosition>, Vec<&InvestmentPosition>) =
            group.into_iter().partition(|p| p.is_active());
        out.push(TypeSummary {
            open_positions: open.len(),
            closed_positions: closed.len(),
            active_capital: total(open.iter().map(|p| p.amount_opening))?,
            realized_earnings: total(
                closed.iter().filter_map(|p| position_metrics(p).earnings),
            )?,
            r#type: label,
        });
    }
    Ok(out)
}
