// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{self, Filters, MonthlyTotals};
use crate::config::{BookRegistry, Settings};
use crate::demo::DemoView;
use crate::errors::{LedgerError, LedgerResult};
use crate::gate::AccessGate;
use crate::ledger::{DataIssue, normalize, to_sheet};
use crate::models::{Book, Record, Snapshot};
use crate::reconcile;
use crate::store::TableStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;

struct ActiveBook {
    book: Book,
    snapshot: Snapshot,
    issues: Vec<DataIssue>,
}

/// One user's view of the ledger: the selected book and its current snapshot.
///
/// The snapshot is only ever replaced as a whole (on select, reload and successful
/// writes). A failed read or write leaves it untouched.
pub struct Session<S: TableStore> {
    store: S,
    books: BookRegistry,
    gate: AccessGate,
    demo: Option<DemoView>,
    active: Option<ActiveBook>,
}

impl<S: TableStore> Session<S> {
    pub fn new(store: S, books: BookRegistry, gate: AccessGate) -> Self {
        Self {
            store,
            books,
            gate,
            demo: None,
            active: None,
        }
    }

    /// Builds a session from settings; `user` equal to the demo identity gets the
    /// anonymized, read-only view.
    pub fn from_settings(store: S, settings: &Settings, user: Option<&str>) -> anyhow::Result<Self> {
        let session = Self::new(
            store,
            settings.registry()?,
            AccessGate::new(settings.pin.as_deref()),
        );
        Ok(match user {
            Some(u) if u.eq_ignore_ascii_case(&settings.demo_identity) => {
                session.with_demo_view(DemoView::new())
            }
            _ => session,
        })
    }

    pub fn with_demo_view(mut self, view: DemoView) -> Self {
        self.demo = Some(view);
        self
    }

    pub fn is_demo(&self) -> bool {
        self.demo.is_some()
    }

    /// False when no PIN is configured, the session is the demo view, or the selected
    /// book has dropped rows.
    pub fn writes_enabled(&self) -> bool {
        self.gate.is_configured() && !self.is_demo() && !self.has_dropped_rows()
    }

    pub fn has_dropped_rows(&self) -> bool {
        self.issues()
            .iter()
            .any(|i| matches!(i, DataIssue::DroppedRow { .. }))
    }

    pub fn books(&self) -> &BookRegistry {
        &self.books
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn active(&self) -> LedgerResult<&ActiveBook> {
        self.active.as_ref().ok_or(LedgerError::NoBookSelected)
    }

    pub fn book(&self) -> LedgerResult<&Book> {
        Ok(&self.active()?.book)
    }

    pub fn snapshot(&self) -> LedgerResult<&Snapshot> {
        Ok(&self.active()?.snapshot)
    }

    pub fn issues(&self) -> &[DataIssue] {
        self.active.as_ref().map(|a| a.issues.as_slice()).unwrap_or(&[])
    }

    fn read(&mut self, book: Book) -> LedgerResult<&Snapshot> {
        let data = self.store.read(&book.sheet, book.column_count())?;
        let normalized = normalize(&data, &book)?;
        let snapshot = match self.demo.as_mut() {
            Some(view) => view.apply(normalized.snapshot),
            None => normalized.snapshot,
        };
        tracing::debug!(book = %book.id, rows = snapshot.len(), "snapshot loaded");
        let active = self.active.insert(ActiveBook {
            book,
            snapshot,
            issues: normalized.issues,
        });
        Ok(&active.snapshot)
    }

    /// Switches to `book_id`, reading it from the store.
    pub fn select(&mut self, book_id: &str) -> LedgerResult<&Snapshot> {
        let book = self.books.get(book_id)?.clone();
        self.read(book)
    }

    /// Re-reads the selected book.
    pub fn reload(&mut self) -> LedgerResult<&Snapshot> {
        let book = self.book()?.clone();
        self.read(book)
    }

    /// A book with dropped rows stays read-only until the sheet is fixed: an overwrite
    /// would erase those rows.
    fn authorize(&self, pin: &str) -> LedgerResult<()> {
        if self.is_demo() {
            return Err(LedgerError::DemoReadOnly);
        }
        self.gate.check(pin)?;
        if self.has_dropped_rows() {
            return Err(LedgerError::DroppedRows(self.book()?.id.clone()));
        }
        Ok(())
    }

    fn replace(&mut self, committed: Snapshot) -> LedgerResult<&Snapshot> {
        let active = self.active.as_mut().ok_or(LedgerError::NoBookSelected)?;
        active.issues = normalize(&to_sheet(&committed, &active.book), &active.book)
            .map(|n| n.issues)
            .unwrap_or_default();
        active.snapshot = committed;
        Ok(&active.snapshot)
    }

    /// Overwrites the selected book with `edited`.
    pub fn commit(&mut self, edited: Snapshot, pin: &str) -> LedgerResult<&Snapshot> {
        self.authorize(pin)?;
        let book = self.book()?.clone();
        let committed = reconcile::commit(&mut self.store, &book, edited)?;
        self.replace(committed)
    }

    pub fn append(&mut self, record: Record, pin: &str) -> LedgerResult<&Snapshot> {
        self.authorize(pin)?;
        let active = self.active()?;
        let book = active.book.clone();
        let current = active.snapshot.clone();
        let committed = reconcile::append(&mut self.store, &book, &current, record)?;
        self.replace(committed)
    }

    pub fn close_position(
        &mut self,
        name: &str,
        closing_date: NaiveDate,
        amount_closing: Decimal,
        pin: &str,
    ) -> LedgerResult<&Snapshot> {
        self.authorize(pin)?;
        let active = self.active()?;
        let book = active.book.clone();
        let current = active.snapshot.clone();
        let committed = reconcile::close_position(
            &mut self.store,
            &book,
            &current,
            name,
            closing_date,
            amount_closing,
        )?;
        self.replace(committed)
    }

    pub fn monthly_totals(&self, filters: &Filters, as_of: NaiveDate) -> LedgerResult<MonthlyTotals> {
        let active = self.active()?;
        aggregate::monthly_totals(&active.snapshot, &active.book, filters, as_of)
    }
}
