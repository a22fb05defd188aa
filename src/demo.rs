// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Shareable, de-identified view of a snapshot.

use crate::models::{Entries, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

/// Scales every amount by a per-row random factor in `[0, 1)` and blanks free text.
///
/// Applied to what a session reads; the result is never written back.
pub struct DemoView {
    rng: StdRng,
}

impl DemoView {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn factor(&mut self) -> Decimal {
        let f: f64 = self.rng.r#gen();
        Decimal::from_f64_retain(f).unwrap_or(Decimal::ZERO)
    }

    fn scale(amount: Decimal, factor: Decimal) -> Decimal {
        amount.checked_mul(factor).unwrap_or_default().round_dp(2)
    }

    pub fn apply(&mut self, mut snapshot: Snapshot) -> Snapshot {
        match &mut snapshot.entries {
            Entries::Transactions(items) => {
                for t in items.iter_mut() {
                    t.amount = Self::scale(t.amount, self.factor());
                    t.description = None;
                }
            }
            Entries::Investments(items) => {
                for p in items.iter_mut() {
                    let factor = self.factor();
                    p.amount_opening = Self::scale(p.amount_opening, factor);
                    p.amount_closing = p.amount_closing.map(|a| Self::scale(a, factor));
                    p.comments = None;
                }
            }
        }
        snapshot
    }
}

impl Default for DemoView {
    fn default() -> Self {
        Self::new()
    }
}
