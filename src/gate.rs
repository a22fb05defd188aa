// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{LedgerError, LedgerResult};

/// Numeric PIN that must accompany every write. Reads are never gated.
///
/// A casual deterrent against accidental edits, not authentication.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    secret: Option<u64>,
}

impl AccessGate {
    /// `secret` of `None` (or a non-numeric value) keeps writes closed.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.and_then(|s| s.trim().parse().ok()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn check(&self, pin: &str) -> LedgerResult<()> {
        match (self.secret, pin.trim().parse::<u64>()) {
            (Some(secret), Ok(given)) if secret == given => Ok(()),
            _ => Err(LedgerError::PinMismatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_comparison_ignores_whitespace_and_leading_zeros() {
        let gate = AccessGate::new(Some("1234"));
        assert!(gate.check("1234").is_ok());
        assert!(gate.check(" 01234 ").is_ok());
        assert!(matches!(gate.check("1235"), Err(LedgerError::PinMismatch)));
        assert!(gate.check("abcd").is_err());
    }

    #[test]
    fn unconfigured_gate_rejects_everything() {
        let gate = AccessGate::new(None);
        assert!(!gate.is_configured());
        assert!(gate.check("0").is_err());
        assert!(!AccessGate::new(Some("secret")).is_configured());
    }
}
