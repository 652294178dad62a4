//! Mask ledgers: compact multisets of (id, signed cardinality) entries.
//!
//! A ledger records which masks are folded into a ciphertext value and how
//! often. Two realizations with identical contracts exist; which one a
//! ciphertext carries is a tag on the [`Ledger`] enum, and operations on
//! mixed realizations fail instead of guessing.

mod array;
mod range;

pub use array::ArrayLedger;
pub use range::RangeLedger;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which concrete ledger layout a ciphertext carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerKind {
    /// Run-length groups keyed by cardinality; compact under sequential ids.
    #[default]
    Range,
    /// Sign-partitioned sorted id lists with sparse magnitude overrides.
    Array,
}

/// A ciphertext's mask bookkeeping, tagged by realization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ledger {
    /// Run-length realization.
    Range(RangeLedger),
    /// Sorted-list realization.
    Array(ArrayLedger),
}

impl Ledger {
    /// Empty ledger of the given realization.
    pub fn empty(kind: LedgerKind) -> Self {
        match kind {
            LedgerKind::Range => Ledger::Range(RangeLedger::default()),
            LedgerKind::Array => Ledger::Array(ArrayLedger::default()),
        }
    }

    /// Ledger of the given realization holding the single entry `(id, +1)`.
    pub fn singleton(kind: LedgerKind, id: u64) -> Self {
        match kind {
            LedgerKind::Range => Ledger::Range(RangeLedger::singleton(id)),
            LedgerKind::Array => Ledger::Array(ArrayLedger::singleton(id)),
        }
    }

    /// Realization tag.
    pub fn kind(&self) -> LedgerKind {
        match self {
            Ledger::Range(_) => LedgerKind::Range,
            Ledger::Array(_) => LedgerKind::Array,
        }
    }

    /// Number of (id, cardinality) entries.
    pub fn len(&self) -> u64 {
        match self {
            Ledger::Range(l) => l.len(),
            Ledger::Array(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Multiset union with `other` under modulus `m`.
    ///
    /// Fails with [`Error::LedgerMismatch`] when the realizations differ;
    /// `self` is left untouched in that case.
    pub fn merge(&mut self, other: Ledger, m: u64) -> Result<()> {
        match (self, other) {
            (Ledger::Range(a), Ledger::Range(b)) => {
                a.merge(b, m);
                Ok(())
            }
            (Ledger::Array(a), Ledger::Array(b)) => {
                a.merge(b, m);
                Ok(())
            }
            _ => Err(Error::LedgerMismatch),
        }
    }

    /// Multiply every cardinality by `k` modulo `m`.
    pub fn scale(&mut self, k: i64, m: u64) {
        match self {
            Ledger::Range(l) => l.scale(k, m),
            Ledger::Array(l) => l.scale(k, m),
        }
    }

    /// Literal (id, cardinality) entries, ascending by id. Equal abstract
    /// content extracts identically from either realization.
    pub fn extract(&self) -> Vec<(u64, i64)> {
        match self {
            Ledger::Range(l) => l.extract(),
            Ledger::Array(l) => l.extract(),
        }
    }

    /// Structural size model of the realization's layout.
    pub fn byte_size(&self) -> usize {
        match self {
            Ledger::Range(l) => l.byte_size(),
            Ledger::Array(l) => l.byte_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: u64 = i64::MAX as u64;

    fn script(kind: LedgerKind) -> Vec<(u64, i64)> {
        let mut acc = Ledger::empty(kind);
        for id in 1..=5 {
            acc.merge(Ledger::singleton(kind, id), M).unwrap();
        }
        let mut partial = Ledger::empty(kind);
        for id in 3..=7 {
            partial.merge(Ledger::singleton(kind, id), M).unwrap();
        }
        partial.scale(-2, M);
        acc.merge(partial, M).unwrap();
        acc.scale(3, M);
        acc.extract()
    }

    #[test]
    fn realizations_agree_on_extraction() {
        let want = vec![(1, 3), (2, 3), (3, -3), (4, -3), (5, -3), (6, -6), (7, -6)];
        assert_eq!(script(LedgerKind::Range), want);
        assert_eq!(script(LedgerKind::Array), want);
    }

    #[test]
    fn mixed_realizations_refuse_to_merge() {
        let mut a = Ledger::singleton(LedgerKind::Range, 1);
        let b = Ledger::singleton(LedgerKind::Array, 2);
        assert!(matches!(a.merge(b, M), Err(Error::LedgerMismatch)));
        assert_eq!(a.extract(), vec![(1, 1)]);
    }

    #[test]
    fn empty_ledgers_merge_as_identity() {
        let mut a = Ledger::empty(LedgerKind::Range);
        a.merge(Ledger::singleton(LedgerKind::Range, 3), M).unwrap();
        a.merge(Ledger::empty(LedgerKind::Range), M).unwrap();
        assert_eq!(a.extract(), vec![(3, 1)]);
    }
}
