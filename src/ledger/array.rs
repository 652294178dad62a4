//! Array ledger realization: sign-partitioned sorted id lists with a shared
//! default multiplier and sparse per-entry overrides.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::mem;

use itertools::merge_join_by;
use itertools::EitherOrBoth::{Both, Left, Right};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::modular;

const LIST_BYTES: usize = 20;
const ID_BYTES: usize = 4;
const OVERRIDE_BYTES: usize = 12;

/// Sorted ids whose cardinality magnitudes default to `default_card`; entries
/// that differ are recorded by index in `overrides`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct CardList {
    ids: Vec<u64>,
    default_card: i64,
    overrides: BTreeMap<usize, i64>,
}

impl Default for CardList {
    fn default() -> Self {
        Self { ids: Vec::new(), default_card: 1, overrides: BTreeMap::new() }
    }
}

impl CardList {
    fn with_default(default_card: i64) -> Self {
        debug_assert!(default_card >= 1);
        Self { default_card, ..Self::default() }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    /// Append an entry with an id above every stored id.
    fn push(&mut self, id: u64, magnitude: i64) {
        debug_assert!(magnitude >= 1);
        debug_assert!(self.ids.last().is_none_or(|&last| last < id));
        if magnitude != self.default_card {
            self.overrides.insert(self.ids.len(), magnitude);
        }
        self.ids.push(id);
    }

    fn iter(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.ids.iter().enumerate().map(|(i, &id)| {
            (id, self.overrides.get(&i).copied().unwrap_or(self.default_card))
        })
    }

    fn byte_size(&self) -> usize {
        LIST_BYTES + self.ids.len() * ID_BYTES + self.overrides.len() * OVERRIDE_BYTES
    }
}

/// Ledger as two sorted id lists, one per cardinality sign. An id appears in
/// at most one list; merges relocate entries whose summed cardinality changes
/// sign and drop entries summing to zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayLedger {
    pos: CardList,
    neg: CardList,
}

impl ArrayLedger {
    /// Ledger holding the single entry `(id, +1)`.
    pub fn singleton(id: u64) -> Self {
        let mut pos = CardList::default();
        pos.push(id, 1);
        Self { pos, neg: CardList::default() }
    }

    /// Number of (id, cardinality) entries.
    pub fn len(&self) -> u64 {
        (self.pos.len() + self.neg.len()) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.pos.len() == 0 && self.neg.len() == 0
    }

    /// Multiset union with `other`: a three-way ordered merge over the signed
    /// entry streams. Shared ids are summed modulo `m` (centered), relocated
    /// to the list matching the sum's sign, and dropped on zero.
    pub fn merge(&mut self, other: ArrayLedger, m: u64) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }
        // Keep the default multiplier of the longer input list on each side;
        // most surviving entries come from it unchanged.
        let pos_default = Self::wider(&self.pos, &other.pos);
        let neg_default = Self::wider(&self.neg, &other.neg);
        let a = mem::take(self);
        let mut pos = CardList::with_default(pos_default);
        let mut neg = CardList::with_default(neg_default);
        let joined = merge_join_by(a.extract(), other.extract(), |x: &(u64, i64), y: &(u64, i64)| {
            x.0.cmp(&y.0)
        });
        for pair in joined {
            let entry = match pair {
                Left(e) | Right(e) => Some(e),
                Both((id, c1), (_, c2)) => {
                    let sum = modular::center(i128::from(c1) + i128::from(c2), m);
                    (sum != 0).then_some((id, sum))
                }
            };
            if let Some((id, card)) = entry {
                if card > 0 {
                    pos.push(id, card);
                } else {
                    neg.push(id, -card);
                }
            }
        }
        self.pos = pos;
        self.neg = neg;
    }

    /// Multiply every cardinality by `k` modulo `m`. `0` clears the ledger,
    /// `-1` swaps the two lists, other factors rebuild entry-wise (an entry
    /// whose centered product changes sign moves lists; zero products drop).
    pub fn scale(&mut self, k: i64, m: u64) {
        if k == 1 || self.is_empty() {
            return;
        }
        if k == 0 {
            *self = ArrayLedger::default();
            return;
        }
        if k == -1 {
            mem::swap(&mut self.pos, &mut self.neg);
            return;
        }
        let src = if self.pos.len() >= self.neg.len() {
            self.pos.default_card
        } else {
            self.neg.default_card
        };
        let guess = modular::center(i128::from(src) * i128::from(k).abs(), m).abs().max(1);
        let mut pos = CardList::with_default(guess);
        let mut neg = CardList::with_default(guess);
        for (id, card) in self.extract() {
            let scaled = modular::center(i128::from(card) * i128::from(k), m);
            match scaled.cmp(&0) {
                Ordering::Greater => pos.push(id, scaled),
                Ordering::Less => neg.push(id, -scaled),
                Ordering::Equal => {}
            }
        }
        self.pos = pos;
        self.neg = neg;
    }

    /// Literal (id, cardinality) entries, ascending by id.
    pub fn extract(&self) -> Vec<(u64, i64)> {
        self.pos
            .iter()
            .merge_by(self.neg.iter().map(|(id, mag)| (id, -mag)), |a, b| a.0 <= b.0)
            .collect()
    }

    /// Structural size model: per-list header, per-id delta, per-override.
    pub fn byte_size(&self) -> usize {
        self.pos.byte_size() + self.neg.byte_size()
    }

    fn wider(a: &CardList, b: &CardList) -> i64 {
        if a.len() >= b.len() {
            a.default_card
        } else {
            b.default_card
        }
    }
}
