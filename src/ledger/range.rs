//! Run-length ledger realization: consecutive ids of equal cardinality
//! collapse into `[start, start+len)` markers.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::mem;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::modular;

const HEADER_BYTES: usize = 4;
const GROUP_BYTES: usize = 12;
const RUN_BYTES: usize = 12;

/// A run of `len` consecutive ids beginning at `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Run {
    start: u64,
    len: u64,
}

impl Run {
    fn end(self) -> u64 {
        self.start + self.len
    }
}

/// Ascending, non-overlapping, non-adjacent runs. Adjacent pushes coalesce.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RunList {
    runs: Vec<Run>,
}

impl RunList {
    /// Append a run lying at or after the current end, coalescing on contact.
    fn push_run(&mut self, run: Run) {
        debug_assert!(run.len > 0);
        if let Some(last) = self.runs.last_mut() {
            debug_assert!(last.end() <= run.start);
            if last.end() == run.start {
                last.len += run.len;
                return;
            }
        }
        self.runs.push(run);
    }

    fn total(&self) -> u64 {
        self.runs.iter().map(|r| r.len).sum()
    }

    /// Union of two lists covering disjoint id sets.
    fn merge_disjoint(a: RunList, b: RunList) -> RunList {
        let mut out = RunList::default();
        for run in a.runs.into_iter().merge_by(b.runs, |x, y| x.start <= y.start) {
            out.push_run(run);
        }
        out
    }
}

/// Ledger keyed by cardinality, one run list per cardinality group.
///
/// Sequential encrypt-and-fold workloads hit the append fast path and keep a
/// single run per group; arbitrary id patterns go through an interval sweep
/// that sums shared ids and drops zero sums.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeLedger {
    groups: BTreeMap<i64, RunList>,
    len: u64,
}

impl RangeLedger {
    /// Ledger holding the single entry `(id, +1)`.
    pub fn singleton(id: u64) -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(1, RunList { runs: vec![Run { start: id, len: 1 }] });
        Self { groups, len: 1 }
    }

    /// Number of (id, cardinality) entries.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn min_id(&self) -> Option<u64> {
        self.groups
            .values()
            .filter_map(|l| l.runs.first())
            .map(|r| r.start)
            .min()
    }

    fn max_id(&self) -> Option<u64> {
        self.groups
            .values()
            .filter_map(|l| l.runs.last())
            .map(|r| r.end() - 1)
            .max()
    }

    /// Multiset union with `other`; shared ids have their cardinalities summed
    /// modulo `m` (centered) and vanish on a zero sum.
    pub fn merge(&mut self, other: RangeLedger, m: u64) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }
        if self.max_id() < other.min_id() {
            // Strictly increasing id streams extend per-group run ends in
            // amortized constant time.
            self.len += other.len;
            for (card, list) in other.groups {
                let target = self.groups.entry(card).or_default();
                for run in list.runs {
                    target.push_run(run);
                }
            }
            return;
        }
        let a = mem::take(self).into_fragments();
        let b = other.into_fragments();
        *self = Self::from_sweep(a, b, m);
    }

    /// Multiply every cardinality by `k` modulo `m`. `k == 0` clears the
    /// ledger; groups whose scaled cardinality centers to zero are dropped;
    /// groups landing on the same scaled cardinality are unioned.
    pub fn scale(&mut self, k: i64, m: u64) {
        if k == 1 || self.is_empty() {
            return;
        }
        if k == 0 {
            self.groups.clear();
            self.len = 0;
            return;
        }
        let old = mem::take(&mut self.groups);
        for (card, list) in old {
            let scaled = modular::center(i128::from(card) * i128::from(k), m);
            if scaled == 0 {
                self.len -= list.total();
                continue;
            }
            match self.groups.entry(scaled) {
                Entry::Vacant(slot) => {
                    slot.insert(list);
                }
                Entry::Occupied(mut slot) => {
                    let merged = RunList::merge_disjoint(mem::take(slot.get_mut()), list);
                    *slot.get_mut() = merged;
                }
            }
        }
    }

    /// Literal (id, cardinality) entries, ascending by id.
    pub fn extract(&self) -> Vec<(u64, i64)> {
        let mut out = Vec::with_capacity(self.len as usize);
        for (&card, list) in &self.groups {
            for run in &list.runs {
                for id in run.start..run.end() {
                    out.push((id, card));
                }
            }
        }
        out.sort_unstable_by_key(|&(id, _)| id);
        out
    }

    /// Structural size model: header, per-group header, per-run marker.
    pub fn byte_size(&self) -> usize {
        let runs: usize = self.groups.values().map(|l| l.runs.len()).sum();
        HEADER_BYTES + self.groups.len() * GROUP_BYTES + runs * RUN_BYTES
    }

    /// All runs tagged with their cardinality, ascending by start. Runs of a
    /// ledger are pairwise disjoint across groups, so the order is total.
    fn into_fragments(self) -> Vec<(Run, i64)> {
        let mut frags = Vec::new();
        for (card, list) in self.groups {
            for run in list.runs {
                frags.push((run, card));
            }
        }
        frags.sort_unstable_by_key(|&(r, _)| r.start);
        frags
    }

    /// Linear sweep over two fragment sequences: disjoint spans pass through,
    /// shared spans are summed and dropped when the sum centers to zero.
    fn from_sweep(a: Vec<(Run, i64)>, b: Vec<(Run, i64)>, m: u64) -> Self {
        let mut out = RangeLedger::default();
        let mut ai = a.into_iter();
        let mut bi = b.into_iter();
        let mut x = ai.next();
        let mut y = bi.next();
        loop {
            let consumed;
            {
                let (Some(fa), Some(fb)) = (x.as_mut(), y.as_mut()) else {
                    break;
                };
                let (ra, ca) = (&mut fa.0, fa.1);
                let (rb, cb) = (&mut fb.0, fb.1);
                if ra.end() <= rb.start {
                    out.emit(*ra, ca);
                    ra.len = 0;
                } else if rb.end() <= ra.start {
                    out.emit(*rb, cb);
                    rb.len = 0;
                } else if ra.start < rb.start {
                    let head = Run { start: ra.start, len: rb.start - ra.start };
                    out.emit(head, ca);
                    ra.start = rb.start;
                    ra.len -= head.len;
                } else if rb.start < ra.start {
                    let head = Run { start: rb.start, len: ra.start - rb.start };
                    out.emit(head, cb);
                    rb.start = ra.start;
                    rb.len -= head.len;
                } else {
                    let span = ra.len.min(rb.len);
                    let sum = modular::center(i128::from(ca) + i128::from(cb), m);
                    if sum != 0 {
                        out.emit(Run { start: ra.start, len: span }, sum);
                    }
                    ra.start += span;
                    ra.len -= span;
                    rb.start += span;
                    rb.len -= span;
                }
                consumed = (ra.len == 0, rb.len == 0);
            }
            if consumed.0 {
                x = ai.next();
            }
            if consumed.1 {
                y = bi.next();
            }
        }
        for (run, card) in x.into_iter().chain(ai).chain(y).chain(bi) {
            out.emit(run, card);
        }
        out
    }

    fn emit(&mut self, run: Run, card: i64) {
        debug_assert!(card != 0 && run.len > 0);
        self.len += run.len;
        self.groups.entry(card).or_default().push_run(run);
    }
}
