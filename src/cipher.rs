//! Ciphertext container: one masked residue plus its mask ledger.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ledger::{Ledger, LedgerKind};
use crate::modular;

/// Ciphertext of the symmetric schemes.
///
/// Holds the masked value and the ledger recording which masks were folded in
/// and how often. Homomorphic operators mutate the receiving ciphertext in
/// place and consume the other operand; failed operations leave the receiver
/// untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymCipher {
    value: u64,
    ledger: Ledger,
}

impl SymCipher {
    pub(crate) fn new(value: u64, id: u64, kind: LedgerKind) -> Self {
        Self { value, ledger: Ledger::singleton(kind, id) }
    }

    /// Masked residue value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Number of (id, cardinality) entries in the ledger.
    pub fn len(&self) -> u64 {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Realization of the attached ledger.
    pub fn kind(&self) -> LedgerKind {
        self.ledger.kind()
    }

    /// Ledger entries, ascending by id.
    pub fn entries(&self) -> Vec<(u64, i64)> {
        self.ledger.extract()
    }

    /// Size model: 8 value bytes, 1 realization tag, ledger accounting.
    pub fn byte_size(&self) -> usize {
        8 + 1 + self.ledger.byte_size()
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bytes produced by [`SymCipher::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Add `other` in: values add, ledgers merge.
    pub(crate) fn add(&mut self, other: SymCipher, m: u64) -> Result<()> {
        let value = other.value;
        self.ledger.merge(other.ledger, m)?;
        self.value = modular::add(self.value, value, m);
        Ok(())
    }

    /// Multiply `other` in: values multiply, ledgers merge.
    pub(crate) fn multiply(&mut self, other: SymCipher, m: u64) -> Result<()> {
        let value = other.value;
        self.ledger.merge(other.ledger, m)?;
        self.value = modular::mul(self.value, value, m);
        Ok(())
    }

    /// Add a bare residue to the value; the ledger is unchanged.
    pub(crate) fn add_value(&mut self, v: u64, m: u64) {
        self.value = modular::add(self.value, v, m);
    }

    /// Multiply a bare residue into the value; the ledger is unchanged.
    pub(crate) fn multiply_value(&mut self, v: u64, m: u64) {
        self.value = modular::mul(self.value, v, m);
    }

    /// Scale by `k`: the value is multiplied by `k`'s residue, every ledger
    /// cardinality by `k`.
    pub(crate) fn scale(&mut self, k: i64, m: u64) {
        self.value = modular::mul(self.value, modular::reduce(k, m), m);
        self.ledger.scale(k, m);
    }

    /// Raise to `k`: the value is exponentiated, every ledger cardinality
    /// multiplied by `k`. Negative `k` on a non-invertible value fails with
    /// `NoInverse` and leaves the receiver untouched.
    pub(crate) fn pow(&mut self, k: i64, m: u64) -> Result<()> {
        self.value = modular::pow(self.value, k, m)?;
        self.ledger.scale(k, m);
        Ok(())
    }
}
