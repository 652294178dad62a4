//! State shared by the symmetric engines: keyed masks, modulus, negativity
//! threshold and the ciphertext id counter.

use crate::error::{Error, Result};
use crate::keystore::SecretKey;
use crate::ledger::LedgerKind;
use crate::mask::MaskGenerator;
use crate::modular;

pub(crate) struct EngineCore {
    mask: MaskGenerator,
    modulus: u64,
    /// Residues at or above this decrypt as negatives; 0 disables signing.
    neg_threshold: u64,
    kind: LedgerKind,
    next_id: u64,
}

impl EngineCore {
    pub fn new(key: &SecretKey, modulus: u64, kind: LedgerKind, neg_divisor: u64) -> Self {
        debug_assert!(modulus > 1 && modulus < modular::MAX_MODULUS);
        assert!(neg_divisor >= 1, "negativity divisor must be at least 1");
        let neg_threshold = if neg_divisor == 1 { 0 } else { modulus / neg_divisor };
        Self {
            mask: MaskGenerator::new(key),
            modulus,
            neg_threshold,
            kind,
            next_id: 1,
        }
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn kind(&self) -> LedgerKind {
        self.kind
    }

    /// Fresh ciphertext id. Ids start at 1, never repeat under one key, and
    /// run out with [`Error::IdExhaustion`] instead of wrapping.
    pub fn next_id(&mut self) -> Result<u64> {
        if self.next_id == u64::MAX {
            return Err(Error::IdExhaustion);
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    /// Mask for `id` under this engine's modulus.
    pub fn mask(&self, id: u64) -> u64 {
        self.mask.mask(id, self.modulus)
    }

    /// Signed reading of a recovered residue.
    pub fn to_signed(&self, v: u64) -> i64 {
        debug_assert!(v < self.modulus);
        if self.neg_threshold != 0 && v >= self.neg_threshold {
            -((self.modulus - v) as i64)
        } else {
            v as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(neg_divisor: u64) -> EngineCore {
        let key = SecretKey::from_bytes([9; 16]);
        EngineCore::new(&key, i64::MAX as u64, LedgerKind::Range, neg_divisor)
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut c = core(2);
        assert_eq!(c.next_id().unwrap(), 1);
        assert_eq!(c.next_id().unwrap(), 2);
        assert_eq!(c.next_id().unwrap(), 3);
    }

    #[test]
    fn id_space_exhaustion_is_an_error_not_a_wrap() {
        let mut c = core(2);
        c.next_id = u64::MAX - 1;
        assert_eq!(c.next_id().unwrap(), u64::MAX - 1);
        assert!(matches!(c.next_id(), Err(Error::IdExhaustion)));
        // still exhausted on retry
        assert!(matches!(c.next_id(), Err(Error::IdExhaustion)));
    }

    #[test]
    fn signed_reading_follows_the_threshold() {
        let m = i64::MAX as u64;
        let c = core(2);
        assert_eq!(c.to_signed(0), 0);
        assert_eq!(c.to_signed(5), 5);
        assert_eq!(c.to_signed(m - 3), -3);
        assert_eq!(c.to_signed(m / 2), (m / 2) as i64 - i64::MAX);
        assert_eq!(c.to_signed(m / 2 - 1), (m / 2 - 1) as i64);
    }

    #[test]
    fn divisor_one_disables_negatives() {
        let m = i64::MAX as u64;
        let c = core(1);
        assert_eq!(c.to_signed(m - 3), (m - 3) as i64);
    }

    #[test]
    #[should_panic(expected = "divisor")]
    fn divisor_zero_is_rejected() {
        core(0);
    }
}
