//! Multiplicatively homomorphic symmetric engine.

use rand::thread_rng;

use crate::cipher::SymCipher;
use crate::engine::EngineCore;
use crate::error::Result;
use crate::keystore::{load_or_generate, KeyStore, SecretKey};
use crate::ledger::LedgerKind;
use crate::modular;

/// Multiplicative scheme modulus, a fixed 63-bit prime shared across keys.
pub const MODULUS: u64 = 9_222_730_058_745_388_403;

/// Fixed public generator of the multiplicative group.
pub const GENERATOR: u64 = 6_980_122_786_781_000_881;

const DEFAULT_NEG_DIVISOR: u64 = 2;

/// Multiplicatively homomorphic symmetric engine.
///
/// Encryption multiplies the plaintext by the obfuscator `G^mask(id)`;
/// ciphertext multiplication multiplies values and merges ledgers; decryption
/// divides the obfuscators back out, raising each to its |cardinality|.
/// Supports ciphertext×ciphertext, ciphertext×plaintext, division,
/// exponentiation and inversion; there is no ciphertext addition.
pub struct SymMhe {
    core: EngineCore,
}

impl SymMhe {
    /// Engine with the default options: range ledger, negativity divisor 2.
    pub fn new(key: SecretKey) -> Self {
        Self::with_options(key, LedgerKind::default(), DEFAULT_NEG_DIVISOR)
    }

    /// Engine with an explicit ledger realization and negativity divisor.
    pub fn with_options(key: SecretKey, kind: LedgerKind, neg_divisor: u64) -> Self {
        Self { core: EngineCore::new(&key, MODULUS, kind, neg_divisor) }
    }

    /// Open with the key held by `store`, generating and persisting fresh
    /// material when the store is empty.
    pub fn open<S: KeyStore>(store: &S) -> Result<Self> {
        let key = load_or_generate(store, &mut thread_rng())?;
        Ok(Self::new(key))
    }

    /// Open strictly with existing key material.
    pub fn open_existing<S: KeyStore>(store: &S) -> Result<Self> {
        Ok(Self::new(store.load()?))
    }

    /// Encrypt a signed plaintext.
    pub fn encrypt(&mut self, m: i64) -> Result<SymCipher> {
        let id = self.core.next_id()?;
        let obf = modular::pow_u(GENERATOR, self.core.mask(id), MODULUS);
        let value = modular::mul(modular::reduce(m, MODULUS), obf, MODULUS);
        Ok(SymCipher::new(value, id, self.core.kind()))
    }

    /// Decrypt a ciphertext produced under this engine's key.
    pub fn decrypt(&self, c: &SymCipher) -> Result<i64> {
        let mut value = c.value();
        for (id, card) in c.entries() {
            let mut obf = modular::pow_u(GENERATOR, self.core.mask(id), MODULUS);
            if card >= 0 {
                obf = modular::inverse(obf, MODULUS)?;
            }
            let magnitude = card.unsigned_abs();
            if magnitude != 1 {
                obf = modular::pow_u(obf, magnitude, MODULUS);
            }
            value = modular::mul(value, obf, MODULUS);
        }
        Ok(self.core.to_signed(value))
    }

    /// Homomorphic multiplication; consumes `c2`.
    pub fn multiply(&self, mut c1: SymCipher, c2: SymCipher) -> Result<SymCipher> {
        c1.multiply(c2, MODULUS)?;
        Ok(c1)
    }

    /// Multiply a plaintext constant into a ciphertext.
    pub fn multiply_plaintext(&self, mut c: SymCipher, m: i64) -> SymCipher {
        c.multiply_value(modular::reduce(m, MODULUS), MODULUS);
        c
    }

    /// Homomorphic division `c1 / c2`; consumes both operands. Fails with
    /// `NoInverse` when `c2`'s value is not invertible.
    pub fn divide(&self, c1: SymCipher, c2: SymCipher) -> Result<SymCipher> {
        self.multiply(c1, self.inverse(c2)?)
    }

    /// Raise a ciphertext to the power `k`. `k == 0` yields the exact one
    /// ciphertext with an empty ledger.
    pub fn pow(&self, mut c: SymCipher, k: i64) -> Result<SymCipher> {
        c.pow(k, MODULUS)?;
        Ok(c)
    }

    /// Multiplicative inverse.
    pub fn inverse(&self, c: SymCipher) -> Result<SymCipher> {
        self.pow(c, -1)
    }

    /// Scheme modulus.
    pub fn modulus(&self) -> u64 {
        self.core.modulus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    const KINDS: [LedgerKind; 2] = [LedgerKind::Range, LedgerKind::Array];

    fn engine(kind: LedgerKind) -> SymMhe {
        SymMhe::with_options(SecretKey::from_bytes([3; 16]), kind, 2)
    }

    #[test]
    fn round_trips_cover_small_signed_values() {
        for kind in KINDS {
            let mut e = engine(kind);
            for m in [0i64, 1, -1, 2, -3, 123_456, -7_890_123] {
                let c = e.encrypt(m).unwrap();
                assert_eq!(e.decrypt(&c).unwrap(), m, "m = {}", m);
            }
        }
    }

    #[test]
    fn six_divided_by_three_is_two() {
        let mut e = engine(LedgerKind::Range);
        let a = e.encrypt(6).unwrap();
        let b = e.encrypt(3).unwrap();
        let q = e.divide(a, b).unwrap();
        assert_eq!(e.decrypt(&q).unwrap(), 2);
    }

    #[test]
    fn products_match_plaintext_shadows() {
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        for kind in KINDS {
            let mut e = engine(kind);
            for _ in 0..50 {
                let x = rng.gen_range(-30_000..30_000i64);
                let y = rng.gen_range(-30_000..30_000i64);
                let cx = e.encrypt(x).unwrap();
                let cy = e.encrypt(y).unwrap();
                let prod = e.multiply(cx, cy).unwrap();
                assert_eq!(e.decrypt(&prod).unwrap(), x * y);
            }
        }
    }

    #[test]
    fn plaintext_multiplication_skips_the_ledger() {
        let mut e = engine(LedgerKind::Range);
        let c = e.encrypt(21).unwrap();
        let c = e.multiply_plaintext(c, -2);
        assert_eq!(c.len(), 1);
        assert_eq!(e.decrypt(&c).unwrap(), -42);
    }

    #[test]
    fn dividing_a_product_by_a_factor_recovers_the_other() {
        let mut e = engine(LedgerKind::Array);
        let mut rng = ChaCha20Rng::seed_from_u64(32);
        for _ in 0..20 {
            let x = rng.gen_range(1..10_000i64);
            let y = rng.gen_range(1..10_000i64);
            let cx = e.encrypt(x).unwrap();
            let cy = e.encrypt(y).unwrap();
            let cy2 = e.encrypt(y).unwrap();
            let prod = e.multiply(cx, cy).unwrap();
            let back = e.divide(prod, cy2).unwrap();
            assert_eq!(e.decrypt(&back).unwrap(), x);
        }
    }

    #[test]
    fn dividing_a_ciphertext_by_itself_cancels_exactly() {
        for kind in KINDS {
            let mut e = engine(kind);
            let c = e.encrypt(414).unwrap();
            let one = e.divide(c.clone(), c).unwrap();
            assert_eq!(e.decrypt(&one).unwrap(), 1);
            assert!(one.is_empty());
        }
    }

    #[test]
    fn powers_match_plaintext_shadows() {
        let mut e = engine(LedgerKind::Range);
        let c = e.encrypt(2).unwrap();
        let p = e.pow(c, 10).unwrap();
        assert_eq!(e.decrypt(&p).unwrap(), 1024);
        let c = e.encrypt(-3).unwrap();
        let p = e.pow(c, 3).unwrap();
        assert_eq!(e.decrypt(&p).unwrap(), -27);
    }

    #[test]
    fn power_zero_is_the_exact_one_ciphertext() {
        let mut e = engine(LedgerKind::Range);
        let c = e.encrypt(99).unwrap();
        let one = e.pow(c, 0).unwrap();
        assert!(one.is_empty());
        assert_eq!(one.value(), 1);
        assert_eq!(e.decrypt(&one).unwrap(), 1);
    }

    #[test]
    fn inverse_multiplied_back_gives_one() {
        let mut e = engine(LedgerKind::Range);
        let a = e.encrypt(4).unwrap();
        let b = e.encrypt(4).unwrap();
        let inv = e.inverse(a).unwrap();
        let one = e.multiply(inv, b).unwrap();
        assert_eq!(e.decrypt(&one).unwrap(), 1);
    }

    #[test]
    fn zero_has_no_inverse() {
        let mut e = engine(LedgerKind::Range);
        let z = e.encrypt(0).unwrap();
        assert!(matches!(e.inverse(z), Err(Error::NoInverse)));
        let z = e.encrypt(0).unwrap();
        let c = e.encrypt(5).unwrap();
        assert!(matches!(e.divide(c, z), Err(Error::NoInverse)));
    }

    #[test]
    fn zero_stays_zero_under_multiplication() {
        let mut e = engine(LedgerKind::Range);
        let z = e.encrypt(0).unwrap();
        let c = e.encrypt(31).unwrap();
        let prod = e.multiply(z, c).unwrap();
        assert_eq!(e.decrypt(&prod).unwrap(), 0);
    }
}
