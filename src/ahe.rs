//! Additively homomorphic symmetric engine.

use rand::thread_rng;

use crate::cipher::SymCipher;
use crate::engine::EngineCore;
use crate::error::Result;
use crate::keystore::{load_or_generate, KeyStore, SecretKey};
use crate::ledger::LedgerKind;
use crate::modular;

/// Additive scheme modulus, `2^63 - 1`.
pub const MODULUS: u64 = i64::MAX as u64;

const DEFAULT_NEG_DIVISOR: u64 = 2;

/// Additively homomorphic symmetric engine.
///
/// Encryption shifts the plaintext by a fresh keyed mask and records the mask
/// id in the ciphertext's ledger. Addition adds values and merges ledgers;
/// decryption removes `cardinality × mask` per entry and applies the signed
/// reading. Supports ciphertext+ciphertext, ciphertext+plaintext,
/// subtraction, plaintext-scalar multiplication and negation; there is no
/// ciphertext×ciphertext multiply.
pub struct SymAhe {
    core: EngineCore,
}

impl SymAhe {
    /// Engine with the default options: range ledger, negativity divisor 2.
    pub fn new(key: SecretKey) -> Self {
        Self::with_options(key, LedgerKind::default(), DEFAULT_NEG_DIVISOR)
    }

    /// Engine with an explicit ledger realization and negativity divisor.
    /// Divisor 1 disables the signed reading entirely.
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
        let value = modular::add(modular::reduce(m, MODULUS), self.core.mask(id), MODULUS);
        Ok(SymCipher::new(value, id, self.core.kind()))
    }

    /// Decrypt a ciphertext produced under this engine's key.
    pub fn decrypt(&self, c: &SymCipher) -> i64 {
        let mut value = c.value();
        for (id, card) in c.entries() {
            let weight = modular::mul(self.core.mask(id), card.unsigned_abs(), MODULUS);
            value = if card < 0 {
                modular::add(value, weight, MODULUS)
            } else {
                modular::sub(value, weight, MODULUS)
            };
        }
        self.core.to_signed(value)
    }

    /// Homomorphic addition; consumes `c2`.
    pub fn add(&self, mut c1: SymCipher, c2: SymCipher) -> Result<SymCipher> {
        c1.add(c2, MODULUS)?;
        Ok(c1)
    }

    /// Add a plaintext constant to a ciphertext.
    pub fn add_plaintext(&self, mut c: SymCipher, m: i64) -> SymCipher {
        c.add_value(modular::reduce(m, MODULUS), MODULUS);
        c
    }

    /// Homomorphic subtraction `c1 - c2`; consumes both operands.
    pub fn subtract(&self, c1: SymCipher, c2: SymCipher) -> Result<SymCipher> {
        self.add(c1, self.negate(c2))
    }

    /// Multiply by a plaintext scalar. `k == 0` yields the exact zero
    /// ciphertext with an empty ledger.
    pub fn multiply(&self, mut c: SymCipher, k: i64) -> SymCipher {
        c.scale(k, MODULUS);
        c
    }

    /// Additive inverse.
    pub fn negate(&self, c: SymCipher) -> SymCipher {
        self.multiply(c, -1)
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

    fn engine(kind: LedgerKind) -> SymAhe {
        SymAhe::with_options(SecretKey::from_bytes([7; 16]), kind, 2)
    }

    #[test]
    fn round_trips_cover_the_signed_range() {
        let hi = (MODULUS / 2 - 1) as i64;
        let lo = -((MODULUS / 2) as i64) - 1;
        for kind in KINDS {
            let mut e = engine(kind);
            for m in [0, 1, -1, 5, -3, 123_456_789, -987_654_321, hi, lo] {
                let c = e.encrypt(m).unwrap();
                assert_eq!(e.decrypt(&c), m, "m = {}", m);
            }
        }
    }

    #[test]
    fn five_plus_ten_is_fifteen() {
        let mut e = engine(LedgerKind::Range);
        let a = e.encrypt(5).unwrap();
        let b = e.encrypt(10).unwrap();
        let sum = e.add(a, b).unwrap();
        assert_eq!(e.decrypt(&sum), 15);
    }

    #[test]
    fn addition_matches_plaintext_shadows() {
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        for kind in KINDS {
            let mut e = engine(kind);
            for _ in 0..50 {
                let x = rng.gen_range(-1_000_000_000..1_000_000_000i64);
                let y = rng.gen_range(-1_000_000_000..1_000_000_000i64);
                let cx = e.encrypt(x).unwrap();
                let cy = e.encrypt(y).unwrap();
                let sum = e.add(cx, cy).unwrap();
                assert_eq!(e.decrypt(&sum), x + y);
            }
        }
    }

    #[test]
    fn plaintext_addition_skips_the_ledger() {
        let mut e = engine(LedgerKind::Range);
        let c = e.encrypt(40).unwrap();
        let c = e.add_plaintext(c, -15);
        assert_eq!(c.len(), 1);
        assert_eq!(e.decrypt(&c), 25);
    }

    #[test]
    fn subtracting_a_ciphertext_from_itself_cancels_exactly() {
        for kind in KINDS {
            let mut e = engine(kind);
            let c = e.encrypt(777).unwrap();
            let zero = e.subtract(c.clone(), c).unwrap();
            assert_eq!(e.decrypt(&zero), 0);
            assert!(zero.is_empty());
            assert_eq!(zero.entries(), vec![]);
        }
    }

    #[test]
    fn subtraction_of_distinct_ciphertexts() {
        let mut e = engine(LedgerKind::Array);
        let a = e.encrypt(10).unwrap();
        let b = e.encrypt(4).unwrap();
        let d = e.subtract(a, b).unwrap();
        assert_eq!(e.decrypt(&d), 6);
        assert_eq!(d.len(), 2);
    }

    #[test]
    fn scalar_multiplication_distributes() {
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        for kind in KINDS {
            let mut e = engine(kind);
            for k in [0i64, 1, -1, 2, -7, 1000] {
                let x = rng.gen_range(-1_000_000..1_000_000i64);
                let y = rng.gen_range(-1_000_000..1_000_000i64);
                let cx = e.encrypt(x).unwrap();
                let cy = e.encrypt(y).unwrap();
                let scaled = e.multiply(e.add(cx, cy).unwrap(), k);
                assert_eq!(e.decrypt(&scaled), k * (x + y), "k = {}", k);
            }
        }
    }

    #[test]
    fn multiplying_by_zero_clears_the_ledger() {
        let mut e = engine(LedgerKind::Range);
        let c = e.encrypt(42).unwrap();
        let c = e.multiply(c, 0);
        assert!(c.is_empty());
        assert_eq!(c.value(), 0);
        assert_eq!(e.decrypt(&c), 0);
    }

    #[test]
    fn negate_round_trips() {
        let mut e = engine(LedgerKind::Range);
        let c = e.encrypt(-3).unwrap();
        assert_eq!(e.decrypt(&c), -3);
        let n = e.negate(c);
        assert_eq!(e.decrypt(&n), 3);
    }

    #[test]
    fn addition_is_associative() {
        for kind in KINDS {
            let mut e = engine(kind);
            let vals = [11, -29, 306];
            let [a1, b1, c1] = vals.map(|v| e.encrypt(v).unwrap());
            let left = e.add(e.add(a1.clone(), b1.clone()).unwrap(), c1.clone()).unwrap();
            let right = e.add(a1, e.add(b1, c1).unwrap()).unwrap();
            assert_eq!(e.decrypt(&left), 288);
            assert_eq!(left.entries(), right.entries());
            assert_eq!(left.value(), right.value());
        }
    }

    #[test]
    fn sequential_sums_stay_compact() {
        let mut e = engine(LedgerKind::Range);
        let single_size = e.encrypt(0).unwrap().byte_size();
        let mut acc = e.encrypt(1).unwrap();
        for m in 2..=100i64 {
            let c = e.encrypt(m).unwrap();
            acc = e.add(acc, c).unwrap();
        }
        assert_eq!(e.decrypt(&acc), 5050);
        assert_eq!(acc.len(), 100);
        // one run of consecutive ids costs no more than a fresh ciphertext
        assert_eq!(acc.byte_size(), single_size);
    }

    #[test]
    fn ledger_realizations_do_not_mix() {
        let mut range = engine(LedgerKind::Range);
        let mut array = engine(LedgerKind::Array);
        let a = range.encrypt(1).unwrap();
        let b = array.encrypt(2).unwrap();
        assert!(matches!(range.add(a, b), Err(Error::LedgerMismatch)));
    }

    #[test]
    fn divisor_one_reads_raw_residues() {
        let mut e = SymAhe::with_options(SecretKey::from_bytes([7; 16]), LedgerKind::Range, 1);
        let c = e.encrypt(-3).unwrap();
        assert_eq!(e.decrypt(&c), (MODULUS - 3) as i64);
    }
}
