//! Public-key and toy baseline schemes, consumed through a narrow surface:
//! key generation, encrypt, decrypt, the homomorphic operators and a byte
//! codec. Nothing in the crate inspects a baseline ciphertext's internals.

mod elgamal;
mod paillier;
mod strawman;

pub use elgamal::{ElGamal, ElGamalCipher, ElGamalPublicKey, ElGamalSecretKey};
pub use paillier::{Paillier, PaillierCipher, PaillierPublicKey, PaillierSecretKey};
pub use strawman::{StrawCipher, StrawOp, Strawman};

use num_bigint::{BigUint, RandBigInt};
use num_prime::nt_funcs::is_prime;
use num_prime::PrimalityTestConfig;
use num_traits::{ToPrimitive, Zero};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Shared baseline surface: probabilistic encryption, decryption and a byte
/// codec for ciphertexts.
pub trait BaselineScheme {
    type Ciphertext: Serialize + DeserializeOwned;

    /// Encrypt a signed plaintext.
    fn encrypt<R: Rng>(&self, m: i64, rng: &mut R) -> Result<Self::Ciphertext>;

    /// Decrypt a ciphertext of this scheme.
    fn decrypt(&self, c: &Self::Ciphertext) -> Result<i64>;

    /// Encode a ciphertext to bytes.
    fn to_bytes(c: &Self::Ciphertext) -> Result<Vec<u8>> {
        Ok(bincode::serialize(c)?)
    }

    /// Decode a ciphertext from bytes produced by `to_bytes`.
    fn from_bytes(bytes: &[u8]) -> Result<Self::Ciphertext> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Operators of an additively homomorphic baseline.
pub trait AdditiveBaseline: BaselineScheme {
    /// Homomorphic addition; consumes the first operand.
    fn add(&self, c1: Self::Ciphertext, c2: &Self::Ciphertext) -> Self::Ciphertext;
    /// Add a plaintext constant.
    fn add_plaintext(&self, c: Self::Ciphertext, m: i64) -> Self::Ciphertext;
    /// Homomorphic subtraction `c1 - c2`.
    fn subtract(&self, c1: Self::Ciphertext, c2: &Self::Ciphertext) -> Result<Self::Ciphertext>;
    /// Multiply by a plaintext scalar.
    fn multiply(&self, c: Self::Ciphertext, k: i64) -> Result<Self::Ciphertext>;
    /// Additive inverse.
    fn negate(&self, c: Self::Ciphertext) -> Result<Self::Ciphertext>;
}

/// Operators of a multiplicatively homomorphic baseline.
pub trait MultiplicativeBaseline: BaselineScheme {
    /// Homomorphic multiplication; consumes the first operand.
    fn multiply(&self, c1: Self::Ciphertext, c2: &Self::Ciphertext) -> Self::Ciphertext;
    /// Multiply a plaintext constant in.
    fn multiply_plaintext(&self, c: Self::Ciphertext, m: i64) -> Self::Ciphertext;
    /// Homomorphic division `c1 / c2`.
    fn divide(&self, c1: Self::Ciphertext, c2: &Self::Ciphertext) -> Result<Self::Ciphertext>;
    /// Raise to a signed power.
    fn pow(&self, c: Self::Ciphertext, k: i64) -> Result<Self::Ciphertext>;
    /// Multiplicative inverse.
    fn inverse(&self, c: Self::Ciphertext) -> Result<Self::Ciphertext>;
}

/// Random prime of exactly `bits` bits.
pub(super) fn gen_prime<R: Rng>(bits: u64, rng: &mut R) -> BigUint {
    loop {
        let mut cand = rng.gen_biguint(bits);
        cand.set_bit(bits - 1, true);
        cand.set_bit(0, true);
        if is_prime(&cand, Some(PrimalityTestConfig::default())).probably() {
            return cand;
        }
    }
}

/// Canonical residue of a signed plaintext modulo `n`.
pub(super) fn lift(m: i64, n: &BigUint) -> BigUint {
    let mag = BigUint::from(m.unsigned_abs()) % n;
    if m < 0 && !mag.is_zero() {
        n - mag
    } else {
        mag
    }
}

/// Signed reading of a recovered residue; values at or above `threshold`
/// represent negatives, a zero threshold disables the reading. Fails with
/// [`Error::PlaintextRange`] when the result does not fit `i64`.
pub(super) fn to_signed(residue: BigUint, n: &BigUint, threshold: &BigUint) -> Result<i64> {
    if !threshold.is_zero() && residue >= *threshold {
        let mag = n - residue;
        mag.to_i64().map(|v| -v).ok_or(Error::PlaintextRange)
    } else {
        residue.to_i64().ok_or(Error::PlaintextRange)
    }
}
