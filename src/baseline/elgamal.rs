//! ElGamal multiplicative baseline.

use num_bigint::{BigUint, RandBigInt};
use num_traits::Zero;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{gen_prime, lift, to_signed, BaselineScheme, MultiplicativeBaseline};
use crate::error::{Error, Result};

/// Default modulus length in bits.
pub const DEFAULT_BITS: u64 = 2048;

/// ElGamal public key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElGamalPublicKey {
    n: BigUint,
    g: BigUint,
    h: BigUint,
}

/// ElGamal secret exponent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElGamalSecretKey {
    x: BigUint,
}

/// ElGamal ciphertext pair `(g^r, m·h^r)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElGamalCipher {
    c1: BigUint,
    c2: BigUint,
}

impl ElGamalCipher {
    /// Serialized size of the two components.
    pub fn byte_size(&self) -> usize {
        (self.c1.bits().div_ceil(8) + self.c2.bits().div_ceil(8)) as usize
    }
}

/// ElGamal scheme instance; without the secret key it can evaluate but not
/// decrypt.
pub struct ElGamal {
    pk: ElGamalPublicKey,
    sk: Option<ElGamalSecretKey>,
    neg_threshold: BigUint,
}

impl ElGamal {
    /// Generate a key pair with a modulus of `bits` bits.
    pub fn key_gen<R: Rng>(bits: u64, rng: &mut R) -> (ElGamalPublicKey, ElGamalSecretKey) {
        assert!(bits >= 64, "modulus too small");
        let n = gen_prime(bits, rng);
        let g = gen_prime(bits - 1, rng);
        let x = gen_prime(bits - 1, rng);
        let h = g.modpow(&x, &n);
        (ElGamalPublicKey { n, g, h }, ElGamalSecretKey { x })
    }

    /// Instance from key material; `sk = None` gives an evaluate-only
    /// instance. Divisor 1 disables the signed reading.
    pub fn new(pk: ElGamalPublicKey, sk: Option<ElGamalSecretKey>, neg_divisor: u64) -> Self {
        assert!(neg_divisor >= 1, "negativity divisor must be at least 1");
        let neg_threshold = if neg_divisor == 1 {
            BigUint::zero()
        } else {
            &pk.n / neg_divisor
        };
        Self { pk, sk, neg_threshold }
    }

    /// Fresh default-size instance holding both keys.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let (pk, sk) = Self::key_gen(DEFAULT_BITS, rng);
        Self::new(pk, Some(sk), 2)
    }

    /// The public half of this instance's key material.
    pub fn public_key(&self) -> &ElGamalPublicKey {
        &self.pk
    }
}

impl BaselineScheme for ElGamal {
    type Ciphertext = ElGamalCipher;

    fn encrypt<R: Rng>(&self, m: i64, rng: &mut R) -> Result<ElGamalCipher> {
        let r = rng.gen_biguint_below(&self.pk.n);
        let c1 = self.pk.g.modpow(&r, &self.pk.n);
        let c2 = (lift(m, &self.pk.n) * self.pk.h.modpow(&r, &self.pk.n)) % &self.pk.n;
        Ok(ElGamalCipher { c1, c2 })
    }

    fn decrypt(&self, c: &ElGamalCipher) -> Result<i64> {
        let sk = self.sk.as_ref().ok_or(Error::SecretKeyRequired)?;
        let s = c.c1.modpow(&sk.x, &self.pk.n);
        let s_inv = s.modinv(&self.pk.n).ok_or(Error::NoInverse)?;
        let residue = (&c.c2 * s_inv) % &self.pk.n;
        to_signed(residue, &self.pk.n, &self.neg_threshold)
    }
}

impl MultiplicativeBaseline for ElGamal {
    fn multiply(&self, c1: ElGamalCipher, c2: &ElGamalCipher) -> ElGamalCipher {
        ElGamalCipher {
            c1: (c1.c1 * &c2.c1) % &self.pk.n,
            c2: (c1.c2 * &c2.c2) % &self.pk.n,
        }
    }

    fn multiply_plaintext(&self, c: ElGamalCipher, m: i64) -> ElGamalCipher {
        ElGamalCipher {
            c1: c.c1,
            c2: (c.c2 * lift(m, &self.pk.n)) % &self.pk.n,
        }
    }

    fn divide(&self, c1: ElGamalCipher, c2: &ElGamalCipher) -> Result<ElGamalCipher> {
        let inv = self.inverse(c2.clone())?;
        Ok(self.multiply(c1, &inv))
    }

    fn pow(&self, c: ElGamalCipher, k: i64) -> Result<ElGamalCipher> {
        let (b1, b2) = if k < 0 {
            let i1 = c.c1.modinv(&self.pk.n).ok_or(Error::NoInverse)?;
            let i2 = c.c2.modinv(&self.pk.n).ok_or(Error::NoInverse)?;
            (i1, i2)
        } else {
            (c.c1, c.c2)
        };
        let e = BigUint::from(k.unsigned_abs());
        Ok(ElGamalCipher {
            c1: b1.modpow(&e, &self.pk.n),
            c2: b2.modpow(&e, &self.pk.n),
        })
    }

    fn inverse(&self, c: ElGamalCipher) -> Result<ElGamalCipher> {
        self.pow(c, -1)
    }
}
