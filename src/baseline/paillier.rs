//! Paillier additive baseline, with packed multi-value lanes.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{gen_prime, lift, to_signed, AdditiveBaseline, BaselineScheme};
use crate::error::{Error, Result};

/// Default modulus length in bits.
pub const DEFAULT_BITS: u64 = 2048;

/// Lanes carried by one packed ciphertext.
pub const PACK_LANES: usize = 21;

/// Bits per lane: a 64-bit value plus 32 bits of carry headroom.
const LANE_BITS: u64 = 96;

/// Paillier public key.
///
/// Carries the precomputed μ beside the modulus; decryption still requires λ.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaillierPublicKey {
    n: BigUint,
    n2: BigUint,
    g: BigUint,
    mu: BigUint,
}

/// Paillier secret key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaillierSecretKey {
    lambda: BigUint,
}

/// Paillier ciphertext, a residue modulo n².
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaillierCipher(BigUint);

impl PaillierCipher {
    /// Serialized size of the ciphertext residue.
    pub fn byte_size(&self) -> usize {
        self.0.bits().div_ceil(8) as usize
    }
}

/// Paillier scheme instance; without the secret key it can evaluate but not
/// decrypt.
pub struct Paillier {
    pk: PaillierPublicKey,
    sk: Option<PaillierSecretKey>,
    neg_threshold: BigUint,
}

impl Paillier {
    /// Generate a key pair with a modulus of `bits` bits.
    pub fn key_gen<R: Rng>(bits: u64, rng: &mut R) -> (PaillierPublicKey, PaillierSecretKey) {
        assert!(bits >= 64, "modulus too small");
        let half = bits / 2;
        let p = gen_prime(half, rng);
        let q = loop {
            let q = gen_prime(half, rng);
            if q != p {
                break q;
            }
        };
        let n = &p * &q;
        let n2 = &n * &n;
        let lambda = (&p - 1u32).lcm(&(&q - 1u32));
        // random prime g, accepted once L(g^λ) is invertible mod n
        let (g, mu) = loop {
            let g = gen_prime(bits, rng);
            let l = l_function(&g.modpow(&lambda, &n2), &n);
            if let Some(mu) = l.modinv(&n) {
                break (g, mu);
            }
        };
        (PaillierPublicKey { n, n2, g, mu }, PaillierSecretKey { lambda })
    }

    /// Instance from key material; `sk = None` gives an evaluate-only
    /// instance. Divisor 1 disables the signed reading.
    pub fn new(pk: PaillierPublicKey, sk: Option<PaillierSecretKey>, neg_divisor: u64) -> Self {
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
    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.pk
    }

    /// Encrypt up to [`PACK_LANES`] values into one ciphertext.
    pub fn encrypt_packed<R: Rng>(&self, values: &[u64], rng: &mut R) -> Result<PaillierCipher> {
        Ok(self.raw_encrypt(&pack(values)?, rng))
    }

    /// Recover all lanes of a packed ciphertext, in `encrypt_packed` order.
    pub fn decrypt_packed(&self, c: &PaillierCipher) -> Result<Vec<u64>> {
        unpack(self.raw_decrypt(c)?)
    }

    /// Add plaintext values into a packed ciphertext, lane by lane.
    pub fn add_plaintext_packed(&self, c: PaillierCipher, values: &[u64]) -> Result<PaillierCipher> {
        let shift = self.pk.g.modpow(&pack(values)?, &self.pk.n2);
        Ok(PaillierCipher((c.0 * shift) % &self.pk.n2))
    }

    fn raw_encrypt<R: Rng>(&self, m: &BigUint, rng: &mut R) -> PaillierCipher {
        let r = loop {
            let r = rng.gen_biguint_below(&self.pk.n);
            if !r.is_zero() && r.gcd(&self.pk.n).is_one() {
                break r;
            }
        };
        let c = (self.pk.g.modpow(m, &self.pk.n2) * r.modpow(&self.pk.n, &self.pk.n2))
            % &self.pk.n2;
        PaillierCipher(c)
    }

    fn raw_decrypt(&self, c: &PaillierCipher) -> Result<BigUint> {
        let sk = self.sk.as_ref().ok_or(Error::SecretKeyRequired)?;
        let l = l_function(&c.0.modpow(&sk.lambda, &self.pk.n2), &self.pk.n);
        Ok((l * &self.pk.mu) % &self.pk.n)
    }
}

impl BaselineScheme for Paillier {
    type Ciphertext = PaillierCipher;

    fn encrypt<R: Rng>(&self, m: i64, rng: &mut R) -> Result<PaillierCipher> {
        Ok(self.raw_encrypt(&lift(m, &self.pk.n), rng))
    }

    fn decrypt(&self, c: &PaillierCipher) -> Result<i64> {
        let residue = self.raw_decrypt(c)?;
        to_signed(residue, &self.pk.n, &self.neg_threshold)
    }
}

impl AdditiveBaseline for Paillier {
    fn add(&self, c1: PaillierCipher, c2: &PaillierCipher) -> PaillierCipher {
        PaillierCipher((c1.0 * &c2.0) % &self.pk.n2)
    }

    fn add_plaintext(&self, c: PaillierCipher, m: i64) -> PaillierCipher {
        let shift = self.pk.g.modpow(&lift(m, &self.pk.n), &self.pk.n2);
        PaillierCipher((c.0 * shift) % &self.pk.n2)
    }

    fn subtract(&self, c1: PaillierCipher, c2: &PaillierCipher) -> Result<PaillierCipher> {
        let neg = self.negate(c2.clone())?;
        Ok(self.add(c1, &neg))
    }

    fn multiply(&self, c: PaillierCipher, k: i64) -> Result<PaillierCipher> {
        let base = if k < 0 {
            c.0.modinv(&self.pk.n2).ok_or(Error::NoInverse)?
        } else {
            c.0
        };
        Ok(PaillierCipher(base.modpow(&BigUint::from(k.unsigned_abs()), &self.pk.n2)))
    }

    fn negate(&self, c: PaillierCipher) -> Result<PaillierCipher> {
        self.multiply(c, -1)
    }
}

/// `L(u) = (u - 1) / n`.
fn l_function(u: &BigUint, n: &BigUint) -> BigUint {
    (u - 1u32) / n
}

/// Pack values into consecutive lanes, lane 0 lowest.
fn pack(values: &[u64]) -> Result<BigUint> {
    if values.len() > PACK_LANES {
        return Err(Error::PackedCapacity);
    }
    let mut acc = BigUint::zero();
    for (i, &v) in values.iter().enumerate() {
        acc += BigUint::from(v) << (LANE_BITS * i as u64);
    }
    Ok(acc)
}

fn unpack(mut packed: BigUint) -> Result<Vec<u64>> {
    let mask = (BigUint::one() << LANE_BITS) - 1u32;
    let mut lanes = Vec::with_capacity(PACK_LANES);
    for _ in 0..PACK_LANES {
        let lane = &packed & &mask;
        lanes.push(lane.to_u64().ok_or(Error::PlaintextRange)?);
        packed >>= LANE_BITS;
    }
    Ok(lanes)
}
