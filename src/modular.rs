//! Modular arithmetic kernel over `u64` residues.
//!
//! Every function takes the modulus as its last parameter. Accepted moduli lie
//! in `0 < m < 2^63`, so the sum of two canonical residues always fits in
//! `u64` and a product always fits in `u128`; no wraparound handling is needed
//! anywhere in the kernel.

use crate::error::{Error, Result};

/// Exclusive upper bound on every modulus accepted by the kernel.
pub const MAX_MODULUS: u64 = 1 << 63;

#[inline]
fn check(m: u64) {
    debug_assert!(m > 0 && m < MAX_MODULUS, "modulus out of range");
}

/// Canonical residue in `[0, m)` of a signed value.
#[inline]
pub fn reduce(x: i64, m: u64) -> u64 {
    check(m);
    x.rem_euclid(m as i64) as u64
}

/// `(a + b) mod m` for canonical operands.
#[inline]
pub fn add(a: u64, b: u64, m: u64) -> u64 {
    check(m);
    debug_assert!(a < m && b < m);
    (a + b) % m
}

/// `(a - b) mod m` for canonical operands.
#[inline]
pub fn sub(a: u64, b: u64, m: u64) -> u64 {
    check(m);
    debug_assert!(a < m && b < m);
    (a + m - b) % m
}

/// Additive inverse `(-a) mod m` of a canonical operand.
#[inline]
pub fn neg(a: u64, m: u64) -> u64 {
    check(m);
    debug_assert!(a < m);
    (m - a) % m
}

/// `(a * b) mod m` via a widening multiply.
#[inline]
pub fn mul(a: u64, b: u64, m: u64) -> u64 {
    check(m);
    debug_assert!(a < m && b < m);
    ((u128::from(a) * u128::from(b)) % u128::from(m)) as u64
}

/// `a^e mod m` for a non-negative exponent, by binary exponentiation.
pub fn pow_u(a: u64, mut e: u64, m: u64) -> u64 {
    check(m);
    debug_assert!(a < m);
    let mut base = a;
    let mut acc = 1 % m;
    while e > 0 {
        if e & 1 == 1 {
            acc = mul(acc, base, m);
        }
        e >>= 1;
        if e > 0 {
            base = mul(base, base, m);
        }
    }
    acc
}

/// `a^e mod m` for a signed exponent. A negative exponent inverts `a` first
/// and fails with [`Error::NoInverse`] when `gcd(a, m) != 1`.
pub fn pow(a: u64, e: i64, m: u64) -> Result<u64> {
    if e < 0 {
        let inv = inverse(a, m)?;
        Ok(pow_u(inv, e.unsigned_abs(), m))
    } else {
        Ok(pow_u(a, e as u64, m))
    }
}

/// Greatest common divisor.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Extended Euclid: returns `(g, x, y)` with `a*x + b*y = g = gcd(a, b)`.
pub fn egcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1, 0);
    let (mut old_t, mut t) = (0, 1);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
        (old_t, t) = (t, old_t - q * t);
    }
    (old_r, old_s, old_t)
}

/// Multiplicative inverse of `a` modulo `m`.
///
/// Fails with [`Error::NoInverse`] when `gcd(a, m) != 1`; never returns a
/// placeholder value.
pub fn inverse(a: u64, m: u64) -> Result<u64> {
    check(m);
    debug_assert!(a < m);
    let (g, x, _) = egcd(i128::from(a), i128::from(m));
    if g != 1 {
        return Err(Error::NoInverse);
    }
    Ok(x.rem_euclid(i128::from(m)) as u64)
}

/// Balanced signed representative of `x` modulo `m`, in
/// `[-(m-1)/2, (m-1)/2]` for odd `m`.
#[inline]
pub fn center(x: i128, m: u64) -> i64 {
    check(m);
    let r = x.rem_euclid(i128::from(m));
    if r > i128::from(m / 2) {
        (r - i128::from(m)) as i64
    } else {
        r as i64
    }
}
