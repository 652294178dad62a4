//! Toy comparison scheme whose ciphertexts grow with every operation.

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use super::BaselineScheme;
use crate::error::Result;
use crate::keystore::{load_or_generate, KeyStore, SecretKey};
use crate::mask::MaskGenerator;

/// Operator of an expression node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrawOp {
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Wrapping multiplication.
    Mul,
}

/// Strawman ciphertext: a keyed-pad leaf or an unevaluated expression node.
///
/// Homomorphic operations never touch the payload; they record the operation
/// and keep both operands, so size grows linearly with the operation count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrawCipher {
    /// Padded plaintext under a fresh nonce.
    Leaf {
        /// Pad-selection nonce.
        nonce: u64,
        /// Plaintext xor keyed block.
        body: u64,
    },
    /// Deferred operation over two subtrees.
    Node {
        /// Operator applied on decryption.
        op: StrawOp,
        /// Left operand.
        lhs: Box<StrawCipher>,
        /// Right operand.
        rhs: Box<StrawCipher>,
    },
}

impl StrawCipher {
    /// Payload bytes: 16 per leaf plus an opcode byte per node.
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Leaf { .. } => 16,
            Self::Node { lhs, rhs, .. } => 1 + lhs.byte_size() + rhs.byte_size(),
        }
    }
}

/// Strawman scheme: leaves are one-time-padded with a keyed block keyed by a
/// per-leaf nonce, and every homomorphic operation defers work to decryption.
pub struct Strawman {
    pad: MaskGenerator,
}

impl Strawman {
    /// Scheme under an explicit key.
    pub fn new(key: SecretKey) -> Self {
        Self { pad: MaskGenerator::new(&key) }
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

    fn node(op: StrawOp, lhs: StrawCipher, rhs: StrawCipher) -> StrawCipher {
        StrawCipher::Node { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    /// Deferred addition; consumes both operands.
    pub fn add(&self, c1: StrawCipher, c2: StrawCipher) -> StrawCipher {
        Self::node(StrawOp::Add, c1, c2)
    }

    /// Deferred subtraction `c1 - c2`.
    pub fn subtract(&self, c1: StrawCipher, c2: StrawCipher) -> StrawCipher {
        Self::node(StrawOp::Sub, c1, c2)
    }

    /// Deferred multiplication; unlike the partially homomorphic schemes the
    /// strawman supports ciphertext times ciphertext.
    pub fn multiply(&self, c1: StrawCipher, c2: StrawCipher) -> StrawCipher {
        Self::node(StrawOp::Mul, c1, c2)
    }

    fn eval(&self, c: &StrawCipher) -> i64 {
        match c {
            StrawCipher::Leaf { nonce, body } => (body ^ self.pad.block(*nonce)) as i64,
            StrawCipher::Node { op, lhs, rhs } => {
                let a = self.eval(lhs);
                let b = self.eval(rhs);
                match op {
                    StrawOp::Add => a.wrapping_add(b),
                    StrawOp::Sub => a.wrapping_sub(b),
                    StrawOp::Mul => a.wrapping_mul(b),
                }
            }
        }
    }
}

impl BaselineScheme for Strawman {
    type Ciphertext = StrawCipher;

    fn encrypt<R: Rng>(&self, m: i64, rng: &mut R) -> Result<StrawCipher> {
        let nonce = rng.gen();
        Ok(StrawCipher::Leaf { nonce, body: (m as u64) ^ self.pad.block(nonce) })
    }

    fn decrypt(&self, c: &StrawCipher) -> Result<i64> {
        Ok(self.eval(c))
    }
}
