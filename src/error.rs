//! Crate-wide error type.

use std::path::PathBuf;
use thiserror::Error;

/// Failure conditions shared by the symmetric engines, the ledgers and the
/// baseline schemes.
#[derive(Error, Debug)]
pub enum Error {
    /// The operand has no modular inverse (gcd with the modulus is not 1).
    #[error("operand has no modular inverse")]
    NoInverse,

    /// The ciphertext id counter would overflow; the key must be rotated.
    #[error("ciphertext id space exhausted; re-key before encrypting again")]
    IdExhaustion,

    /// A required key file is absent and generation was not permitted.
    #[error("no key material found at `{0}`")]
    MissingKey(PathBuf),

    /// Decrypt was attempted on an instance holding only public key material.
    #[error("operation requires the secret key")]
    SecretKeyRequired,

    /// A range-backed and an array-backed ledger were mixed in one operation.
    #[error("cannot combine range-backed and array-backed ciphertexts")]
    LedgerMismatch,

    /// A baseline decrypt produced a value outside the i64 plaintext range.
    #[error("decrypted value exceeds the supported plaintext range")]
    PlaintextRange,

    /// More values were offered than one packed ciphertext can carry.
    #[error("too many values for one packed ciphertext")]
    PackedCapacity,

    /// Key or ciphertext persistence failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Byte encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
