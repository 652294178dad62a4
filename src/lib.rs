//! Symmetric partially homomorphic encryption with compact mask ledgers.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]

pub mod ahe;
pub mod baseline;
pub mod cipher;
mod engine;
pub mod error;
pub mod keystore;
pub mod ledger;
pub mod mask;
pub mod mhe;
pub mod modular;

pub use ahe::SymAhe;
pub use baseline::{
    AdditiveBaseline, BaselineScheme, ElGamal, MultiplicativeBaseline, Paillier, Strawman,
};
pub use cipher::SymCipher;
pub use error::{Error, Result};
pub use keystore::{FsKeyStore, KeyStore, SecretKey};
pub use ledger::{Ledger, LedgerKind};
pub use mask::MaskGenerator;
pub use mhe::SymMhe;
