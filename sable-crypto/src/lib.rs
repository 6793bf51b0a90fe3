pub mod base58;
pub mod hash;
pub mod key;
mod secp;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// String is not a recognized key/signature encoding
    #[error("unrecognized key string format: {0}")]
    UnknownStringFormat(String),

    /// Unable to decode a base58check payload
    #[error("error decoding base58 payload: {0}")]
    BadBase58(#[from] base58::Error),

    /// Curve identifiers are two ASCII characters
    #[error("invalid curve identifier: {0}")]
    InvalidCurve(String),

    /// Key or signature payload of unexpected length
    #[error("invalid key or signature length: {0}")]
    InvalidLength(usize),

    /// K1 recovery ids live in 0..4
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Operation is only defined for the K1 curve
    #[error("operation not supported for curve {0}")]
    UnsupportedCurve(String),

    /// The underlying secp256k1 library rejected the input
    #[error("secp256k1 rejected the input: {0}")]
    Secp256k1(#[from] secp256k1::Error),

    /// Canonical-form retry loop ran out of nonces
    #[error("could not produce a canonical signature after 255 retries")]
    CanonicalRetryExhausted,

    /// OS entropy was unavailable when seeding the shared context
    #[error("failed to gather entropy for the signing context")]
    RandomizationFailed,
}
