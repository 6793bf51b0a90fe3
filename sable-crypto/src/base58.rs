//! base58check encoding as used by key and signature strings.
//!
//! Two checksum flavors exist side by side: modern `PUB_`/`PVT_`/`SIG_`
//! strings append the first four bytes of RIPEMD-160 over the payload plus
//! the ASCII curve suffix, while the legacy WIF private key form appends
//! the first four bytes of a double SHA-256.

use base58::{FromBase58, ToBase58};
use thiserror::Error;

use crate::hash::{double_sha256, Ripemd160};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid base58 character")]
    InvalidBase58,

    #[error("base58 payload too short to carry a checksum")]
    TooShort,

    #[error("base58 checksum mismatch")]
    BadChecksum,
}

fn ripemd_checksum(data: &[u8], suffix: &str) -> [u8; 4] {
    let mut hasher = Ripemd160::new();
    hasher.input(data);
    hasher.input(suffix.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

fn sha256_checksum(data: &[u8]) -> [u8; 4] {
    let digest = double_sha256(data);
    let mut out = [0; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Encode with a RIPEMD-160 checksum over `data ‖ suffix`.
///
/// The suffix is the curve tag of the surrounding string (`"K1"` inside
/// `PUB_K1_…`) or empty for the legacy public key form.
pub fn encode_ripemd_check(data: &[u8], suffix: &str) -> String {
    let mut payload = data.to_vec();
    payload.extend_from_slice(&ripemd_checksum(data, suffix));
    payload.to_base58()
}

pub fn decode_ripemd_check(s: &str, suffix: &str) -> Result<Vec<u8>, Error> {
    let payload = s.from_base58().map_err(|_| Error::InvalidBase58)?;
    if payload.len() < 5 {
        return Err(Error::TooShort);
    }
    let (data, checksum) = payload.split_at(payload.len() - 4);
    if checksum != ripemd_checksum(data, suffix) {
        return Err(Error::BadChecksum);
    }
    Ok(data.to_vec())
}

/// Encode with a double-SHA-256 checksum (the WIF flavor).
pub fn encode_sha256_check(data: &[u8]) -> String {
    let mut payload = data.to_vec();
    payload.extend_from_slice(&sha256_checksum(data));
    payload.to_base58()
}

pub fn decode_sha256_check(s: &str) -> Result<Vec<u8>, Error> {
    let payload = s.from_base58().map_err(|_| Error::InvalidBase58)?;
    if payload.len() < 5 {
        return Err(Error::TooShort);
    }
    let (data, checksum) = payload.split_at(payload.len() - 4);
    if checksum != sha256_checksum(data) {
        return Err(Error::BadChecksum);
    }
    Ok(data.to_vec())
}
