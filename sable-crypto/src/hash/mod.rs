//! Cryptographic digests for Antelope chains
//!
//! Two helper objects are exposed:
//!
//! * the hasher types ([`Sha256`], [`Sha512`], [`Ripemd160`]) to stream
//!   bytes into a digest computation
//! * [`Checksum`] a conveniently strongly typed byte array, aliased to the
//!   three digest widths the protocol uses ([`Checksum160`],
//!   [`Checksum256`], [`Checksum512`])
//!
//! # Example
//!
//! ```
//! use sable_crypto::hash::Sha256;
//!
//! let mut hasher = Sha256::new();
//! hasher.input(b"I like turtles");
//!
//! let digest = hasher.finalize();
//! # assert_eq!(
//! #   "e50da5010bca3f3ea824008ff6d885e7a877936c5834705e55c7fd0f1e0be47b",
//! #   digest.to_string()
//! # );
//! ```

#[allow(clippy::module_inception)]
mod checksum;
mod hasher;
mod serde;

pub use self::{
    checksum::{Checksum, Checksum160, Checksum256, Checksum512},
    hasher::{double_sha256, Ripemd160, Sha256, Sha512},
};
