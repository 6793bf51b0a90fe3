//! Rust-native building blocks for Antelope blockchain clients
//!
//! Sable is a collection of modules that implements the client-side value
//! types, codecs and signing flows of Antelope (EOSIO-family) chains in
//! native Rust. This crate doesn't provide any particular application; it is
//! meant as a base layer for wallets, explorers and other tooling.

#![warn(missing_docs)]

#[doc(inline)]
pub use sable_codec as codec;

#[doc(inline)]
pub use sable_crypto as crypto;

#[doc(inline)]
pub use sable_primitives as primitives;

#[doc(inline)]
pub use sable_abi as abi;

pub mod interop {
    //! Interoperability with wallet-facing protocols

    #[doc(inline)]
    pub use sable_esr as esr;
}
