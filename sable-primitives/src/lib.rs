//! Value types shared by every layer of the stack: names, assets, time
//! points, permission levels, actions and the transaction family. Each type
//! carries its wire codec ([`sable_codec::Encode`]/[`sable_codec::Decode`])
//! and its canonical JSON form (serde, string-based for the types the chain
//! prints as strings).

pub mod action;
pub mod asset;
pub mod authority;
pub mod integers;
pub mod name;
pub mod time;
pub mod transaction;

pub use action::{Action, PermissionLevel, Transfer};
pub use asset::{Asset, ExtendedAsset, Symbol, SymbolCode};
pub use authority::{Authority, KeyWeight, PermissionLevelWeight, WaitWeight};
pub use integers::{Int64, UInt64};
pub use name::Name;
pub use time::{TimePoint, TimePointSec};
pub use transaction::{
    PackedTransaction, SignedTransaction, Transaction, TransactionExtension,
};

// Contextual aliases in the spirit of the C++ chain library; all of them
// are plain names on the wire.
pub type AccountName = Name;
pub type ActionName = Name;
pub type PermissionName = Name;
pub type TableName = Name;
pub type ScopeName = Name;

use thiserror::Error;

/// Errors produced when parsing the string form of a primitive value.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid asset string: {0}")]
    InvalidAsset(String),

    #[error("invalid symbol string: {0}")]
    InvalidSymbol(String),

    #[error("symbol precision {0} out of range (max 18)")]
    PrecisionOutOfRange(u8),

    #[error("invalid date string: {0}")]
    InvalidTime(String),

    #[error("invalid permission level string: {0}")]
    InvalidPermissionLevel(String),

    #[error("integer amount out of range: {0}")]
    AmountOutOfRange(String),
}
