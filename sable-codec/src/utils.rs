use std::fmt;
use std::ops::Deref;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::{Decode, Decoder, Encode, Encoder, Error};

/// Raw byte payload that travels as lowercase hex in JSON.
///
/// Action arguments and packed transactions use this shape; the wire form is
/// a varuint length prefix followed by the raw bytes.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(xs: Vec<u8>) -> Self {
        Bytes(xs)
    }
}

impl From<&[u8]> for Bytes {
    fn from(xs: &[u8]) -> Self {
        Bytes(xs.to_vec())
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(b: Bytes) -> Self {
        b.0
    }
}

impl Deref for Bytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<String> for Bytes {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(Bytes(hex::decode(value)?))
    }
}

impl From<Bytes> for String {
    fn from(b: Bytes) -> Self {
        hex::encode(&b.0)
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bytes").field(&hex::encode(&self.0)).finish()
    }
}

impl Encode for Bytes {
    fn encode(&self, e: &mut Encoder) {
        e.blob(&self.0);
    }
}

impl Decode for Bytes {
    fn decode(d: &mut Decoder) -> Result<Self, Error> {
        Ok(Bytes(d.blob()?.to_vec()))
    }
}

/// Raw byte payload that travels as base64 in JSON.
///
/// Some server responses strip the trailing `=` padding; the decoder puts it
/// back before handing the string to the base64 engine.
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct Blob(Vec<u8>);

impl Blob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Blob {
    fn from(xs: Vec<u8>) -> Self {
        Blob(xs)
    }
}

impl From<Blob> for Vec<u8> {
    fn from(b: Blob) -> Self {
        b.0
    }
}

impl Deref for Blob {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<String> for Blob {
    type Error = base64::DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut repaired = value;
        while repaired.len() % 4 != 0 {
            repaired.push('=');
        }
        let bytes = base64::engine::general_purpose::STANDARD.decode(repaired)?;
        Ok(Blob(bytes))
    }
}

impl From<Blob> for String {
    fn from(b: Blob) -> Self {
        base64::engine::general_purpose::STANDARD.encode(&b.0)
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base64::engine::general_purpose::STANDARD.encode(&self.0))
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Blob").field(&hex::encode(&self.0)).finish()
    }
}

impl Encode for Blob {
    fn encode(&self, e: &mut Encoder) {
        e.blob(&self.0);
    }
}

impl Decode for Blob {
    fn decode(d: &mut Decoder) -> Result<Self, Error> {
        Ok(Blob(d.blob()?.to_vec()))
    }
}

/// Explicit variable-length unsigned 32-bit integer.
///
/// Only this wrapper and [`VarInt32`] get the base-128 treatment; plain Rust
/// integers always encode fixed-width.
#[derive(
    Serialize, Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct VarUint32(pub u32);

impl From<u32> for VarUint32 {
    fn from(x: u32) -> Self {
        VarUint32(x)
    }
}

impl From<VarUint32> for u32 {
    fn from(x: VarUint32) -> Self {
        x.0
    }
}

impl fmt::Display for VarUint32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Encode for VarUint32 {
    fn encode(&self, e: &mut Encoder) {
        e.varuint32(self.0);
    }
}

impl Decode for VarUint32 {
    fn decode(d: &mut Decoder) -> Result<Self, Error> {
        Ok(VarUint32(d.varuint32()?))
    }
}

/// Explicit variable-length signed 32-bit integer (bit-pattern, no zig-zag).
#[derive(
    Serialize, Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(transparent)]
pub struct VarInt32(pub i32);

impl From<i32> for VarInt32 {
    fn from(x: i32) -> Self {
        VarInt32(x)
    }
}

impl From<VarInt32> for i32 {
    fn from(x: VarInt32) -> Self {
        x.0
    }
}

impl fmt::Display for VarInt32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Encode for VarInt32 {
    fn encode(&self, e: &mut Encoder) {
        e.varint32(self.0);
    }
}

impl Decode for VarInt32 {
    fn decode(d: &mut Decoder) -> Result<Self, Error> {
        Ok(VarInt32(d.varint32()?))
    }
}
