//! Assets and their symbols.
//!
//! A symbol packs a precision (0..18) in its low byte and up to seven
//! uppercase A-Z characters in the remaining bytes. An asset is a signed
//! 64-bit amount of base units plus the symbol telling how to scale and
//! label it: `Asset::from_str("1.0000 BAZ")` holds 10000 units.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use sable_codec::{Decode, Decoder, Encode, Encoder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Name, ParseError};

/// The ticker part of a symbol: up to seven uppercase A-Z characters.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolCode(u64);

impl SymbolCode {
    pub const fn from_raw(value: u64) -> Self {
        SymbolCode(value)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tmp = self.0;
        while tmp > 0 {
            let byte = (tmp & 0xff) as u8;
            f.write_str(
                std::str::from_utf8(&[byte]).map_err(|_| fmt::Error)?,
            )?;
            tmp >>= 8;
        }
        Ok(())
    }
}

impl fmt::Debug for SymbolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SymbolCode").field(&self.to_string()).finish()
    }
}

impl FromStr for SymbolCode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        if s.is_empty() || s.len() > 7 || !s.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ParseError::InvalidSymbol(s.to_string()));
        }
        let mut value: u64 = 0;
        for (i, byte) in s.bytes().enumerate() {
            value |= (byte as u64) << (8 * i);
        }
        Ok(SymbolCode(value))
    }
}

impl Encode for SymbolCode {
    fn encode(&self, e: &mut Encoder) {
        e.u64(self.0);
    }
}

impl Decode for SymbolCode {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(SymbolCode(d.u64()?))
    }
}

impl Serialize for SymbolCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SymbolCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Precision plus ticker, e.g. `4,BAZ`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u64);

impl Symbol {
    pub const MAX_PRECISION: u8 = 18;

    pub fn new(precision: u8, code: SymbolCode) -> Result<Self, ParseError> {
        if precision > Self::MAX_PRECISION {
            return Err(ParseError::PrecisionOutOfRange(precision));
        }
        Ok(Symbol(precision as u64 | (code.raw() << 8)))
    }

    pub const fn from_raw(value: u64) -> Self {
        Symbol(value)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn precision(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub const fn code(&self) -> SymbolCode {
        SymbolCode::from_raw(self.0 >> 8)
    }

    /// 10^precision, the number of base units in one whole token.
    pub fn unit(&self) -> i64 {
        10i64.pow(self.precision() as u32)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision(), self.code())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Symbol").field(&self.to_string()).finish()
    }
}

impl FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let (precision, code) = s
            .split_once(',')
            .ok_or_else(|| ParseError::InvalidSymbol(s.to_string()))?;
        let precision: u8 = precision
            .parse()
            .map_err(|_| ParseError::InvalidSymbol(s.to_string()))?;
        Symbol::new(precision, code.parse()?)
    }
}

impl Encode for Symbol {
    fn encode(&self, e: &mut Encoder) {
        e.u64(self.0);
    }
}

impl Decode for Symbol {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(Symbol(d.u64()?))
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A quantity of some token.
///
/// Arithmetic between assets is only defined for identical symbols; the
/// operator impls panic on mismatch the same way built-in integers panic on
/// overflow, and the `checked_*` variants return `None` instead.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Asset {
    units: i64,
    symbol: Symbol,
}

impl Asset {
    pub const fn new(units: i64, symbol: Symbol) -> Self {
        Asset { units, symbol }
    }

    pub const fn units(&self) -> i64 {
        self.units
    }

    pub const fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn checked_add(self, other: Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        Some(Asset::new(self.units.checked_add(other.units)?, self.symbol))
    }

    pub fn checked_sub(self, other: Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        Some(Asset::new(self.units.checked_sub(other.units)?, self.symbol))
    }
}

impl Add for Asset {
    type Output = Asset;

    fn add(self, other: Asset) -> Asset {
        self.checked_add(other)
            .expect("asset arithmetic requires identical symbols")
    }
}

impl Sub for Asset {
    type Output = Asset;

    fn sub(self, other: Asset) -> Asset {
        self.checked_sub(other)
            .expect("asset arithmetic requires identical symbols")
    }
}

impl AddAssign for Asset {
    fn add_assign(&mut self, other: Asset) {
        *self = *self + other;
    }
}

impl SubAssign for Asset {
    fn sub_assign(&mut self, other: Asset) {
        *self = *self - other;
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self.symbol.precision() as usize;
        let unit = self.symbol.unit();
        let sign = if self.units < 0 { "-" } else { "" };
        let magnitude = self.units.unsigned_abs();
        let whole = magnitude / unit.unsigned_abs();
        if precision > 0 {
            let frac = magnitude % unit.unsigned_abs();
            write!(f, "{sign}{whole}.{frac:0precision$} {}", self.symbol.code())
        } else {
            write!(f, "{sign}{whole} {}", self.symbol.code())
        }
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Asset").field(&self.to_string()).finish()
    }
}

impl FromStr for Asset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let (amount, code) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| ParseError::InvalidAsset(s.to_string()))?;
        let code: SymbolCode = code.parse()?;

        let (amount, negative) = match amount.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (amount, false),
        };
        let (whole, frac) = match amount.split_once('.') {
            Some((w, f)) => (w, f),
            None => (amount, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(ParseError::InvalidAsset(s.to_string()));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidAsset(s.to_string()));
        }

        let symbol = Symbol::new(frac.len() as u8, code)?;
        let digits = format!("{whole}{frac}");
        let magnitude: i128 = digits
            .parse()
            .map_err(|_| ParseError::AmountOutOfRange(s.to_string()))?;
        let units = if negative { -magnitude } else { magnitude };
        let units =
            i64::try_from(units).map_err(|_| ParseError::AmountOutOfRange(s.to_string()))?;
        Ok(Asset::new(units, symbol))
    }
}

impl Encode for Asset {
    fn encode(&self, e: &mut Encoder) {
        e.i64(self.units);
        e.u64(self.symbol.raw());
    }
}

impl Decode for Asset {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        let units = d.i64()?;
        let symbol = Symbol(d.u64()?);
        Ok(Asset { units, symbol })
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An asset qualified by the contract that issues it.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ExtendedAsset {
    pub quantity: Asset,
    pub contract: Name,
}

impl Encode for ExtendedAsset {
    fn encode(&self, e: &mut Encoder) {
        self.quantity.encode(e);
        self.contract.encode(e);
    }
}

impl Decode for ExtendedAsset {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(ExtendedAsset {
            quantity: Asset::decode(d)?,
            contract: Name::decode(d)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_code_pi() {
        let code: SymbolCode = "PI".parse().unwrap();
        assert_eq!(code.raw(), 18768);
        assert_eq!(code.to_string(), "PI");
        let encoded = sable_codec::to_vec(&vec![code]);
        assert_eq!(hex::encode(encoded), "015049000000000000");
    }

    #[test]
    fn symbol_round_trip() {
        let symbol: Symbol = "4,BAZ".parse().unwrap();
        assert_eq!(symbol.precision(), 4);
        assert_eq!(symbol.code().to_string(), "BAZ");
        assert_eq!(symbol.to_string(), "4,BAZ");
        assert_eq!(symbol.raw(), 0x5a414204);
    }

    #[test]
    fn symbol_rejects_bad_input() {
        assert!("19,TOOBIG".parse::<Symbol>().is_err());
        assert!("4,".parse::<Symbol>().is_err());
        assert!("4,toolongxx".parse::<Symbol>().is_err());
        assert!("4,baz".parse::<Symbol>().is_err());
    }

    #[test]
    fn asset_display_scales_by_precision() {
        let asset: Asset = "1.0000 BAZ".parse().unwrap();
        assert_eq!(asset.units(), 10000);
        assert_eq!(asset.to_string(), "1.0000 BAZ");

        let bare: Asset = "1 PENG".parse().unwrap();
        assert_eq!(bare.units(), 1);
        assert_eq!(bare.symbol().precision(), 0);
        assert_eq!(bare.to_string(), "1 PENG");

        let negative: Asset = "-0.5000 BAZ".parse().unwrap();
        assert_eq!(negative.units(), -5000);
        assert_eq!(negative.to_string(), "-0.5000 BAZ");
    }

    #[test]
    fn asset_wire_form() {
        let asset: Asset = "1.0000 BAZ".parse().unwrap();
        let bytes = sable_codec::to_vec(&asset);
        assert_eq!(hex::encode(bytes), "10270000000000000442415a00000000");
    }

    #[test]
    fn extended_asset_fixture() {
        let ea = ExtendedAsset {
            quantity: "1.234 X".parse().unwrap(),
            contract: Name::new("double"),
        };
        let bytes = sable_codec::to_vec(&ea);
        assert_eq!(
            hex::encode(bytes),
            "d204000000000000035800000000000000000000a878344d"
        );
        let back: ExtendedAsset = sable_codec::from_slice(
            &hex::decode("d204000000000000035800000000000000000000a878344d").unwrap(),
        )
        .unwrap();
        assert_eq!(back, ea);
    }

    #[test]
    fn arithmetic_requires_same_symbol() {
        let a: Asset = "1.0000 BAZ".parse().unwrap();
        let b: Asset = "0.5000 BAZ".parse().unwrap();
        assert_eq!((a + b).to_string(), "1.5000 BAZ");
        assert_eq!((a - b).to_string(), "0.5000 BAZ");

        let other: Asset = "1.0000 QUX".parse().unwrap();
        assert_eq!(a.checked_add(other), None);
    }

    #[test]
    #[should_panic]
    fn mismatched_add_panics() {
        let a: Asset = "1.0000 BAZ".parse().unwrap();
        let b: Asset = "1.0000 QUX".parse().unwrap();
        let _ = a + b;
    }

    #[test]
    fn json_form_is_string() {
        let asset: Asset = "1.0000 BAZ".parse().unwrap();
        assert_eq!(serde_json::to_string(&asset).unwrap(), "\"1.0000 BAZ\"");
    }
}
