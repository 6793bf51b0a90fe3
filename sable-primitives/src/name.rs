//! Account, action, permission and table names.
//!
//! A name packs up to 13 characters of the base-32 alphabet
//! `.12345abcdefghijklmnopqrstuvwxyz` into a 64-bit word: positions 0..11
//! take five bits each, the last position gets the remaining four bits (so
//! it can only hold `.1-5a-j` equivalents from the low half of the
//! alphabet).

use std::fmt;
use std::str::FromStr;

use sable_codec::{Decode, Decoder, Encode, Encoder};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const ALPHABET: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

fn char_to_symbol(c: char) -> u64 {
    match c {
        'a'..='z' => c as u64 - 'a' as u64 + 6,
        '1'..='5' => c as u64 - '1' as u64 + 1,
        // anything else, '.' included, maps to index 0
        _ => 0,
    }
}

/// A 64-bit encoded name.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u64);

impl Name {
    /// Build a name from its raw 64-bit value.
    pub const fn from_raw(value: u64) -> Self {
        Name(value)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Build a name from a string, mapping characters outside the alphabet
    /// to `.` and ignoring anything past the 13th position.
    ///
    /// Unicode variation selectors are dropped before mapping, so a
    /// decorated glyph counts as a single character.
    pub fn new(s: &str) -> Self {
        let mut value: u64 = 0;
        let chars = s.chars().filter(|c| !('\u{fe00}'..='\u{fe0f}').contains(c));
        for (i, c) in chars.take(13).enumerate() {
            let sym = char_to_symbol(c);
            if i < 12 {
                value |= (sym & 0x1f) << (64 - 5 * (i + 1));
            } else {
                value |= sym & 0x0f;
            }
        }
        Name(value)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; 13];
        let mut tmp = self.0;
        for i in 0..13 {
            let mask = if i == 0 { 0x0f } else { 0x1f };
            out[12 - i] = ALPHABET[(tmp & mask) as usize];
            tmp >>= if i == 0 { 4 } else { 5 };
        }
        let trimmed = std::str::from_utf8(&out).expect("alphabet is ascii");
        f.write_str(trimmed.trim_end_matches('.'))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Name").field(&self.to_string()).finish()
    }
}

impl FromStr for Name {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Name::new(s))
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<u64> for Name {
    fn from(value: u64) -> Self {
        Name(value)
    }
}

impl From<Name> for u64 {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Name::new(&s))
    }
}

impl Encode for Name {
    fn encode(&self, e: &mut Encoder) {
        e.u64(self.0);
    }
}

impl Decode for Name {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(Name(d.u64()?))
    }
}
