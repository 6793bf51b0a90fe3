use std::fmt;
use std::str::FromStr;

use serde::de::{Error, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use super::Checksum;

impl<const BYTES: usize> Serialize for Checksum<BYTES> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct ChecksumVisitor<const BYTES: usize> {}

impl<'de, const BYTES: usize> Visitor<'de> for ChecksumVisitor<BYTES> {
    type Value = Checksum<BYTES>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a hex string representing {BYTES} bytes")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        match Checksum::<BYTES>::from_str(s) {
            Ok(x) => Ok(x),
            Err(_) => Err(Error::invalid_value(Unexpected::Str(s), &self)),
        }
    }
}

impl<'de, const BYTES: usize> Deserialize<'de> for Checksum<BYTES> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ChecksumVisitor::<BYTES> {})
    }
}
