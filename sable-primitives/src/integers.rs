//! 64-bit integers with the chain's JSON quirk.
//!
//! Values that fit in 32 bits travel as JSON numbers; anything larger
//! becomes a JSON string so that consumers without 64-bit numbers survive.
//! Both forms are accepted when decoding. On the wire these are plain
//! fixed-width integers.

use std::fmt;
use std::str::FromStr;

use sable_codec::{Decode, Decoder, Encode, Encoder};
use serde::de::{Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! fc_int {
    ($Type:ident, $prim:ty, $beyond_32_bits:expr) => {
        #[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $Type(pub $prim);

        impl $Type {
            pub const fn value(&self) -> $prim {
                self.0
            }
        }

        impl From<$prim> for $Type {
            fn from(x: $prim) -> Self {
                $Type(x)
            }
        }

        impl From<$Type> for $prim {
            fn from(x: $Type) -> Self {
                x.0
            }
        }

        impl fmt::Display for $Type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $Type {
            type Err = <$prim as FromStr>::Err;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($Type(s.parse()?))
            }
        }

        impl Encode for $Type {
            fn encode(&self, e: &mut Encoder) {
                self.0.encode(e);
            }
        }

        impl Decode for $Type {
            fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
                Ok($Type(<$prim>::decode(d)?))
            }
        }

        impl Serialize for $Type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let beyond: fn($prim) -> bool = $beyond_32_bits;
                if beyond(self.0) {
                    serializer.serialize_str(&self.0.to_string())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $Type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                struct V;

                impl Visitor<'_> for V {
                    type Value = $Type;

                    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                        f.write_str(concat!("a number or numeric string for ", stringify!($Type)))
                    }

                    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<$Type, E> {
                        <$prim>::try_from(v)
                            .map($Type)
                            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
                    }

                    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<$Type, E> {
                        <$prim>::try_from(v)
                            .map($Type)
                            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
                    }

                    fn visit_str<E: serde::de::Error>(self, s: &str) -> Result<$Type, E> {
                        s.parse()
                            .map_err(|_| E::invalid_value(Unexpected::Str(s), &self))
                    }
                }

                deserializer.deserialize_any(V)
            }
        }
    };
}

fc_int!(UInt64, u64, |x| x > u32::MAX as u64);
fc_int!(Int64, i64, |x| x.unsigned_abs() > u32::MAX as u64);
