use sable_codec::{Decode, Decoder, Encode, Encoder};
use std::{fmt, ops::Deref, str::FromStr};

/// data that is a cryptographic digest of `BYTES` long.
///
/// The protocol uses three widths: 20 bytes (RIPEMD-160), 32 bytes
/// (SHA-256, also the width of chain ids and transaction ids) and 64 bytes
/// (SHA-512).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum<const BYTES: usize>([u8; BYTES]);

/// RIPEMD-160 digest
pub type Checksum160 = Checksum<20>;

/// SHA-256 digest; chain ids and transaction ids are this type
pub type Checksum256 = Checksum<32>;

/// SHA-512 digest
pub type Checksum512 = Checksum<64>;

impl<const BYTES: usize> Checksum<BYTES> {
    #[inline]
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }

    /// The all-zero value, used as an "invalid" sentinel by callers.
    #[inline]
    pub const fn zero() -> Self {
        Self([0; BYTES])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl<const BYTES: usize> Default for Checksum<BYTES> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const BYTES: usize> From<[u8; BYTES]> for Checksum<BYTES> {
    #[inline]
    fn from(bytes: [u8; BYTES]) -> Self {
        Self::new(bytes)
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Checksum<BYTES> {
    type Error = usize;

    fn try_from(slice: &[u8]) -> Result<Self, usize> {
        if slice.len() == BYTES {
            let mut bytes = [0; BYTES];
            bytes.copy_from_slice(slice);
            Ok(Self::new(bytes))
        } else {
            Err(slice.len())
        }
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Checksum<BYTES> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> Deref for Checksum<BYTES> {
    type Target = [u8; BYTES];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const BYTES: usize> PartialEq<[u8]> for Checksum<BYTES> {
    fn eq(&self, other: &[u8]) -> bool {
        self.0.eq(other)
    }
}

impl<const BYTES: usize> fmt::Debug for Checksum<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Checksum<{size}>", size = BYTES))
            .field(&hex::encode(self))
            .finish()
    }
}

impl<const BYTES: usize> fmt::Display for Checksum<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self))
    }
}

impl<const BYTES: usize> FromStr for Checksum<BYTES> {
    type Err = hex::FromHexError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; BYTES];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self::new(bytes))
    }
}

impl<const BYTES: usize> Encode for Checksum<BYTES> {
    fn encode(&self, e: &mut Encoder) {
        e.raw(&self.0);
    }
}

impl<const BYTES: usize> Decode for Checksum<BYTES> {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        let mut bytes = [0; BYTES];
        bytes.copy_from_slice(d.raw(BYTES)?);
        Ok(Self::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str() {
        let _digest: Checksum160 = "eb6fac738c26abf1d544bfa8ff03f1c6392a87ec".parse().unwrap();

        let _digest: Checksum256 = "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21"
            .parse()
            .unwrap();
    }

    #[test]
    #[should_panic]
    fn from_str_fail() {
        let _digest: Checksum256 = "0d8d00cdd465".parse().unwrap();
    }

    #[test]
    fn wire_form_is_raw_bytes() {
        let digest: Checksum256 = "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21"
            .parse()
            .unwrap();
        let bytes = sable_codec::to_vec(&digest);
        assert_eq!(bytes.len(), 32);
        assert_eq!(hex::encode(&bytes), digest.to_string());
        let back: Checksum256 = sable_codec::from_slice(&bytes).unwrap();
        assert_eq!(back, digest);
    }

    #[test]
    fn zero_sentinel() {
        assert!(Checksum256::zero().is_zero());
        assert_eq!(
            Checksum256::zero().to_string(),
            "0000000000000000000000000000000000000000000000000000000000000000"
        );
    }
}
