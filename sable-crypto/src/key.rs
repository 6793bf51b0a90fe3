//! Asymmetric keys and signatures with their chain string forms.
//!
//! The K1 (secp256k1) curve is fully functional: signing, recovery,
//! verification and ECDH all work. Other curves (`R1`, `WA`, anything a
//! newer chain may add) are carried opaquely so their values round-trip
//! unchanged through both the string and the wire form.
//!
//! String forms:
//!
//! * modern: `PUB_K1_…`, `PVT_K1_…`, `SIG_K1_…` — base58 with a
//!   RIPEMD-160 checksum salted by the curve tag
//! * legacy public: `EOS…` (any chain prefix of at least three characters
//!   is accepted when parsing)
//! * legacy private: WIF, version byte `0x80` with a double-SHA-256
//!   checksum

use std::fmt;
use std::str::FromStr;

use rand_core::{CryptoRng, RngCore};
use sable_codec::{Decode, Decoder, Encode, Encoder};

use crate::base58;
use crate::hash::{Checksum256, Checksum512, Sha256};
use crate::secp;
use crate::Error;

/// Curve identifier carried by keys and signatures.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CurveType {
    K1,
    R1,
    Wa,
    Unknown(String),
}

impl CurveType {
    pub fn as_str(&self) -> &str {
        match self {
            CurveType::K1 => "K1",
            CurveType::R1 => "R1",
            CurveType::Wa => "WA",
            CurveType::Unknown(s) => s,
        }
    }

    /// One-byte wire tag; curves outside the documented set share 255.
    pub fn tag(&self) -> u8 {
        match self {
            CurveType::K1 => 0,
            CurveType::R1 => 1,
            CurveType::Wa => 2,
            CurveType::Unknown(_) => 255,
        }
    }
}

impl FromStr for CurveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::InvalidCurve(s.to_string()));
        }
        Ok(match s {
            "K1" => CurveType::K1,
            "R1" => CurveType::R1,
            "WA" => CurveType::Wa,
            other => CurveType::Unknown(other.to_string()),
        })
    }
}

impl fmt::Display for CurveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! string_form_serde {
    ($Type:ty, $expecting:literal) => {
        impl serde::Serialize for $Type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> serde::Deserialize<'de> for $Type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct V;

                impl serde::de::Visitor<'_> for V {
                    type Value = $Type;

                    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                        f.write_str($expecting)
                    }

                    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        s.parse().map_err(serde::de::Error::custom)
                    }
                }

                deserializer.deserialize_str(V)
            }
        }
    };
}

/// A public key: 33 compressed bytes for K1, opaque payload otherwise.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PublicKey {
    K1([u8; 33]),
    Unknown { curve: String, data: Vec<u8> },
}

impl PublicKey {
    pub const K1_SIZE: usize = 33;

    pub fn from_k1_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let data: [u8; 33] = bytes.try_into().map_err(|_| Error::InvalidLength(bytes.len()))?;
        Ok(PublicKey::K1(data))
    }

    pub fn curve(&self) -> CurveType {
        match self {
            PublicKey::K1(_) => CurveType::K1,
            PublicKey::Unknown { curve, .. } => curve
                .parse()
                .unwrap_or_else(|_| CurveType::Unknown(curve.clone())),
        }
    }

    pub fn key_data(&self) -> &[u8] {
        match self {
            PublicKey::K1(data) => data,
            PublicKey::Unknown { data, .. } => data,
        }
    }

    /// Legacy `EOS…` form; only defined for K1 keys.
    pub fn to_legacy_string(&self, prefix: &str) -> Result<String, Error> {
        match self {
            PublicKey::K1(data) => Ok(format!("{prefix}{}", base58::encode_ripemd_check(data, ""))),
            PublicKey::Unknown { curve, .. } => Err(Error::UnsupportedCurve(curve.clone())),
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let curve = self.curve();
        write!(
            f,
            "PUB_{}_{}",
            curve,
            base58::encode_ripemd_check(self.key_data(), curve.as_str())
        )
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_string()).finish()
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if let Some(rest) = s.strip_prefix("PUB_") {
            let (curve_str, payload) = rest
                .split_once('_')
                .ok_or_else(|| Error::UnknownStringFormat(s.to_string()))?;
            let curve: CurveType = curve_str.parse()?;
            let data = base58::decode_ripemd_check(payload, curve.as_str())?;
            return match curve {
                CurveType::K1 => PublicKey::from_k1_bytes(&data),
                other => Ok(PublicKey::Unknown {
                    curve: other.as_str().to_string(),
                    data,
                }),
            };
        }

        // legacy form: chain prefix (EOS, FIO, ...) followed by base58 with
        // an unsalted RIPEMD-160 checksum
        if s.len() > 3 && s.is_char_boundary(3) {
            let data = base58::decode_ripemd_check(&s[3..], "")?;
            return PublicKey::from_k1_bytes(&data);
        }

        Err(Error::UnknownStringFormat(s.to_string()))
    }
}

string_form_serde!(PublicKey, "a public key string");

impl Encode for PublicKey {
    fn encode(&self, e: &mut Encoder) {
        e.u8(self.curve().tag());
        e.raw(self.key_data());
    }
}

impl Decode for PublicKey {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        let tag = d.u8()?;
        let data = d.raw(PublicKey::K1_SIZE)?;
        match tag {
            0 => Ok(PublicKey::K1(data.try_into().expect("length checked"))),
            1 => Ok(PublicKey::Unknown {
                curve: "R1".to_string(),
                data: data.to_vec(),
            }),
            2 => Ok(PublicKey::Unknown {
                curve: "WA".to_string(),
                data: data.to_vec(),
            }),
            other => Err(sable_codec::Error::UnknownVariant(other as u64)),
        }
    }
}

/// A private key: 32 scalar bytes for K1, opaque payload otherwise.
///
/// `Display` prints the WIF form for K1 keys, matching what wallets import
/// and export; [`PrivateKey::to_modern_string`] gives the `PVT_…` form.
#[derive(Clone, PartialEq, Eq)]
pub enum PrivateKey {
    K1([u8; 32]),
    Unknown { curve: String, data: Vec<u8> },
}

impl PrivateKey {
    pub const K1_SIZE: usize = 32;

    /// generate a new K1 key with the given random number generator
    pub fn generate<Rng>(mut rng: Rng) -> Self
    where
        Rng: RngCore + CryptoRng,
    {
        let mut bytes = [0u8; Self::K1_SIZE];
        loop {
            rng.fill_bytes(&mut bytes);
            if secp::validate_secret(&bytes) {
                return PrivateKey::K1(bytes);
            }
        }
    }

    pub fn from_k1_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let data: [u8; 32] = bytes.try_into().map_err(|_| Error::InvalidLength(bytes.len()))?;
        Ok(PrivateKey::K1(data))
    }

    pub fn curve(&self) -> CurveType {
        match self {
            PrivateKey::K1(_) => CurveType::K1,
            PrivateKey::Unknown { curve, .. } => curve
                .parse()
                .unwrap_or_else(|_| CurveType::Unknown(curve.clone())),
        }
    }

    /// derive the public key; only defined for K1
    pub fn to_public(&self) -> Result<PublicKey, Error> {
        match self {
            PrivateKey::K1(data) => Ok(PublicKey::K1(secp::derive_public(data)?)),
            PrivateKey::Unknown { curve, .. } => Err(Error::UnsupportedCurve(curve.clone())),
        }
    }

    /// sign a message, hashing it with SHA-256 first
    pub fn sign(&self, message: &[u8]) -> Result<Signature, Error> {
        self.sign_digest(&Sha256::hash(message))
    }

    /// sign a precomputed 32-byte digest
    pub fn sign_digest(&self, digest: &Checksum256) -> Result<Signature, Error> {
        match self {
            PrivateKey::K1(data) => {
                let (sig, recovery) = secp::sign_canonical(digest, data)?;
                Ok(Signature::K1 {
                    data: sig,
                    recovery,
                })
            }
            PrivateKey::Unknown { curve, .. } => Err(Error::UnsupportedCurve(curve.clone())),
        }
    }

    /// ECDH shared secret with another party's public key.
    ///
    /// `a.shared_secret(B) == b.shared_secret(A)` for key pairs (a, A) and
    /// (b, B).
    pub fn shared_secret(&self, their: &PublicKey) -> Result<Checksum512, Error> {
        match (self, their) {
            (PrivateKey::K1(sk), PublicKey::K1(pk)) => secp::shared_secret(sk, pk),
            (PrivateKey::Unknown { curve, .. }, _) => Err(Error::UnsupportedCurve(curve.clone())),
            (_, PublicKey::Unknown { curve, .. }) => Err(Error::UnsupportedCurve(curve.clone())),
        }
    }

    /// WIF string; only defined for K1
    pub fn to_wif(&self) -> Result<String, Error> {
        match self {
            PrivateKey::K1(data) => {
                let mut payload = vec![0x80];
                payload.extend_from_slice(data);
                Ok(base58::encode_sha256_check(&payload))
            }
            PrivateKey::Unknown { curve, .. } => Err(Error::UnsupportedCurve(curve.clone())),
        }
    }

    pub fn to_modern_string(&self) -> String {
        let curve = self.curve();
        let data = match self {
            PrivateKey::K1(data) => &data[..],
            PrivateKey::Unknown { data, .. } => data,
        };
        format!(
            "PVT_{}_{}",
            curve,
            base58::encode_ripemd_check(data, curve.as_str())
        )
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_wif() {
            Ok(wif) => f.write_str(&wif),
            Err(_) => f.write_str(&self.to_modern_string()),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // keep key material out of logs
        f.debug_tuple("PrivateKey").field(&self.curve()).finish()
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if let Some(rest) = s.strip_prefix("PVT_") {
            let (curve_str, payload) = rest
                .split_once('_')
                .ok_or_else(|| Error::UnknownStringFormat(s.to_string()))?;
            let curve: CurveType = curve_str.parse()?;
            let data = base58::decode_ripemd_check(payload, curve.as_str())?;
            return match curve {
                CurveType::K1 => PrivateKey::from_k1_bytes(&data),
                other => Ok(PrivateKey::Unknown {
                    curve: other.as_str().to_string(),
                    data,
                }),
            };
        }

        // WIF: 0x80 version byte, 32 key bytes, double-SHA-256 checksum
        let payload = base58::decode_sha256_check(s)?;
        if payload.len() != 33 {
            return Err(Error::InvalidLength(payload.len()));
        }
        if payload[0] != 0x80 {
            return Err(Error::UnknownStringFormat(s.to_string()));
        }
        PrivateKey::from_k1_bytes(&payload[1..])
    }
}

string_form_serde!(PrivateKey, "a private key string");

/// A recoverable signature: 64 compact bytes plus a recovery id for K1.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    K1 { data: [u8; 64], recovery: u8 },
    Unknown { curve: String, data: Vec<u8> },
}

impl Signature {
    /// Wire payload width shared by all curve tags.
    pub const SIZE: usize = 65;

    pub fn curve(&self) -> CurveType {
        match self {
            Signature::K1 { .. } => CurveType::K1,
            Signature::Unknown { curve, .. } => curve
                .parse()
                .unwrap_or_else(|_| CurveType::Unknown(curve.clone())),
        }
    }

    /// The 65-byte payload: recovery id + 31 first, then r ‖ s.
    fn payload(&self) -> Vec<u8> {
        match self {
            Signature::K1 { data, recovery } => {
                let mut out = Vec::with_capacity(Self::SIZE);
                out.push(recovery + 31);
                out.extend_from_slice(data);
                out
            }
            Signature::Unknown { data, .. } => data.clone(),
        }
    }

    fn from_payload(curve: CurveType, payload: &[u8]) -> Result<Self, Error> {
        match curve {
            CurveType::K1 => {
                if payload.len() != Self::SIZE {
                    return Err(Error::InvalidLength(payload.len()));
                }
                let recovery = payload[0]
                    .checked_sub(31)
                    .filter(|r| *r <= 3)
                    .ok_or(Error::InvalidRecoveryId(payload[0]))?;
                let data: [u8; 64] = payload[1..].try_into().expect("length checked");
                Ok(Signature::K1 { data, recovery })
            }
            other => Ok(Signature::Unknown {
                curve: other.as_str().to_string(),
                data: payload.to_vec(),
            }),
        }
    }

    /// recover the signing public key from a message (SHA-256 hashed first)
    pub fn recover(&self, message: &[u8]) -> Result<PublicKey, Error> {
        self.recover_digest(&Sha256::hash(message))
    }

    pub fn recover_digest(&self, digest: &Checksum256) -> Result<PublicKey, Error> {
        match self {
            Signature::K1 { data, recovery } => {
                Ok(PublicKey::K1(secp::recover(digest, data, *recovery)?))
            }
            Signature::Unknown { curve, .. } => Err(Error::UnsupportedCurve(curve.clone())),
        }
    }

    pub fn verify(&self, message: &[u8], key: &PublicKey) -> bool {
        self.verify_digest(&Sha256::hash(message), key)
    }

    pub fn verify_digest(&self, digest: &Checksum256, key: &PublicKey) -> bool {
        match (self, key) {
            (Signature::K1 { data, recovery }, PublicKey::K1(pk)) => {
                secp::verify(digest, data, *recovery, pk)
            }
            _ => false,
        }
    }

    /// canonical-form test; non-K1 signatures are vacuously canonical
    pub fn is_canonical(&self) -> bool {
        match self {
            Signature::K1 { data, .. } => secp::is_canonical(data),
            Signature::Unknown { .. } => true,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let curve = self.curve();
        write!(
            f,
            "SIG_{}_{}",
            curve,
            base58::encode_ripemd_check(&self.payload(), curve.as_str())
        )
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.to_string()).finish()
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let rest = s
            .strip_prefix("SIG_")
            .ok_or_else(|| Error::UnknownStringFormat(s.to_string()))?;
        let (curve_str, payload) = rest
            .split_once('_')
            .ok_or_else(|| Error::UnknownStringFormat(s.to_string()))?;
        let curve: CurveType = curve_str.parse()?;
        let data = base58::decode_ripemd_check(payload, curve.as_str())?;
        Signature::from_payload(curve, &data)
    }
}

string_form_serde!(Signature, "a signature string");

impl Encode for Signature {
    fn encode(&self, e: &mut Encoder) {
        e.u8(self.curve().tag());
        e.raw(&self.payload());
    }
}

impl Decode for Signature {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        let tag = d.u8()?;
        let payload = d.raw(Signature::SIZE)?;
        let curve = match tag {
            0 => CurveType::K1,
            1 => CurveType::R1,
            2 => CurveType::Wa,
            other => return Err(sable_codec::Error::UnknownVariant(other as u64)),
        };
        Signature::from_payload(curve, payload).map_err(|_| sable_codec::Error::IntOutOfRange)
    }
}
