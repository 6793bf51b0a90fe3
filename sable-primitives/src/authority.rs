//! Weighted authority structures used by account permissions.

use sable_codec::{Decode, Decoder, Encode, Encoder};
use sable_crypto::key::PublicKey;
use serde::{Deserialize, Serialize};

use crate::PermissionLevel;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyWeight {
    pub key: PublicKey,
    pub weight: u16,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PermissionLevelWeight {
    pub permission: PermissionLevel,
    pub weight: u16,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WaitWeight {
    pub wait_sec: u32,
    pub weight: u16,
}

/// A threshold over weighted keys, delegated accounts and wait times.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Authority {
    pub threshold: u32,
    #[serde(default)]
    pub keys: Vec<KeyWeight>,
    #[serde(default)]
    pub accounts: Vec<PermissionLevelWeight>,
    #[serde(default)]
    pub waits: Vec<WaitWeight>,
}

impl Authority {
    /// Single-key authority with threshold 1.
    pub fn with_key(key: PublicKey) -> Self {
        Authority {
            threshold: 1,
            keys: vec![KeyWeight { key, weight: 1 }],
            accounts: vec![],
            waits: vec![],
        }
    }

    /// Whether the keys alone can reach the threshold.
    pub fn satisfiable_by_keys(&self) -> bool {
        let total: u32 = self.keys.iter().map(|k| k.weight as u32).sum();
        total >= self.threshold
    }
}

impl Encode for KeyWeight {
    fn encode(&self, e: &mut Encoder) {
        self.key.encode(e);
        self.weight.encode(e);
    }
}

impl Decode for KeyWeight {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(KeyWeight {
            key: PublicKey::decode(d)?,
            weight: u16::decode(d)?,
        })
    }
}

impl Encode for PermissionLevelWeight {
    fn encode(&self, e: &mut Encoder) {
        self.permission.encode(e);
        self.weight.encode(e);
    }
}

impl Decode for PermissionLevelWeight {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(PermissionLevelWeight {
            permission: PermissionLevel::decode(d)?,
            weight: u16::decode(d)?,
        })
    }
}

impl Encode for WaitWeight {
    fn encode(&self, e: &mut Encoder) {
        self.wait_sec.encode(e);
        self.weight.encode(e);
    }
}

impl Decode for WaitWeight {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(WaitWeight {
            wait_sec: u32::decode(d)?,
            weight: u16::decode(d)?,
        })
    }
}

impl Encode for Authority {
    fn encode(&self, e: &mut Encoder) {
        self.threshold.encode(e);
        self.keys.encode(e);
        self.accounts.encode(e);
        self.waits.encode(e);
    }
}

impl Decode for Authority {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(Authority {
            threshold: u32::decode(d)?,
            keys: Vec::decode(d)?,
            accounts: Vec::decode(d)?,
            waits: Vec::decode(d)?,
        })
    }
}
