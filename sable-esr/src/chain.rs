//! Well-known chain identities.
//!
//! Signing requests may name their chain by a one-byte alias into this
//! table instead of spending 32 bytes on the full id.

use sable_codec::{Decode, Decoder, Encode, Encoder};
use sable_crypto::hash::Checksum256;
use serde::{Deserialize, Serialize};

macro_rules! chain_aliases {
    ($( $variant:ident = $tag:literal, $id:literal; )*) => {
        /// One-byte shorthand for a well-known chain.
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[serde(rename_all = "lowercase")]
        pub enum ChainAlias {
            $( $variant, )*
        }

        impl ChainAlias {
            pub fn tag(&self) -> u8 {
                match self {
                    $( ChainAlias::$variant => $tag, )*
                }
            }

            pub fn from_tag(tag: u8) -> Option<ChainAlias> {
                match tag {
                    $( $tag => Some(ChainAlias::$variant), )*
                    _ => None,
                }
            }

            /// The full 32-byte chain id, if the alias names a real chain.
            pub fn chain_id(&self) -> Option<Checksum256> {
                let hex: &str = match self {
                    $( ChainAlias::$variant => $id, )*
                };
                if hex.is_empty() {
                    return None;
                }
                hex.parse().ok()
            }

            pub fn from_chain_id(id: &Checksum256) -> Option<ChainAlias> {
                [ $( ChainAlias::$variant, )* ]
                    .into_iter()
                    .find(|alias| alias.chain_id().as_ref() == Some(id))
            }
        }
    };
}

chain_aliases! {
    Unknown = 0, "";
    Eos = 1, "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906";
    Telos = 2, "4667b205c6838ef70ff7988f6e8257e8be0e1284a2f59699054a018f743b1d11";
    Jungle = 3, "e70aaab8997e1dfce58fbfac80cbbb8fecec7b99cf982a9444273cbc64c41473";
    Kylin = 4, "5fff1dae8dc8e2fc4d5b23b2c7665c97f9e9d8edf2b6485a86ba311c25639191";
    Worbli = 5, "73647cde120091e0a4b85bced2f3cfdb3041e266cbbe95cee59b73235a1b3b6f";
    Bos = 6, "d5a3d18fbb3c084e3b1f3fa98c21014b5f3db536cc15d08f9f6479517c6a3d86";
    Meetone = 7, "cfe6486a83bad4962f232d48003b1824ab5665c36778141034d75e57b956e422";
    Insights = 8, "b042025541e25a472bffde2d62edd457b7e70cee943412b1ea0f044f88591664";
    Beos = 9, "b912d19a6abd2b1b05611ae5be473355d64d95aeff0c09bedc8c166cd6468fe4";
}

/// A chain named either by alias or by its full id.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ChainId {
    Alias(ChainAlias),
    Id(Checksum256),
}

impl ChainId {
    /// The full 32-byte id, when one is known.
    pub fn chain_id(&self) -> Option<Checksum256> {
        match self {
            ChainId::Alias(alias) => alias.chain_id(),
            ChainId::Id(id) => Some(*id),
        }
    }

    pub fn alias(&self) -> Option<ChainAlias> {
        match self {
            ChainId::Alias(alias) => Some(*alias),
            ChainId::Id(id) => ChainAlias::from_chain_id(id),
        }
    }

    /// The most compact equivalent form: alias when the id is well known.
    pub fn compacted(&self) -> ChainId {
        match self.alias() {
            Some(alias) => ChainId::Alias(alias),
            None => *self,
        }
    }
}

impl From<ChainAlias> for ChainId {
    fn from(alias: ChainAlias) -> Self {
        ChainId::Alias(alias)
    }
}

impl From<Checksum256> for ChainId {
    fn from(id: Checksum256) -> Self {
        ChainId::Id(id)
    }
}

impl Encode for ChainId {
    fn encode(&self, e: &mut Encoder) {
        match self {
            ChainId::Alias(alias) => {
                e.varuint32(0);
                e.u8(alias.tag());
            }
            ChainId::Id(id) => {
                e.varuint32(1);
                id.encode(e);
            }
        }
    }
}

impl Decode for ChainId {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        match d.varuint32()? {
            0 => {
                let tag = d.u8()?;
                let alias = ChainAlias::from_tag(tag)
                    .ok_or(sable_codec::Error::UnknownVariant(tag as u64))?;
                Ok(ChainId::Alias(alias))
            }
            1 => Ok(ChainId::Id(Checksum256::decode(d)?)),
            other => Err(sable_codec::Error::UnknownVariant(other as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table_is_bijective() {
        for tag in 1..=9u8 {
            let alias = ChainAlias::from_tag(tag).unwrap();
            assert_eq!(alias.tag(), tag);
            let id = alias.chain_id().unwrap();
            assert_eq!(ChainAlias::from_chain_id(&id), Some(alias));
        }
        assert_eq!(ChainAlias::from_tag(0), Some(ChainAlias::Unknown));
        assert_eq!(ChainAlias::Unknown.chain_id(), None);
        assert_eq!(ChainAlias::from_tag(10), None);
    }

    #[test]
    fn full_ids_compact_to_aliases() {
        let eos: Checksum256 = "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906"
            .parse()
            .unwrap();
        assert_eq!(
            ChainId::Id(eos).compacted(),
            ChainId::Alias(ChainAlias::Eos)
        );

        let unknown: Checksum256 =
            "00000000000000000000000000000000000000000000000000000000000000ff"
                .parse()
                .unwrap();
        assert_eq!(ChainId::Id(unknown).compacted(), ChainId::Id(unknown));
    }

    #[test]
    fn wire_forms() {
        let alias = ChainId::Alias(ChainAlias::Eos);
        assert_eq!(sable_codec::to_vec(&alias), vec![0x00, 0x01]);

        let id = ChainId::Id(ChainAlias::Telos.chain_id().unwrap());
        let bytes = sable_codec::to_vec(&id);
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 0x01);
        let back: ChainId = sable_codec::from_slice(&bytes).unwrap();
        assert_eq!(back, id);
    }
}
