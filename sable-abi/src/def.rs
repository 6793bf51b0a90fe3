//! The ABI description document as contracts publish it.
//!
//! Parsing is deliberately lenient: every top-level list may be missing and
//! the version string defaults to `eosio::abi/1.1`. The binary self-encoding
//! carries two slots this model does not populate (`error_messages` and
//! `abi_extensions`, both written empty) and stores the `variants` list as a
//! trailing binary extension so that readers of the older layout still work.

use sable_codec::utils::Bytes;
use sable_codec::{Decode, Decoder, Encode, Encoder};
use sable_primitives::Name;
use serde::{Deserialize, Serialize};

fn default_version() -> String {
    "eosio::abi/1.1".to_string()
}

/// `new_type_name` is an alias for `type`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeDef {
    pub new_type_name: String,
    #[serde(rename = "type")]
    pub target: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VariantDef {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionDef {
    pub name: Name,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub ricardian_contract: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TableDef {
    pub name: Name,
    #[serde(default)]
    pub index_type: String,
    #[serde(default)]
    pub key_names: Vec<String>,
    #[serde(default)]
    pub key_types: Vec<String>,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClausePair {
    pub id: String,
    pub body: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AbiDef {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub variants: Vec<VariantDef>,
    #[serde(default)]
    pub structs: Vec<StructDef>,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    #[serde(default)]
    pub tables: Vec<TableDef>,
    #[serde(default)]
    pub ricardian_clauses: Vec<ClausePair>,
}

impl Default for AbiDef {
    fn default() -> Self {
        AbiDef {
            version: default_version(),
            types: vec![],
            variants: vec![],
            structs: vec![],
            actions: vec![],
            tables: vec![],
            ricardian_clauses: vec![],
        }
    }
}

macro_rules! two_string_codec {
    ($Type:ty, $a:ident, $b:ident) => {
        impl Encode for $Type {
            fn encode(&self, e: &mut Encoder) {
                self.$a.encode(e);
                self.$b.encode(e);
            }
        }

        impl Decode for $Type {
            fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
                Ok(Self {
                    $a: Decode::decode(d)?,
                    $b: Decode::decode(d)?,
                })
            }
        }
    };
}

two_string_codec!(TypeDef, new_type_name, target);
two_string_codec!(FieldDef, name, type_name);
two_string_codec!(VariantDef, name, types);
two_string_codec!(ClausePair, id, body);

impl Encode for StructDef {
    fn encode(&self, e: &mut Encoder) {
        self.name.encode(e);
        self.base.encode(e);
        self.fields.encode(e);
    }
}

impl Decode for StructDef {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(StructDef {
            name: String::decode(d)?,
            base: String::decode(d)?,
            fields: Vec::decode(d)?,
        })
    }
}

impl Encode for ActionDef {
    fn encode(&self, e: &mut Encoder) {
        self.name.encode(e);
        self.type_name.encode(e);
        self.ricardian_contract.encode(e);
    }
}

impl Decode for ActionDef {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(ActionDef {
            name: Name::decode(d)?,
            type_name: String::decode(d)?,
            ricardian_contract: String::decode(d)?,
        })
    }
}

impl Encode for TableDef {
    fn encode(&self, e: &mut Encoder) {
        self.name.encode(e);
        self.index_type.encode(e);
        self.key_names.encode(e);
        self.key_types.encode(e);
        self.type_name.encode(e);
    }
}

impl Decode for TableDef {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(TableDef {
            name: Name::decode(d)?,
            index_type: String::decode(d)?,
            key_names: Vec::decode(d)?,
            key_types: Vec::decode(d)?,
            type_name: String::decode(d)?,
        })
    }
}

impl Encode for AbiDef {
    fn encode(&self, e: &mut Encoder) {
        self.version.encode(e);
        self.types.encode(e);
        self.structs.encode(e);
        self.actions.encode(e);
        self.tables.encode(e);
        self.ricardian_clauses.encode(e);
        // error_messages and abi_extensions: carried empty
        e.varuint32(0);
        e.varuint32(0);
        // variants ride as a trailing binary extension
        self.variants.encode(e);
    }
}

impl Decode for AbiDef {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        let version = String::decode(d)?;
        let types = Vec::decode(d)?;
        let structs = Vec::decode(d)?;
        let actions = Vec::decode(d)?;
        let tables = Vec::decode(d)?;
        let ricardian_clauses = Vec::decode(d)?;
        // older writers may stop at any point past here
        if d.remaining() > 0 {
            let _error_messages: Vec<(u64, String)> = Vec::decode(d)?;
        }
        if d.remaining() > 0 {
            let _abi_extensions: Vec<(u16, Bytes)> = Vec::decode(d)?;
        }
        let variants = if d.remaining() > 0 {
            Vec::decode(d)?
        } else {
            vec![]
        };
        Ok(AbiDef {
            version,
            types,
            variants,
            structs,
            actions,
            tables,
            ricardian_clauses,
        })
    }
}
