//! Actions and the permission levels that authorize them.

use std::fmt;
use std::str::FromStr;

use sable_codec::utils::Bytes;
use sable_codec::{Decode, Decoder, Encode, Encoder};
use serde::{Deserialize, Serialize};

use crate::{AccountName, ActionName, Asset, Name, ParseError, PermissionName};

/// An actor plus one of its permissions, written `actor@permission`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PermissionLevel {
    pub actor: AccountName,
    pub permission: PermissionName,
}

impl PermissionLevel {
    pub fn new(actor: impl Into<AccountName>, permission: impl Into<PermissionName>) -> Self {
        PermissionLevel {
            actor: actor.into(),
            permission: permission.into(),
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

impl FromStr for PermissionLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let (actor, permission) = s
            .split_once('@')
            .ok_or_else(|| ParseError::InvalidPermissionLevel(s.to_string()))?;
        Ok(PermissionLevel::new(actor, permission))
    }
}

impl Encode for PermissionLevel {
    fn encode(&self, e: &mut Encoder) {
        self.actor.encode(e);
        self.permission.encode(e);
    }
}

impl Decode for PermissionLevel {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(PermissionLevel {
            actor: Name::decode(d)?,
            permission: Name::decode(d)?,
        })
    }
}

/// A single call against a contract: which account, which entry point,
/// under whose authority, and the already-encoded arguments.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Action {
    pub account: AccountName,
    pub name: ActionName,
    pub authorization: Vec<PermissionLevel>,
    pub data: Bytes,
}

impl Action {
    /// Build an action by encoding `data` with its static wire codec.
    pub fn new(
        account: impl Into<AccountName>,
        name: impl Into<ActionName>,
        authorization: Vec<PermissionLevel>,
        data: &impl Encode,
    ) -> Self {
        Action {
            account: account.into(),
            name: name.into(),
            authorization,
            data: sable_codec::to_vec(data).into(),
        }
    }

    /// Decode the argument payload as a statically known type.
    pub fn data_as<T: Decode>(&self) -> Result<T, sable_codec::Error> {
        sable_codec::from_slice(&self.data)
    }
}

impl Encode for Action {
    fn encode(&self, e: &mut Encoder) {
        self.account.encode(e);
        self.name.encode(e);
        self.authorization.encode(e);
        self.data.encode(e);
    }
}

impl Decode for Action {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(Action {
            account: Name::decode(d)?,
            name: Name::decode(d)?,
            authorization: Vec::decode(d)?,
            data: Bytes::decode(d)?,
        })
    }
}

/// The token contract's transfer arguments.
///
/// Not a native chain type; contracts declare it through their ABI. It is
/// defined here because half the fixtures in the ecosystem are transfers.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Transfer {
    pub from: Name,
    pub to: Name,
    pub quantity: Asset,
    pub memo: String,
}

impl Encode for Transfer {
    fn encode(&self, e: &mut Encoder) {
        self.from.encode(e);
        self.to.encode(e);
        self.quantity.encode(e);
        self.memo.encode(e);
    }
}

impl Decode for Transfer {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(Transfer {
            from: Name::decode(d)?,
            to: Name::decode(d)?,
            quantity: Asset::decode(d)?,
            memo: String::decode(d)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_fixture() -> Transfer {
        Transfer {
            from: Name::new("foo"),
            to: Name::new("bar"),
            quantity: "1.0000 BAZ".parse().unwrap(),
            memo: "qux".into(),
        }
    }

    #[test]
    fn permission_level_string_form() {
        let level: PermissionLevel = "foo@active".parse().unwrap();
        assert_eq!(level.actor, Name::new("foo"));
        assert_eq!(level.permission, Name::new("active"));
        assert_eq!(level.to_string(), "foo@active");
        assert!("fooactive".parse::<PermissionLevel>().is_err());
    }

    #[test]
    fn transfer_canonical_binary() {
        let bytes = sable_codec::to_vec(&transfer_fixture());
        assert_eq!(
            hex::encode_upper(&bytes),
            "000000000000285D000000000000AE3910270000000000000442415A0000000003717578"
        );
        let back: Transfer = sable_codec::from_slice(&bytes).unwrap();
        assert_eq!(back, transfer_fixture());
    }

    #[test]
    fn transfer_canonical_json() {
        assert_eq!(
            serde_json::to_string(&transfer_fixture()).unwrap(),
            r#"{"from":"foo","to":"bar","quantity":"1.0000 BAZ","memo":"qux"}"#
        );
    }

    #[test]
    fn action_wraps_encoded_data() {
        let action = Action::new(
            "eosio.token",
            "transfer",
            vec![PermissionLevel::new("foo", "active")],
            &transfer_fixture(),
        );
        assert_eq!(action.account, Name::new("eosio.token"));
        assert_eq!(action.data_as::<Transfer>().unwrap(), transfer_fixture());

        let wire = sable_codec::to_vec(&action);
        let back: Action = sable_codec::from_slice(&wire).unwrap();
        assert_eq!(back, action);
    }
}
