//! EEP-7 signing requests.
//!
//! A signing request describes a transaction (or a template of one) for a
//! remote wallet to sign: `esr:` URI → optionally deflated payload → ABI
//! encoded request body. Resolving a request substitutes the reserved
//! placeholder names with the actual signer and fills in TaPoS values from
//! a recent block.

pub mod callback;
pub mod chain;

use std::collections::BTreeMap;
use std::io::Read;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sable_abi::def::{ActionDef, FieldDef, StructDef};
use sable_abi::{Abi, AbiDef};
use sable_codec::utils::Bytes;
use sable_codec::{Decode, Decoder, Encode, Encoder};
use sable_crypto::hash::{Checksum256, Sha256};
use sable_crypto::key::{PrivateKey, PublicKey, Signature};
use sable_primitives::{
    Action, Name, PermissionLevel, TimePointSec, Transaction,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

pub use callback::{Callback, CallbackPayload};
pub use chain::{ChainAlias, ChainId};

/// Stands for "the signing account" until resolution.
pub const PLACEHOLDER_ACTOR: Name = Name::from_raw(1);

/// Stands for "the signing permission" until resolution.
pub const PLACEHOLDER_PERMISSION: Name = Name::from_raw(2);

/// Protocol version emitted by default.
const VERSION: u8 = 2;

/// Version that extends identity requests with a scope.
const VERSION_SCOPED: u8 = 3;

const COMPRESSION_BIT: u8 = 0x80;

/// Cap on the inflated size of a compressed request payload.
const MAX_INFLATED_SIZE: u64 = 5 * 1024 * 1024;

/// Seconds of validity granted when the TaPoS source has no expiration.
const DEFAULT_EXPIRATION_SECS: u32 = 60;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not a signing request uri: {0}")]
    InvalidUri(String),

    #[error("unsupported signing request version {0}")]
    UnsupportedVersion(u8),

    #[error("failed to inflate request payload: {0}")]
    DecompressionFailed(String),

    #[error("payload too large")]
    PayloadTooLarge,

    #[error("no ABI available for account {0}")]
    MissingAbi(Name),

    #[error("ABI for {account} declares no action {action}")]
    UnknownAction { account: Name, action: Name },

    #[error("request carries no TaPoS values and no source was given")]
    MissingTapos,

    #[error("callback key {0} is reserved")]
    ReservedCallbackKey(String),

    #[error(transparent)]
    Abi(#[from] sable_abi::Error),

    #[error(transparent)]
    Codec(#[from] sable_codec::Error),

    #[error(transparent)]
    Crypto(#[from] sable_crypto::Error),
}

/// Behavior hints carried by the request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RequestFlags(u8);

impl RequestFlags {
    pub const BROADCAST: u8 = 1 << 0;
    pub const BACKGROUND: u8 = 1 << 1;

    pub const fn new(bits: u8) -> Self {
        RequestFlags(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Broadcast the transaction after signing instead of returning it.
    pub const fn broadcast(&self) -> bool {
        self.0 & Self::BROADCAST != 0
    }

    /// Deliver the callback with a background POST, not a redirect.
    pub const fn background(&self) -> bool {
        self.0 & Self::BACKGROUND != 0
    }

    pub fn set_broadcast(&mut self, on: bool) {
        if on {
            self.0 |= Self::BROADCAST;
        } else {
            self.0 &= !Self::BROADCAST;
        }
    }

    pub fn set_background(&mut self, on: bool) {
        if on {
            self.0 |= Self::BACKGROUND;
        } else {
            self.0 &= !Self::BACKGROUND;
        }
    }
}

/// Arbitrary metadata attached to a request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InfoPair {
    pub key: String,
    pub value: Bytes,
}

impl Encode for InfoPair {
    fn encode(&self, e: &mut Encoder) {
        self.key.encode(e);
        self.value.encode(e);
    }
}

impl Decode for InfoPair {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(InfoPair {
            key: String::decode(d)?,
            value: Bytes::decode(d)?,
        })
    }
}

/// An identity assertion request.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Identity {
    pub account: Name,
    pub request_key: Option<PublicKey>,
    /// Scope the identity proof is valid for; upgrades the payload to
    /// version 3 when present.
    pub scope: Option<Name>,
}

impl Identity {
    /// The pseudo-action that carries an identity assertion through the
    /// signing flow.
    pub fn to_action(&self) -> Action {
        let mut e = Encoder::new();
        self.account.encode(&mut e);
        self.request_key.encode(&mut e);
        if let Some(scope) = self.scope {
            // trailing binary extension of the identity struct
            scope.encode(&mut e);
        }
        Action {
            account: Name::from_raw(0),
            name: Name::new("identity"),
            authorization: vec![PermissionLevel::new(PLACEHOLDER_ACTOR, PLACEHOLDER_PERMISSION)],
            data: e.into_bytes().into(),
        }
    }
}

/// What the wallet is being asked to sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// One action; TaPoS comes from the resolver.
    Action(Action),
    /// Several actions in one transaction; TaPoS comes from the resolver.
    Actions(Vec<Action>),
    /// A full transaction, possibly with its header already filled.
    Transaction(Transaction),
    /// An identity assertion.
    Identity(Identity),
}

/// Signature block appended to a signed request payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RequestSignature {
    pub signer: Name,
    pub signature: Signature,
}

impl Encode for RequestSignature {
    fn encode(&self, e: &mut Encoder) {
        self.signer.encode(e);
        self.signature.encode(e);
    }
}

impl Decode for RequestSignature {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(RequestSignature {
            signer: Name::decode(d)?,
            signature: Signature::decode(d)?,
        })
    }
}

/// TaPoS values taken from a recent block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tapos {
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    /// When absent, resolution stamps "now + 60 seconds".
    pub expiration: Option<TimePointSec>,
}

/// A decoded EEP-7 signing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningRequest {
    pub chain_id: ChainId,
    pub request: Request,
    pub flags: RequestFlags,
    pub callback: String,
    pub info: Vec<InfoPair>,
    pub signature: Option<RequestSignature>,
}

impl SigningRequest {
    pub fn new(chain_id: ChainId, request: Request) -> Self {
        SigningRequest {
            chain_id,
            request,
            flags: RequestFlags::new(RequestFlags::BROADCAST),
            callback: String::new(),
            info: vec![],
            signature: None,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.request, Request::Identity(_))
    }

    /// The version this request encodes as.
    pub fn version(&self) -> u8 {
        match &self.request {
            Request::Identity(identity) if identity.scope.is_some() => VERSION_SCOPED,
            _ => VERSION,
        }
    }

    /// The actions as they appear in the request, placeholders intact.
    pub fn raw_actions(&self) -> Vec<Action> {
        match &self.request {
            Request::Action(action) => vec![action.clone()],
            Request::Actions(actions) => actions.clone(),
            Request::Transaction(tx) => tx.actions.clone(),
            Request::Identity(identity) => vec![identity.to_action()],
        }
    }

    fn encode_body(&self, version: u8, e: &mut Encoder) {
        self.chain_id.encode(e);
        match &self.request {
            Request::Action(action) => {
                e.varuint32(0);
                action.encode(e);
            }
            Request::Actions(actions) => {
                e.varuint32(1);
                actions.encode(e);
            }
            Request::Transaction(tx) => {
                e.varuint32(2);
                tx.encode(e);
            }
            Request::Identity(identity) => {
                e.varuint32(3);
                identity.account.encode(e);
                identity.request_key.encode(e);
                if version >= VERSION_SCOPED {
                    identity.scope.encode(e);
                }
            }
        }
        e.u8(self.flags.bits());
        e.str(&self.callback);
        self.info.encode(e);
    }

    fn decode_body(version: u8, d: &mut Decoder) -> Result<Self, Error> {
        let chain_id = ChainId::decode(d)?;
        let request = match d.varuint32()? {
            0 => Request::Action(Action::decode(d)?),
            1 => Request::Actions(Vec::decode(d)?),
            2 => Request::Transaction(Transaction::decode(d)?),
            3 => {
                let account = Name::decode(d)?;
                let request_key = Option::decode(d)?;
                let scope = if version >= VERSION_SCOPED {
                    Option::decode(d)?
                } else {
                    None
                };
                Request::Identity(Identity {
                    account,
                    request_key,
                    scope,
                })
            }
            other => return Err(sable_codec::Error::UnknownVariant(other as u64).into()),
        };
        let flags = RequestFlags::new(d.u8()?);
        let callback = d.str()?;
        let info = Vec::decode(d)?;
        let signature = if d.remaining() > 0 {
            Some(RequestSignature::decode(d)?)
        } else {
            None
        };
        if d.remaining() > 0 {
            return Err(sable_codec::Error::TrailingBytes(d.remaining()).into());
        }
        Ok(SigningRequest {
            chain_id,
            request,
            flags,
            callback,
            info,
            signature,
        })
    }

    /// Encode to an `esr:` URI, compressing when that actually saves bytes.
    pub fn encode(&self) -> String {
        self.to_uri(true, true)
    }

    pub fn to_uri(&self, compress: bool, slashes: bool) -> String {
        let version = self.version();
        let mut e = Encoder::new();
        self.encode_body(version, &mut e);
        if let Some(signature) = &self.signature {
            signature.encode(&mut e);
        }
        let body = e.into_bytes();

        let mut header = version;
        let mut tail = body;
        if compress {
            let deflated = deflate(&tail);
            if deflated.len() < tail.len() {
                header |= COMPRESSION_BIT;
                tail = deflated;
            }
        }

        let mut payload = Vec::with_capacity(tail.len() + 1);
        payload.push(header);
        payload.extend_from_slice(&tail);
        let scheme = if slashes { "esr://" } else { "esr:" };
        format!("{scheme}{}", URL_SAFE_NO_PAD.encode(payload))
    }

    pub fn decode(uri: &str) -> Result<Self, Error> {
        let trimmed = uri.trim();
        let rest = trimmed
            .strip_prefix("esr:")
            .ok_or_else(|| Error::InvalidUri(trimmed.to_string()))?;
        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let payload = URL_SAFE_NO_PAD
            .decode(rest.trim_end_matches('='))
            .map_err(|_| Error::InvalidUri(trimmed.to_string()))?;
        let (header, tail) = payload
            .split_first()
            .ok_or_else(|| Error::InvalidUri(trimmed.to_string()))?;

        let version = header & !COMPRESSION_BIT;
        if version != VERSION && version != VERSION_SCOPED {
            return Err(Error::UnsupportedVersion(version));
        }

        let body = if header & COMPRESSION_BIT != 0 {
            trace!(compressed_len = tail.len(), "inflating request payload");
            inflate(tail)?
        } else {
            tail.to_vec()
        };

        Self::decode_body(version, &mut Decoder::new(&body))
    }

    /// The digest a request signature covers: version byte, the ASCII word
    /// `request`, then the body without any signature block.
    pub fn signing_digest(&self) -> Checksum256 {
        let version = self.version();
        let mut e = Encoder::new();
        self.encode_body(version, &mut e);

        let mut hasher = Sha256::new();
        hasher.input(&[version]);
        hasher.input(b"request");
        hasher.input(e.bytes());
        hasher.finalize()
    }

    /// Sign the request and attach the signature block.
    pub fn sign(&mut self, signer: Name, key: &PrivateKey) -> Result<(), Error> {
        let signature = key.sign_digest(&self.signing_digest())?;
        self.signature = Some(RequestSignature { signer, signature });
        Ok(())
    }

    /// Resolve placeholders and TaPoS into a signable transaction.
    pub fn resolve(
        &self,
        signer: PermissionLevel,
        abis: &BTreeMap<Name, Abi>,
        tapos: Option<&Tapos>,
    ) -> Result<ResolvedSigningRequest, Error> {
        let identity = identity_abi();
        let mut actions = Vec::new();
        for action in self.raw_actions() {
            let abi = if self.is_identity() {
                &identity
            } else {
                abis.get(&action.account)
                    .ok_or(Error::MissingAbi(action.account))?
            };
            let type_name = abi.action_type(action.name).ok_or(Error::UnknownAction {
                account: action.account,
                action: action.name,
            })?;

            let decoded = abi.decode_value(type_name, &action.data)?;
            let substituted = substitute_placeholders(&decoded, &signer);
            let data = abi.encode_value(type_name, &substituted)?;

            let authorization = action
                .authorization
                .iter()
                .map(|level| resolve_level(level, &signer))
                .collect();

            actions.push(Action {
                account: action.account,
                name: action.name,
                authorization,
                data: data.into(),
            });
        }

        let mut transaction = match &self.request {
            Request::Transaction(tx) => {
                let mut tx = tx.clone();
                tx.actions = actions;
                tx
            }
            _ => Transaction {
                actions,
                ..Default::default()
            },
        };

        if transaction.header_is_empty() && !self.is_identity() {
            let tapos = tapos.ok_or(Error::MissingTapos)?;
            transaction.ref_block_num = tapos.ref_block_num;
            transaction.ref_block_prefix = tapos.ref_block_prefix;
            transaction.expiration = tapos
                .expiration
                .unwrap_or_else(|| TimePointSec::now().after(DEFAULT_EXPIRATION_SECS));
        }

        Ok(ResolvedSigningRequest {
            request: self.clone(),
            signer,
            transaction,
        })
    }
}

/// A request after placeholder and TaPoS resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedSigningRequest {
    pub request: SigningRequest,
    pub signer: PermissionLevel,
    pub transaction: Transaction,
}

impl ResolvedSigningRequest {
    pub fn transaction_id(&self) -> Checksum256 {
        self.transaction.id()
    }

    pub fn signing_digest(&self, chain_id: &Checksum256) -> Checksum256 {
        self.transaction.signing_digest(chain_id)
    }

    /// The callback to deliver once signatures exist, if the request asked
    /// for one.
    pub fn callback(&self, signatures: &[Signature], block_num: Option<u32>) -> Option<Callback> {
        if self.request.callback.is_empty() || signatures.is_empty() {
            return None;
        }
        let payload = CallbackPayload {
            signatures: signatures.iter().map(|s| s.to_string()).collect(),
            tx: self.transaction.id().to_string(),
            bn: block_num.map(|n| n.to_string()).unwrap_or_default(),
            sa: self.signer.actor.to_string(),
            sp: self.signer.permission.to_string(),
            ex: self.transaction.expiration.to_string(),
            rbn: self.transaction.ref_block_num.to_string(),
            rid: self.transaction.ref_block_prefix.to_string(),
            req: self.request.to_uri(true, false),
        };
        Some(Callback {
            url: payload.apply_template(&self.request.callback),
            background: self.request.flags.background(),
            payload,
        })
    }
}

/// Substitute an authorization entry field-wise.
fn resolve_level(level: &PermissionLevel, signer: &PermissionLevel) -> PermissionLevel {
    PermissionLevel {
        actor: if level.actor == PLACEHOLDER_ACTOR {
            signer.actor
        } else {
            level.actor
        },
        permission: if level.permission == PLACEHOLDER_PERMISSION {
            signer.permission
        } else {
            level.permission
        },
    }
}

/// Substitute placeholder names anywhere a string sits in decoded action
/// data.
fn substitute_placeholders(value: &Value, signer: &PermissionLevel) -> Value {
    match value {
        Value::String(s) if *s == PLACEHOLDER_ACTOR.to_string() => {
            Value::String(signer.actor.to_string())
        }
        Value::String(s) if *s == PLACEHOLDER_PERMISSION.to_string() => {
            Value::String(signer.permission.to_string())
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_placeholders(item, signer))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_placeholders(v, signer)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// The synthetic ABI behind identity pseudo-actions.
fn identity_abi() -> Abi {
    Abi::from_def(AbiDef {
        structs: vec![StructDef {
            name: "identity".into(),
            base: String::new(),
            fields: vec![
                FieldDef {
                    name: "account".into(),
                    type_name: "name".into(),
                },
                FieldDef {
                    name: "request_key".into(),
                    type_name: "public_key?".into(),
                },
                FieldDef {
                    name: "scope".into(),
                    type_name: "name$".into(),
                },
            ],
        }],
        actions: vec![ActionDef {
            name: Name::new("identity"),
            type_name: "identity".into(),
            ricardian_contract: String::new(),
        }],
        ..Default::default()
    })
}

fn deflate(bytes: &[u8]) -> Vec<u8> {
    use std::io::Write;
    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::best());
    // writing into a Vec cannot fail
    encoder.write_all(bytes).expect("infallible write");
    encoder.finish().expect("infallible finish")
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut decoder = flate2::read::DeflateDecoder::new(bytes).take(MAX_INFLATED_SIZE + 1);
    decoder
        .read_to_end(&mut out)
        .map_err(|err| Error::DecompressionFailed(err.to_string()))?;
    if out.len() as u64 > MAX_INFLATED_SIZE {
        return Err(Error::PayloadTooLarge);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_the_reserved_names() {
        assert_eq!(PLACEHOLDER_ACTOR.to_string(), "............1");
        assert_eq!(PLACEHOLDER_PERMISSION.to_string(), "............2");
        assert_eq!(PLACEHOLDER_ACTOR, Name::new("............1"));
        assert_eq!(PLACEHOLDER_PERMISSION, Name::new("............2"));
    }

    #[test]
    fn flags_bits() {
        let mut flags = RequestFlags::default();
        assert!(!flags.broadcast() && !flags.background());
        flags.set_broadcast(true);
        flags.set_background(true);
        assert_eq!(flags.bits(), 3);
        flags.set_broadcast(false);
        assert_eq!(flags.bits(), RequestFlags::BACKGROUND);
    }

    #[test]
    fn authorization_substitution_is_field_wise() {
        let signer = PermissionLevel::new("sable", "active");
        let templated = PermissionLevel::new(PLACEHOLDER_ACTOR, PLACEHOLDER_PERMISSION);
        assert_eq!(resolve_level(&templated, &signer), signer);

        let pinned = PermissionLevel::new("other", "owner");
        assert_eq!(resolve_level(&pinned, &signer), pinned);
    }
}
