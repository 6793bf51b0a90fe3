//! The transaction family: bare, signed and packed transactions.

use std::io::Read;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sable_codec::utils::{Blob, Bytes, VarUint32};
use sable_codec::{Decode, Decoder, Encode, Encoder};
use sable_crypto::hash::{Checksum256, Sha256};
use sable_crypto::key::{PrivateKey, Signature};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Action, TimePointSec};

/// Cap on the inflated size of a packed transaction payload.
const MAX_INFLATED_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("unsupported compression tag {0}")]
    UnsupportedCompression(u8),

    #[error("packed payload inflates past {MAX_INFLATED_SIZE} bytes")]
    TooLarge,

    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] sable_codec::Error),
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TransactionExtension {
    #[serde(rename = "type")]
    pub kind: u16,
    pub data: Bytes,
}

impl Encode for TransactionExtension {
    fn encode(&self, e: &mut Encoder) {
        self.kind.encode(e);
        self.data.encode(e);
    }
}

impl Decode for TransactionExtension {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(TransactionExtension {
            kind: u16::decode(d)?,
            data: Bytes::decode(d)?,
        })
    }
}

/// A transaction: the TaPoS/resource header followed by the actions.
///
/// The header fields sit inline because both the wire form and the JSON
/// form are flat.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Transaction {
    /// The time at which the transaction expires.
    pub expiration: TimePointSec,
    /// A block number in the last 2^16 blocks, proving recency.
    pub ref_block_num: u16,
    /// The lower 32 bits of that block's id.
    pub ref_block_prefix: u32,
    /// Upper limit on network bandwidth billed, in 8-byte words.
    pub max_net_usage_words: VarUint32,
    /// Upper limit on CPU time billed, in milliseconds.
    pub max_cpu_usage_ms: u8,
    /// Seconds to delay execution, during which it may be canceled.
    pub delay_sec: VarUint32,
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
    pub transaction_extensions: Vec<TransactionExtension>,
}

impl Transaction {
    /// Whether none of the TaPoS header fields have been filled in.
    pub fn header_is_empty(&self) -> bool {
        self.expiration == TimePointSec::default()
            && self.ref_block_num == 0
            && self.ref_block_prefix == 0
    }

    /// SHA-256 of the canonical encoding; how the chain identifies the
    /// transaction.
    pub fn id(&self) -> Checksum256 {
        Sha256::hash(&sable_codec::to_vec(self))
    }

    /// The digest a signature must cover: chain id, the canonical
    /// encoding, and a zeroed placeholder for the context-free data digest.
    pub fn signing_digest(&self, chain_id: &Checksum256) -> Checksum256 {
        let mut hasher = Sha256::new();
        hasher.input(chain_id.as_ref());
        hasher.input(&sable_codec::to_vec(self));
        hasher.input(&[0u8; 32]);
        hasher.finalize()
    }

    pub fn sign(
        &self,
        key: &PrivateKey,
        chain_id: &Checksum256,
    ) -> Result<Signature, sable_crypto::Error> {
        key.sign_digest(&self.signing_digest(chain_id))
    }
}

impl Encode for Transaction {
    fn encode(&self, e: &mut Encoder) {
        self.expiration.encode(e);
        self.ref_block_num.encode(e);
        self.ref_block_prefix.encode(e);
        self.max_net_usage_words.encode(e);
        self.max_cpu_usage_ms.encode(e);
        self.delay_sec.encode(e);
        self.context_free_actions.encode(e);
        self.actions.encode(e);
        self.transaction_extensions.encode(e);
    }
}

impl Decode for Transaction {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(Transaction {
            expiration: TimePointSec::decode(d)?,
            ref_block_num: u16::decode(d)?,
            ref_block_prefix: u32::decode(d)?,
            max_net_usage_words: VarUint32::decode(d)?,
            max_cpu_usage_ms: u8::decode(d)?,
            delay_sec: VarUint32::decode(d)?,
            context_free_actions: Vec::decode(d)?,
            actions: Vec::decode(d)?,
            transaction_extensions: Vec::decode(d)?,
        })
    }
}

/// A transaction together with its signatures and context-free data.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub signatures: Vec<Signature>,
    pub context_free_data: Vec<Blob>,
}

impl SignedTransaction {
    pub fn new(transaction: Transaction, signatures: Vec<Signature>) -> Self {
        SignedTransaction {
            transaction,
            signatures,
            context_free_data: vec![],
        }
    }
}

impl Encode for SignedTransaction {
    fn encode(&self, e: &mut Encoder) {
        self.transaction.encode(e);
        self.signatures.encode(e);
        self.context_free_data.encode(e);
    }
}

impl Decode for SignedTransaction {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(SignedTransaction {
            transaction: Transaction::decode(d)?,
            signatures: Vec::decode(d)?,
            context_free_data: Vec::decode(d)?,
        })
    }
}

/// The form transactions are pushed to the chain in: signatures beside an
/// optionally compressed encoding of the transaction itself.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedTransaction {
    pub signatures: Vec<Signature>,
    /// 0 = none, 1 = gzip
    pub compression: u8,
    pub packed_context_free_data: Bytes,
    pub packed_trx: Bytes,
}

impl PackedTransaction {
    pub const COMPRESSION_NONE: u8 = 0;
    pub const COMPRESSION_GZIP: u8 = 1;

    pub fn from_signed(
        signed: &SignedTransaction,
        compression: u8,
    ) -> Result<Self, PackError> {
        let trx = sable_codec::to_vec(&signed.transaction);
        // no context-free data packs as the empty byte string, not as an
        // encoded empty list
        let cfd = if signed.context_free_data.is_empty() {
            vec![]
        } else {
            sable_codec::to_vec(&signed.context_free_data)
        };
        let (packed_trx, packed_cfd) = match compression {
            Self::COMPRESSION_NONE => (trx, cfd),
            Self::COMPRESSION_GZIP => (deflate(&trx)?, deflate(&cfd)?),
            other => return Err(PackError::UnsupportedCompression(other)),
        };
        Ok(PackedTransaction {
            signatures: signed.signatures.clone(),
            compression,
            packed_context_free_data: packed_cfd.into(),
            packed_trx: packed_trx.into(),
        })
    }

    /// Inflate and decode the packed transaction bytes.
    pub fn transaction(&self) -> Result<Transaction, PackError> {
        Ok(sable_codec::from_slice(&self.unpacked(&self.packed_trx)?)?)
    }

    /// Recover the full signed transaction, context-free data included.
    pub fn unpack(&self) -> Result<SignedTransaction, PackError> {
        let context_free_data = {
            let bytes = self.unpacked(&self.packed_context_free_data)?;
            if bytes.is_empty() {
                vec![]
            } else {
                sable_codec::from_slice(&bytes)?
            }
        };
        Ok(SignedTransaction {
            transaction: self.transaction()?,
            signatures: self.signatures.clone(),
            context_free_data,
        })
    }

    fn unpacked(&self, payload: &Bytes) -> Result<Vec<u8>, PackError> {
        match self.compression {
            Self::COMPRESSION_NONE => Ok(payload.to_vec()),
            Self::COMPRESSION_GZIP => inflate(payload),
            other => Err(PackError::UnsupportedCompression(other)),
        }
    }
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, PackError> {
    use std::io::Write;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

fn inflate(bytes: &[u8]) -> Result<Vec<u8>, PackError> {
    let mut out = Vec::new();
    let mut decoder = GzDecoder::new(bytes).take(MAX_INFLATED_SIZE + 1);
    decoder.read_to_end(&mut out)?;
    if out.len() as u64 > MAX_INFLATED_SIZE {
        return Err(PackError::TooLarge);
    }
    Ok(out)
}

impl Encode for PackedTransaction {
    fn encode(&self, e: &mut Encoder) {
        self.signatures.encode(e);
        self.compression.encode(e);
        self.packed_context_free_data.encode(e);
        self.packed_trx.encode(e);
    }
}

impl Decode for PackedTransaction {
    fn decode(d: &mut Decoder) -> Result<Self, sable_codec::Error> {
        Ok(PackedTransaction {
            signatures: Vec::decode(d)?,
            compression: u8::decode(d)?,
            packed_context_free_data: Bytes::decode(d)?,
            packed_trx: Bytes::decode(d)?,
        })
    }
}
