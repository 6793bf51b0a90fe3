//! Shared secp256k1 context and the low-level K1 operations.
//!
//! The context is created once, configured for both signing and
//! verification, and seeded with OS randomness at creation. Re-randomizing
//! an existing context is not thread-safe, so no such operation is exposed;
//! sign/verify/recover/ECDH on the shared context are safe to call
//! concurrently.

use once_cell::sync::OnceCell;
use rand_core::{OsRng, TryRngCore};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};

use crate::hash::{Checksum256, Sha512};
use crate::Error;

static CONTEXT: OnceCell<Secp256k1<All>> = OnceCell::new();

fn context() -> Result<&'static Secp256k1<All>, Error> {
    CONTEXT.get_or_try_init(|| {
        let mut ctx = Secp256k1::new();
        let mut seed = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|_| Error::RandomizationFailed)?;
        ctx.seeded_randomize(&seed);
        Ok(ctx)
    })
}

/// The canonical-form test on a 64-byte compact signature (r ‖ s).
///
/// Both halves must have the most significant bit of their first byte
/// clear, and a zero first byte must be followed by a byte with the most
/// significant bit set.
pub(crate) fn is_canonical(sig: &[u8; 64]) -> bool {
    sig[0] & 0x80 == 0
        && !(sig[0] == 0 && sig[1] & 0x80 == 0)
        && sig[32] & 0x80 == 0
        && !(sig[32] == 0 && sig[33] & 0x80 == 0)
}

/// Recoverable ECDSA over a 32-byte digest, retried with an incrementing
/// nonce counter until the signature is canonical.
pub(crate) fn sign_canonical(digest: &Checksum256, seckey: &[u8; 32]) -> Result<([u8; 64], u8), Error> {
    let ctx = context()?;
    let msg = Message::from_digest(**digest);
    let sk = SecretKey::from_slice(seckey)?;

    let mut ndata = [0u8; 32];
    for counter in 0..=u8::MAX {
        ndata[0] = counter;
        let sig = ctx.sign_ecdsa_recoverable_with_noncedata(&msg, &sk, &ndata);
        let (recid, data) = sig.serialize_compact();
        if is_canonical(&data) {
            return Ok((data, recid.to_i32() as u8));
        }
    }
    Err(Error::CanonicalRetryExhausted)
}

pub(crate) fn recover(
    digest: &Checksum256,
    sig: &[u8; 64],
    recovery: u8,
) -> Result<[u8; 33], Error> {
    if recovery > 3 {
        return Err(Error::InvalidRecoveryId(recovery));
    }
    let ctx = context()?;
    let msg = Message::from_digest(**digest);
    let recid = RecoveryId::from_i32(recovery as i32)?;
    let recsig = RecoverableSignature::from_compact(sig, recid)?;
    Ok(ctx.recover_ecdsa(&msg, &recsig)?.serialize())
}

pub(crate) fn verify(digest: &Checksum256, sig: &[u8; 64], recovery: u8, pubkey: &[u8; 33]) -> bool {
    match recover(digest, sig, recovery) {
        Ok(recovered) => &recovered == pubkey,
        Err(_) => false,
    }
}

pub(crate) fn derive_public(seckey: &[u8; 32]) -> Result<[u8; 33], Error> {
    let ctx = context()?;
    let sk = SecretKey::from_slice(seckey)?;
    Ok(PublicKey::from_secret_key(ctx, &sk).serialize())
}

pub(crate) fn validate_secret(seckey: &[u8; 32]) -> bool {
    SecretKey::from_slice(seckey).is_ok()
}

/// ECDH shared secret: SHA-512 over the X coordinate of the shared point.
///
/// The Y coordinate is discarded before hashing, which makes the result
/// symmetric in (a·B) and (b·A) and matches the key derivation the chain
/// ecosystem uses for encrypted memos.
pub(crate) fn shared_secret(
    seckey: &[u8; 32],
    pubkey: &[u8; 33],
) -> Result<crate::hash::Checksum512, Error> {
    let sk = SecretKey::from_slice(seckey)?;
    let pk = PublicKey::from_slice(pubkey)?;
    let point = secp256k1::ecdh::shared_secret_point(&pk, &sk);
    Ok(Sha512::hash(&point[..32]))
}
