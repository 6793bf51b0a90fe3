use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use sable_abi::Abi;
use sable_esr::{
    ChainAlias, ChainId, Error, Identity, Request, RequestFlags, SigningRequest, Tapos,
    PLACEHOLDER_ACTOR, PLACEHOLDER_PERMISSION,
};
use sable_primitives::{Action, Name, PermissionLevel, Transfer};

/// The well-known "Thanks for the fish" transfer request.
const COMPRESSED_URI: &str = "esr://gmNgZGBY1mTC_MoglIGBIVzX5uxZRqAQGMBoExgDAjRi4fwAVz93ICUckpGYl12skJZfpFCSkaqQllmcwczAAAA";

/// The same request without compression.
const UNCOMPRESSED_URI: &str = "esr://AgABAACmgjQD6jBVAAAAVy08zc0BAQAAAAAAAAABAAAAAAAAADQBAAAAAAAAAAAAAAAAAChdAQAAAAAAAAAAUEVORwAAABNUaGFua3MgZm9yIHRoZSBmaXNoAwAA";

fn token_abi() -> Abi {
    Abi::from_json(
        r#"{
            "structs": [{
                "name": "transfer",
                "base": "",
                "fields": [
                    {"name": "from", "type": "name"},
                    {"name": "to", "type": "name"},
                    {"name": "quantity", "type": "asset"},
                    {"name": "memo", "type": "string"}
                ]
            }],
            "actions": [{"name": "transfer", "type": "transfer", "ricardian_contract": ""}]
        }"#,
    )
    .unwrap()
}

fn abi_map() -> BTreeMap<Name, Abi> {
    let mut abis = BTreeMap::new();
    abis.insert(Name::new("eosio.token"), token_abi());
    abis
}

#[test]
fn decodes_the_compressed_fixture() {
    let request = SigningRequest::decode(COMPRESSED_URI).unwrap();

    assert_eq!(request.chain_id.alias(), Some(ChainAlias::Eos));
    assert_eq!(
        request.chain_id.chain_id().unwrap().to_string(),
        "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906"
    );

    let Request::Action(ref action) = request.request else {
        panic!("expected a single action, got {:?}", request.request);
    };
    assert_eq!(action.account, Name::new("eosio.token"));
    assert_eq!(action.name, Name::new("transfer"));
    assert_eq!(
        action.authorization,
        vec![PermissionLevel::new(PLACEHOLDER_ACTOR, PLACEHOLDER_PERMISSION)]
    );

    let transfer: Transfer = action.data_as().unwrap();
    assert_eq!(transfer.from, PLACEHOLDER_ACTOR);
    assert_eq!(transfer.to, Name::new("foo"));
    assert_eq!(transfer.quantity.to_string(), "1 PENG");
    assert_eq!(transfer.memo, "Thanks for the fish");

    assert!(request.flags.broadcast());
    assert!(request.flags.background());
    assert_eq!(request.callback, "");
    assert!(request.info.is_empty());
    assert!(request.signature.is_none());
}

#[test]
fn uncompressed_form_matches_the_fixture() {
    let request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    assert_eq!(request.to_uri(false, true), UNCOMPRESSED_URI);
    assert!(request
        .to_uri(false, true)
        .starts_with("esr://AgABAACmgjQD6jBVAAAAVy08zc0B"));
}

#[test]
fn both_fixture_forms_decode_identically() {
    let a = SigningRequest::decode(COMPRESSED_URI).unwrap();
    let b = SigningRequest::decode(UNCOMPRESSED_URI).unwrap();
    assert_eq!(a, b);
}

#[test]
fn encode_decode_round_trip() {
    let request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    let uri = request.encode();
    assert!(uri.starts_with("esr://"));
    let back = SigningRequest::decode(&uri).unwrap();
    assert_eq!(back, request);

    // the scheme also works without the slashes
    let bare = request.to_uri(true, false);
    assert!(bare.starts_with("esr:") && !bare.starts_with("esr://"));
    assert_eq!(SigningRequest::decode(&bare).unwrap(), request);
}

#[test]
fn resolution_substitutes_the_signer() {
    let request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    let signer = PermissionLevel::new("sable", "active");
    let tapos = Tapos {
        ref_block_num: 1234,
        ref_block_prefix: 56789,
        expiration: Some("2018-06-15T19:17:47".parse().unwrap()),
    };

    let resolved = request.resolve(signer, &abi_map(), Some(&tapos)).unwrap();
    assert_eq!(resolved.transaction.ref_block_num, 1234);
    assert_eq!(resolved.transaction.ref_block_prefix, 56789);
    assert_eq!(
        resolved.transaction.expiration.to_string(),
        "2018-06-15T19:17:47"
    );

    let action = &resolved.transaction.actions[0];
    assert_eq!(action.authorization, vec![signer]);
    let transfer: Transfer = action.data_as().unwrap();
    assert_eq!(transfer.from, Name::new("sable"));
    assert_eq!(transfer.to, Name::new("foo"));
}

#[test]
fn resolution_is_idempotent() {
    let request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    let signer = PermissionLevel::new("sable", "active");
    let tapos = Tapos {
        ref_block_num: 1,
        ref_block_prefix: 2,
        expiration: Some("2020-01-01T00:00:00".parse().unwrap()),
    };

    let once = request.resolve(signer, &abi_map(), Some(&tapos)).unwrap();
    let twice = request.resolve(signer, &abi_map(), Some(&tapos)).unwrap();
    assert_eq!(once.transaction, twice.transaction);
}

#[test]
fn resolution_demands_a_tapos_source() {
    let request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    let signer = PermissionLevel::new("sable", "active");
    assert!(matches!(
        request.resolve(signer, &abi_map(), None),
        Err(Error::MissingTapos)
    ));
}

#[test]
fn resolution_demands_the_abi() {
    let request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    let signer = PermissionLevel::new("sable", "active");
    assert!(matches!(
        request.resolve(signer, &BTreeMap::new(), Some(&Tapos::default())),
        Err(Error::MissingAbi(account)) if account == Name::new("eosio.token")
    ));
}

#[test]
fn identity_requests_skip_tapos() {
    let request = SigningRequest::new(
        ChainId::Alias(ChainAlias::Eos),
        Request::Identity(Identity {
            account: PLACEHOLDER_ACTOR,
            request_key: None,
            scope: None,
        }),
    );
    let signer = PermissionLevel::new("sable", "active");

    let resolved = request.resolve(signer, &BTreeMap::new(), None).unwrap();
    assert!(resolved.transaction.header_is_empty());
    let action = &resolved.transaction.actions[0];
    assert_eq!(action.name, Name::new("identity"));
    assert_eq!(action.authorization, vec![signer]);
}

#[test]
fn scoped_identity_upgrades_to_version_3() {
    let mut request = SigningRequest::new(
        ChainId::Alias(ChainAlias::Eos),
        Request::Identity(Identity {
            account: PLACEHOLDER_ACTOR,
            request_key: None,
            scope: Some(Name::new("myapp")),
        }),
    );
    request.flags = RequestFlags::default();
    assert_eq!(request.version(), 3);

    let uri = request.to_uri(false, true);
    // version 3 header byte
    assert!(uri.starts_with("esr://Aw"));

    let back = SigningRequest::decode(&uri).unwrap();
    assert_eq!(back, request);
    let Request::Identity(identity) = back.request else {
        panic!("expected identity");
    };
    assert_eq!(identity.scope, Some(Name::new("myapp")));
}

#[test]
fn callback_templating_and_background_payload() {
    let mut request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    request.callback = "https://example.com/cb?tx={{tx}}&by={{sa}}@{{sp}}&bn={{bn}}".into();
    request.flags = RequestFlags::new(RequestFlags::BACKGROUND);

    let signer = PermissionLevel::new("sable", "active");
    let tapos = Tapos {
        ref_block_num: 1234,
        ref_block_prefix: 56789,
        expiration: Some("2018-06-15T19:17:47".parse().unwrap()),
    };
    let resolved = request.resolve(signer, &abi_map(), Some(&tapos)).unwrap();

    let key: sable_crypto::key::PrivateKey =
        "5KQvfsPJ9YvGuVbLRLXVWPNubed6FWvV8yax6cNSJEzB4co3zFu".parse().unwrap();
    let chain_id = request.chain_id.chain_id().unwrap();
    let signature = key.sign_digest(&resolved.signing_digest(&chain_id)).unwrap();

    let callback = resolved.callback(&[signature.clone()], None).unwrap();
    assert!(callback.background);
    let expected_id = resolved.transaction_id().to_string();
    assert_eq!(
        callback.url,
        format!("https://example.com/cb?tx={expected_id}&by=sable@active&bn=")
    );
    assert_eq!(callback.payload.rbn, "1234");
    assert_eq!(callback.payload.rid, "56789");
    assert!(callback.payload.req.starts_with("esr:"));
    assert!(!callback.payload.req.starts_with("esr://"));

    let json = callback.payload.to_json(&serde_json::Map::new()).unwrap();
    assert_eq!(json["sig"], signature.to_string());
    assert_eq!(json["tx"], expected_id);
    assert!(json.get("bn").is_none());

    // no signatures, no callback
    assert!(resolved.callback(&[], None).is_none());
}

#[test]
fn request_signatures_round_trip_and_recover() {
    let mut request = SigningRequest::decode(COMPRESSED_URI).unwrap();
    let key: sable_crypto::key::PrivateKey =
        "5KQvfsPJ9YvGuVbLRLXVWPNubed6FWvV8yax6cNSJEzB4co3zFu".parse().unwrap();

    request.sign(Name::new("sable"), &key).unwrap();
    let uri = request.encode();

    let back = SigningRequest::decode(&uri).unwrap();
    let block = back.signature.as_ref().unwrap();
    assert_eq!(block.signer, Name::new("sable"));
    assert_eq!(
        block
            .signature
            .recover_digest(&back.signing_digest())
            .unwrap(),
        key.to_public().unwrap()
    );
}

#[test]
fn oversized_payloads_are_rejected() {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use std::io::Write;

    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(&vec![0u8; 6 * 1024 * 1024]).unwrap();
    let bomb = encoder.finish().unwrap();

    let mut payload = vec![0x82];
    payload.extend_from_slice(&bomb);
    let uri = format!("esr://{}", URL_SAFE_NO_PAD.encode(payload));

    assert!(matches!(
        SigningRequest::decode(&uri),
        Err(Error::PayloadTooLarge)
    ));
}

#[test]
fn rejects_foreign_versions_and_schemes() {
    assert!(matches!(
        SigningRequest::decode("esr://BQAB"),
        Err(Error::UnsupportedVersion(5))
    ));
    assert!(matches!(
        SigningRequest::decode("https://example.com"),
        Err(Error::InvalidUri(_))
    ));
    assert!(matches!(
        SigningRequest::decode("esr://"),
        Err(Error::InvalidUri(_))
    ));
}
