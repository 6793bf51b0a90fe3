use pretty_assertions::assert_eq;
use sable_abi::{sort_json_keys, Abi, Error};
use serde_json::json;

const TOKEN_ABI: &str = r#"{
    "version": "eosio::abi/1.1",
    "structs": [
        {
            "name": "transfer",
            "base": "",
            "fields": [
                {"name": "from", "type": "name"},
                {"name": "to", "type": "name"},
                {"name": "quantity", "type": "asset"},
                {"name": "memo", "type": "string"}
            ]
        }
    ],
    "actions": [
        {"name": "transfer", "type": "transfer", "ricardian_contract": ""}
    ]
}"#;

const TRANSFER_HEX: &str =
    "000000000000285d000000000000ae3910270000000000000442415a0000000003717578";

fn token_abi() -> Abi {
    Abi::from_json(TOKEN_ABI).unwrap()
}

#[test]
fn transfer_encodes_to_the_canonical_bytes() {
    let abi = token_abi();
    let value = json!({
        "from": "foo",
        "to": "bar",
        "quantity": "1.0000 BAZ",
        "memo": "qux"
    });
    let bytes = abi.encode_value("transfer", &value).unwrap();
    assert_eq!(hex::encode(&bytes), TRANSFER_HEX);
}

#[test]
fn transfer_decodes_to_the_canonical_json() {
    let abi = token_abi();
    let value = abi
        .decode_value("transfer", &hex::decode(TRANSFER_HEX).unwrap())
        .unwrap();
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"from":"foo","to":"bar","quantity":"1.0000 BAZ","memo":"qux"}"#
    );
}

#[test]
fn binary_and_json_round_trip() {
    let abi = token_abi();
    let value = json!({
        "from": "alice",
        "to": "bob",
        "quantity": "0.001 TOK",
        "memo": ""
    });
    let bytes = abi.encode_value("transfer", &value).unwrap();
    let back = abi.decode_value("transfer", &bytes).unwrap();
    assert_eq!(sort_json_keys(&back), sort_json_keys(&value));
}

#[test]
fn action_type_lookup() {
    let abi = token_abi();
    assert_eq!(
        abi.action_type(sable_primitives::Name::new("transfer")),
        Some("transfer")
    );
    assert_eq!(abi.action_type(sable_primitives::Name::new("issue")), None);
}

#[test]
fn arrays_and_optionals() {
    let abi = Abi::from_json(
        r#"{
            "structs": [{
                "name": "holder",
                "base": "",
                "fields": [
                    {"name": "ids", "type": "uint64[]"},
                    {"name": "note", "type": "string?"}
                ]
            }]
        }"#,
    )
    .unwrap();

    let present = json!({"ids": [1, 2, 3], "note": "hi"});
    let bytes = abi.encode_value("holder", &present).unwrap();
    assert_eq!(hex::encode(&bytes), concat!(
        "03",               // three elements
        "010000000000000002000000000000000300000000000000",
        "01",               // note present
        "026869",
    ));
    assert_eq!(
        abi.decode_value("holder", &bytes).unwrap(),
        json!({"ids": [1, 2, 3], "note": "hi"})
    );

    let absent = json!({"ids": [], "note": null});
    let bytes = abi.encode_value("holder", &absent).unwrap();
    assert_eq!(hex::encode(&bytes), "0000");
    assert_eq!(
        abi.decode_value("holder", &bytes).unwrap(),
        json!({"ids": [], "note": null})
    );
}

#[test]
fn binary_extension_fields() {
    let abi = Abi::from_json(
        r#"{
            "structs": [{
                "name": "entry",
                "base": "",
                "fields": [
                    {"name": "id", "type": "uint8"},
                    {"name": "tag", "type": "string$"}
                ]
            }]
        }"#,
    )
    .unwrap();

    // absent trailing extension writes nothing
    let bytes = abi.encode_value("entry", &json!({"id": 7})).unwrap();
    assert_eq!(hex::encode(&bytes), "07");

    // and the stream ending decodes it back to null
    assert_eq!(
        abi.decode_value("entry", &[0x07]).unwrap(),
        json!({"id": 7, "tag": null})
    );

    // present extension encodes normally
    let bytes = abi.encode_value("entry", &json!({"id": 7, "tag": "x"})).unwrap();
    assert_eq!(hex::encode(&bytes), "070178");
    assert_eq!(
        abi.decode_value("entry", &bytes).unwrap(),
        json!({"id": 7, "tag": "x"})
    );
}

#[test]
fn variants_use_a_name_value_pair() {
    let abi = Abi::from_json(
        r#"{
            "variants": [
                {"name": "id", "types": ["uint64", "name"]}
            ]
        }"#,
    )
    .unwrap();

    let as_name = json!(["name", "foo"]);
    let bytes = abi.encode_value("id", &as_name).unwrap();
    assert_eq!(hex::encode(&bytes), "01000000000000285d");
    assert_eq!(abi.decode_value("id", &bytes).unwrap(), as_name);

    let as_number = json!(["uint64", 7]);
    let bytes = abi.encode_value("id", &as_number).unwrap();
    assert_eq!(hex::encode(&bytes), "000700000000000000");

    assert!(matches!(
        abi.encode_value("id", &json!(["string", "nope"])),
        Err(Error::UnknownVariant(_))
    ));
    assert!(matches!(
        abi.decode_value("id", &[0x05, 0x00]),
        Err(Error::UnknownVariant(_))
    ));
}

#[test]
fn unknown_type_fails_cleanly() {
    let abi = token_abi();
    assert!(matches!(
        abi.encode_value("mystery", &json!({})),
        Err(Error::TypeNotEncodable(_))
    ));
    assert!(matches!(
        abi.decode_value("mystery", &[0x00]),
        Err(Error::UnknownType(_))
    ));
}

#[test]
fn lenient_builtin_coercions() {
    let abi = Abi::from_json(
        r#"{
            "structs": [{
                "name": "quirks",
                "base": "",
                "fields": [
                    {"name": "flag", "type": "bool"},
                    {"name": "ratio", "type": "float64"},
                    {"name": "big", "type": "uint64"}
                ]
            }]
        }"#,
    )
    .unwrap();

    // bool from a number, float from a string, uint64 from either form
    let value = json!({"flag": 1, "ratio": "0.5", "big": "4294967296"});
    let bytes = abi.encode_value("quirks", &value).unwrap();
    let back = abi.decode_value("quirks", &bytes).unwrap();
    assert_eq!(
        back,
        json!({"flag": true, "ratio": "0.5", "big": "4294967296"})
    );

    let value = json!({"flag": true, "ratio": 0.5, "big": 12});
    let back = abi
        .decode_value("quirks", &abi.encode_value("quirks", &value).unwrap())
        .unwrap();
    assert_eq!(back, json!({"flag": true, "ratio": "0.5", "big": 12}));
}

#[test]
fn mismatches_carry_a_path() {
    let abi = token_abi();
    let err = abi
        .encode_value("transfer", &json!({"from": "foo", "to": 7}))
        .unwrap_err();
    let Error::InvalidValue { path, .. } = err else {
        panic!("expected InvalidValue, got {err:?}");
    };
    assert_eq!(path, "transfer.to");
}

#[test]
fn keys_and_checksums_coerce_from_strings() {
    let abi = Abi::from_json(
        r#"{
            "structs": [{
                "name": "proof",
                "base": "",
                "fields": [
                    {"name": "key", "type": "public_key"},
                    {"name": "digest", "type": "checksum256"}
                ]
            }]
        }"#,
    )
    .unwrap();

    let value = json!({
        "key": "EOS6RrvujLQN1x5Tacbep1KAk8zzKpSThAQXBCKYFfGUYeABhJRin",
        "digest": "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906"
    });
    let bytes = abi.encode_value("proof", &value).unwrap();
    assert_eq!(bytes.len(), 1 + 33 + 32);
    let back = abi.decode_value("proof", &bytes).unwrap();
    // the canonical output form is the modern key string
    assert_eq!(
        back["key"],
        "PUB_K1_6RrvujLQN1x5Tacbep1KAk8zzKpSThAQXBCKYFfGUYeACcSRFs"
    );
    assert_eq!(back["digest"], value["digest"]);
}

#[test]
fn abi_def_survives_its_own_binary_form() {
    let abi = token_abi();
    let bytes = abi.to_bin();
    let back = Abi::from_bin(&bytes).unwrap();
    assert_eq!(back, abi);
}
