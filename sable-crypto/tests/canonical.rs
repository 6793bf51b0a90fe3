use proptest::prelude::*;
use sable_crypto::base58;
use sable_crypto::key::{PrivateKey, PublicKey, Signature};

fn test_key() -> PrivateKey {
    "5KQvfsPJ9YvGuVbLRLXVWPNubed6FWvV8yax6cNSJEzB4co3zFu"
        .parse()
        .unwrap()
}

proptest! {
    // signing is the slow part, keep the case count modest
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn every_signature_is_canonical_and_recovers(message: Vec<u8>) {
        let key = test_key();
        let public = key.to_public().unwrap();

        let signature = key.sign(&message).unwrap();
        prop_assert!(signature.is_canonical());
        prop_assert_eq!(signature.recover(&message).unwrap(), public.clone());
        prop_assert!(signature.verify(&message, &public));
    }
}

proptest! {
    #[test]
    fn base58_check_round_trips(payload in proptest::collection::vec(any::<u8>(), 1..64)) {
        let ripemd = base58::encode_ripemd_check(&payload, "K1");
        prop_assert_eq!(base58::decode_ripemd_check(&ripemd, "K1").unwrap(), payload.clone());

        let sha = base58::encode_sha256_check(&payload);
        prop_assert_eq!(base58::decode_sha256_check(&sha).unwrap(), payload);
    }

    #[test]
    fn key_strings_round_trip(data: [u8; 33]) {
        let key = PublicKey::Unknown { curve: "R1".to_string(), data: data.to_vec() };
        let back: PublicKey = key.to_string().parse().unwrap();
        prop_assert_eq!(back, key);
    }

    #[test]
    fn signature_strings_round_trip(data: [u8; 64], recovery in 0u8..=3) {
        let sig = Signature::K1 { data, recovery };
        let back: Signature = sig.to_string().parse().unwrap();
        prop_assert_eq!(back, sig);
    }
}
