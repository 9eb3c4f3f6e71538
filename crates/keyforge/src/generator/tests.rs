use crate::{
    Error, KeyGenerator, TRON_ADDRESS_LEN, TRON_ADDRESS_PREFIX, TronGenerator,
    decode_tron_address, encode_base58check,
};
use std::collections::HashSet;

fn secret_from_u8(last: u8) -> [u8; 32] {
    let mut bytes = [0_u8; 32];
    bytes[31] = last;
    bytes
}

#[test]
fn generated_address_is_well_formed_tron_address() {
    let item = TronGenerator::new().try_generate().unwrap();

    assert!(item.address().starts_with('T'), "address: {}", item.address());
    assert_eq!(item.address().len(), 34);

    let raw = decode_tron_address(item.address()).expect("valid base58check");
    assert_eq!(raw.len(), TRON_ADDRESS_LEN);
    assert_eq!(raw[0], TRON_ADDRESS_PREFIX);
}

#[test]
fn generated_secret_is_fixed_width_lowercase_hex() {
    let item = TronGenerator::new().try_generate().unwrap();

    assert_eq!(item.secret().len(), 64);
    assert!(
        item.secret()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    );
}

#[test]
fn secret_one_derives_known_address() {
    let item = TronGenerator::from_secret_bytes(&secret_from_u8(1)).unwrap();

    assert_eq!(item.secret(), format!("{:064x}", 1));
    assert_eq!(item.address(), "TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC");
}

#[test]
fn derivation_from_fixed_secret_is_deterministic() {
    let bytes = secret_from_u8(1);
    let a = TronGenerator::from_secret_bytes(&bytes).unwrap();
    let b = TronGenerator::from_secret_bytes(&bytes).unwrap();

    assert_eq!(a, b);
    assert_eq!(
        a.secret(),
        "0000000000000000000000000000000000000000000000000000000000000001"
    );
}

#[test]
fn distinct_secrets_derive_distinct_addresses() {
    let a = TronGenerator::from_secret_bytes(&secret_from_u8(1)).unwrap();
    let b = TronGenerator::from_secret_bytes(&secret_from_u8(2)).unwrap();

    assert_ne!(a.address(), b.address());
}

#[test]
fn zero_secret_is_rejected() {
    let err = TronGenerator::from_secret_bytes(&[0_u8; 32]).unwrap_err();
    assert!(matches!(err, Error::InvalidSecret(_)));
}

#[test]
fn secret_above_curve_order_is_rejected() {
    let err = TronGenerator::from_secret_bytes(&[0xff_u8; 32]).unwrap_err();
    assert!(matches!(err, Error::InvalidSecret(_)));
}

#[test]
fn repeated_generation_yields_unique_secrets() {
    let generator = TronGenerator::new();
    let secrets: HashSet<_> = (0..256)
        .map(|_| generator.try_generate().unwrap().into_parts().0)
        .collect();

    assert_eq!(secrets.len(), 256);
}

#[test]
fn generator_is_shareable_across_threads() {
    let generator = TronGenerator::new();
    let addresses: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| generator.try_generate().unwrap().address().to_owned()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let unique: HashSet<_> = addresses.iter().collect();
    assert_eq!(unique.len(), 4);
}

#[test]
fn tampered_checksum_fails_decoding() {
    let mut raw = [0_u8; TRON_ADDRESS_LEN];
    raw[0] = TRON_ADDRESS_PREFIX;
    let encoded = encode_base58check(&raw);
    assert!(decode_tron_address(&encoded).is_some());

    let mut decoded = bs58::decode(&encoded).into_vec().unwrap();
    let last = decoded.len() - 1;
    decoded[last] ^= 0x01;
    let tampered = bs58::encode(decoded).into_string();

    assert!(decode_tron_address(&tampered).is_none());
}

#[test]
fn wrong_prefix_fails_decoding() {
    let raw = [0_u8; TRON_ADDRESS_LEN];
    assert!(decode_tron_address(&encode_base58check(&raw)).is_none());
}

#[test]
fn debug_output_redacts_secret() {
    let item = TronGenerator::from_secret_bytes(&secret_from_u8(7)).unwrap();
    let rendered = format!("{item:?}");

    assert!(!rendered.contains(item.secret()));
    assert!(rendered.contains(item.address()));
}
