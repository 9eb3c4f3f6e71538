//! TRON address derivation and Base58Check encoding.
//!
//! A TRON address is the last 20 bytes of the Keccak-256 hash of the
//! uncompressed public key (without its `0x04` tag), prefixed with
//! [`TRON_ADDRESS_PREFIX`] and encoded with a 4-byte double-SHA-256 checksum.

use secp256k1::PublicKey;
use sha2::{Digest, Sha256};
use sha3::Keccak256;

/// Network prefix byte for TRON mainnet addresses.
pub const TRON_ADDRESS_PREFIX: u8 = 0x41;

/// Length of a raw (prefixed, un-encoded) TRON address.
pub const TRON_ADDRESS_LEN: usize = 21;

const CHECKSUM_LEN: usize = 4;

/// Computes the raw 21-byte TRON address for a public key.
pub fn tron_address_bytes(public_key: &PublicKey) -> [u8; TRON_ADDRESS_LEN] {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = Keccak256::digest(&uncompressed[1..]);

    let mut raw = [0_u8; TRON_ADDRESS_LEN];
    raw[0] = TRON_ADDRESS_PREFIX;
    raw[1..].copy_from_slice(&hash[12..]);
    raw
}

/// Derives the Base58Check-encoded TRON address for a public key.
pub fn tron_address(public_key: &PublicKey) -> String {
    encode_base58check(&tron_address_bytes(public_key))
}

/// Encodes `payload` followed by the first four bytes of its double SHA-256.
pub fn encode_base58check(payload: &[u8]) -> String {
    let checksum = double_sha256(payload);
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    bs58::encode(buf).into_string()
}

/// Decodes a Base58Check TRON address back to its raw bytes.
///
/// Returns `None` if the string is not valid Base58, has the wrong length or
/// prefix, or fails the checksum.
pub fn decode_tron_address(address: &str) -> Option<[u8; TRON_ADDRESS_LEN]> {
    let decoded = bs58::decode(address).into_vec().ok()?;
    if decoded.len() != TRON_ADDRESS_LEN + CHECKSUM_LEN {
        return None;
    }

    let (payload, checksum) = decoded.split_at(TRON_ADDRESS_LEN);
    if payload[0] != TRON_ADDRESS_PREFIX || double_sha256(payload)[..CHECKSUM_LEN] != *checksum {
        return None;
    }

    let mut raw = [0_u8; TRON_ADDRESS_LEN];
    raw.copy_from_slice(payload);
    Some(raw)
}

fn double_sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}
