//! AES-256 handling for pak indexes and entry payloads.
//!
//! Pak archives encrypt the index (and optionally entry payloads) with
//! AES-256 in ECB mode over 16-byte blocks; encrypted regions are padded
//! to a block boundary. Keys are distributed as hex strings.

use aes::Aes256;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, KeyInit};

use crate::error::{Result, WickError};

pub const KEY_LEN: usize = 32;
pub const BLOCK_LEN: usize = 16;

/// Parse a hex key string (optionally `0x`-prefixed) into an AES-256 key.
pub fn parse_key(key: &str) -> Result<[u8; KEY_LEN]> {
    let hex_str = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key);

    let bytes = hex::decode(hex_str).map_err(|e| WickError::InvalidKey {
        reason: format!("not valid hex: {}", e),
    })?;

    <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| WickError::InvalidKey {
        reason: format!("expected {} bytes, got {}", KEY_LEN, bytes.len()),
    })
}

/// Decrypt a block-aligned buffer in place.
pub fn decrypt_in_place(data: &mut [u8], key: &[u8; KEY_LEN]) -> Result<()> {
    if data.len() % BLOCK_LEN != 0 {
        return Err(WickError::InvalidPak {
            reason: format!("encrypted region of {} bytes is not block-aligned", data.len()),
        });
    }

    let cipher = Aes256::new(GenericArray::from_slice(key));
    for block in data.chunks_exact_mut(BLOCK_LEN) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }

    Ok(())
}

/// Round a length up to the AES block size.
pub fn align_to_block(len: u64) -> u64 {
    len.div_ceil(BLOCK_LEN as u64) * BLOCK_LEN as u64
}

#[cfg(test)]
pub(crate) fn encrypt_in_place(data: &mut [u8], key: &[u8; KEY_LEN]) {
    use cipher::BlockEncrypt;

    assert_eq!(data.len() % BLOCK_LEN, 0);
    let cipher = Aes256::new(GenericArray::from_slice(key));
    for block in data.chunks_exact_mut(BLOCK_LEN) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_parse_key_plain() {
        let key = parse_key(KEY_HEX).unwrap();
        assert_eq!(key[0], 0x00);
        assert_eq!(key[31], 0x1F);
    }

    #[test]
    fn test_parse_key_prefixed_and_case() {
        let upper = KEY_HEX.to_uppercase();
        assert_eq!(parse_key(&format!("0x{}", KEY_HEX)).unwrap(), parse_key(&upper).unwrap());
        assert!(parse_key(&format!("0X{}", upper)).is_ok());
    }

    #[test]
    fn test_parse_key_wrong_length() {
        let err = parse_key("0011223344").unwrap_err();
        assert!(matches!(err, WickError::InvalidKey { .. }));
    }

    #[test]
    fn test_parse_key_not_hex() {
        let err = parse_key("zz0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1eff").unwrap_err();
        assert!(matches!(err, WickError::InvalidKey { .. }));
    }

    #[test]
    fn test_decrypt_round_trip() {
        let key = parse_key(KEY_HEX).unwrap();
        let plain = b"sixteen byte msg".repeat(4);

        let mut data = plain.clone();
        encrypt_in_place(&mut data, &key);
        assert_ne!(data, plain);

        decrypt_in_place(&mut data, &key).unwrap();
        assert_eq!(data, plain);
    }

    #[test]
    fn test_decrypt_unaligned_rejected() {
        let key = parse_key(KEY_HEX).unwrap();
        let mut data = vec![0u8; 17];
        assert!(decrypt_in_place(&mut data, &key).is_err());
    }

    #[test]
    fn test_align_to_block() {
        assert_eq!(align_to_block(0), 0);
        assert_eq!(align_to_block(1), 16);
        assert_eq!(align_to_block(16), 16);
        assert_eq!(align_to_block(17), 32);
    }
}
