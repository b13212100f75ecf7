// Encryption utilities - AES-256-CBC envelope decryption for API payloads
// Wire format: "<ivHex>:<ciphertextHex>", key = SHA-256(shared secret)

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Derives the 32-byte AES key from the shared secret: a single SHA-256
/// pass over the UTF-8 bytes, no salt or iterations. The server performs
/// the identical derivation when encrypting.
pub fn derive_key(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}

/// Decrypts an `"<ivHex>:<ciphertextHex>"` payload and parses the
/// plaintext as JSON. Every failure mode (missing separator, bad hex,
/// wrong key, corrupt ciphertext, invalid UTF-8 or JSON) maps to
/// [`Error::Decrypt`]; the cause is logged, not shown to users.
pub fn decrypt(payload: &str, secret: &str) -> Result<serde_json::Value> {
    let (iv_hex, ciphertext_hex) = payload
        .split_once(':')
        .ok_or_else(|| decrypt_error("missing ':' separator in payload"))?;
    if iv_hex.is_empty() || ciphertext_hex.is_empty() {
        return Err(decrypt_error("empty iv or ciphertext in payload"));
    }

    let iv = decode_hex(iv_hex, "iv")?;
    let ciphertext = decode_hex(ciphertext_hex, "ciphertext")?;

    if iv.len() != IV_LEN {
        return Err(decrypt_error("iv is not 16 bytes"));
    }
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(decrypt_error("ciphertext is not a whole number of blocks"));
    }

    let key = derive_key(secret);
    let plaintext = Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| decrypt_error("cipher rejected key or iv length"))?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| decrypt_error("bad padding (wrong key or corrupt ciphertext)"))?;

    let text = String::from_utf8(plaintext)
        .map_err(|_| decrypt_error("plaintext is not valid UTF-8"))?;

    serde_json::from_str(&text)
        .map_err(|e| decrypt_error(&format!("plaintext is not valid JSON: {}", e)))
}

/// Inverse of [`decrypt`], kept for server parity and round-trip tests.
/// The caller supplies the IV; the production server picks a random one
/// per response.
pub fn encrypt(value: &serde_json::Value, secret: &str, iv: &[u8; IV_LEN]) -> String {
    let key = derive_key(secret);
    let plaintext = value.to_string();
    let ciphertext = Aes256CbcEnc::new(&key.into(), iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
}

fn decode_hex(part: &str, what: &str) -> Result<Vec<u8>> {
    hex::decode(part).map_err(|_| decrypt_error(&format!("{} is not valid hex", what)))
}

fn decrypt_error(reason: &str) -> Error {
    tracing::debug!("decryption failed: {}", reason);
    Error::Decrypt {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "unit-test-shared-secret";
    const IV: [u8; 16] = [7u8; 16];

    #[test]
    fn test_roundtrip_returns_original_json() {
        let value = json!({"success": true, "data": [{"_id": "a"}, {"_id": "b"}]});
        let payload = encrypt(&value, SECRET, &IV);
        let decrypted = decrypt(&payload, SECRET).unwrap();
        assert_eq!(decrypted, value);
    }

    #[test]
    fn test_missing_separator_is_decrypt_error() {
        let err = decrypt("deadbeef", SECRET).unwrap_err();
        assert!(matches!(err, Error::Decrypt { .. }));
    }

    #[test]
    fn test_odd_length_hex_is_decrypt_error() {
        let err = decrypt("abc:deadbeef", SECRET).unwrap_err();
        assert!(matches!(err, Error::Decrypt { .. }));
    }

    #[test]
    fn test_truncated_ciphertext_is_decrypt_error() {
        let payload = encrypt(&json!({"ok": true}), SECRET, &IV);
        let truncated = &payload[..payload.len() - 2];
        let err = decrypt(truncated, SECRET).unwrap_err();
        assert!(matches!(err, Error::Decrypt { .. }));
    }

    #[test]
    fn test_wrong_key_is_decrypt_error() {
        let payload = encrypt(&json!({"ok": true}), SECRET, &IV);
        let err = decrypt(&payload, "some-other-secret").unwrap_err();
        assert!(matches!(err, Error::Decrypt { .. }));
    }

    #[test]
    fn test_non_json_plaintext_is_decrypt_error() {
        let key = derive_key(SECRET);
        let ciphertext = Aes256CbcEnc::new(&key.into(), (&IV).into())
            .encrypt_padded_vec_mut::<Pkcs7>(b"not json at all");
        let payload = format!("{}:{}", hex::encode(IV), hex::encode(ciphertext));
        let err = decrypt(&payload, SECRET).unwrap_err();
        assert!(matches!(err, Error::Decrypt { .. }));
    }

    #[test]
    fn test_key_derivation_is_deterministic() {
        assert_eq!(derive_key(SECRET), derive_key(SECRET));
        assert_ne!(derive_key(SECRET), derive_key("other"));
    }
}
