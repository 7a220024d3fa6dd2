//! XChaCha20-Poly1305 对称加密实现
//!
//! 192 位 nonce 使随机 nonce 的碰撞概率可以忽略不计。
use crate::common::utils::random_bytes;
use crate::kdf::DerivedKey;
use crate::symmetric::errors::SymmetricError;
use crate::symmetric::traits::{Sealed, SymmetricCipher};
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{Tag, XChaCha20Poly1305, XNonce};
use zeroize::Zeroizing;

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;

#[derive(Debug)]
pub struct XChaChaSystem;

impl XChaChaSystem {
    fn cipher(key: &DerivedKey) -> Result<XChaCha20Poly1305, SymmetricError> {
        let bytes = key.expose();
        XChaCha20Poly1305::new_from_slice(bytes).map_err(|_| SymmetricError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })
    }
}

impl SymmetricCipher for XChaChaSystem {
    const KEY_SIZE: usize = KEY_SIZE;
    const NONCE_SIZE: usize = NONCE_SIZE;
    const TAG_SIZE: usize = TAG_SIZE;
    const NAME: &'static str = "XChaCha20-Poly1305";

    fn seal(key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, SymmetricError> {
        let cipher = Self::cipher(key)?;
        let nonce = random_bytes(NONCE_SIZE)?;

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(XNonce::from_slice(&nonce), aad, &mut buffer)
            .map_err(|_| SymmetricError::Encryption)?;

        Ok(Sealed {
            nonce,
            ciphertext: buffer,
            tag: tag.to_vec(),
        })
    }

    fn open(
        key: &DerivedKey,
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, SymmetricError> {
        if nonce.len() != NONCE_SIZE || tag.len() != TAG_SIZE {
            return Err(SymmetricError::AuthenticationFailure);
        }
        let cipher = Self::cipher(key)?;

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        cipher
            .decrypt_in_place_detached(
                XNonce::from_slice(nonce),
                aad,
                &mut buffer[..],
                Tag::from_slice(tag),
            )
            .map_err(|_| SymmetricError::AuthenticationFailure)?;

        Ok(buffer)
    }
}
