//! AES-256-GCM 对称加密实现
use crate::common::utils::random_bytes;
use crate::kdf::DerivedKey;
use crate::symmetric::errors::SymmetricError;
use crate::symmetric::traits::{Sealed, SymmetricCipher};
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::Zeroizing;

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16; // AES-GCM's tag is 16 bytes

/// AES-GCM 对称加密系统
#[derive(Debug)]
pub struct AesGcmSystem;

impl AesGcmSystem {
    fn cipher(key: &DerivedKey) -> Result<Aes256Gcm, SymmetricError> {
        let bytes = key.expose();
        Aes256Gcm::new_from_slice(bytes).map_err(|_| SymmetricError::InvalidKeySize {
            expected: KEY_SIZE,
            actual: bytes.len(),
        })
    }
}

impl SymmetricCipher for AesGcmSystem {
    const KEY_SIZE: usize = KEY_SIZE;
    const NONCE_SIZE: usize = NONCE_SIZE;
    const TAG_SIZE: usize = TAG_SIZE;
    const NAME: &'static str = "AES-256-GCM";

    fn seal(key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, SymmetricError> {
        let cipher = Self::cipher(key)?;
        let nonce = random_bytes(NONCE_SIZE)?;

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), aad, &mut buffer)
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
        // 长度不符与认证失败同样处理，不泄露更多信息
        if nonce.len() != NONCE_SIZE || tag.len() != TAG_SIZE {
            return Err(SymmetricError::AuthenticationFailure);
        }
        let cipher = Self::cipher(key)?;

        let mut buffer = Zeroizing::new(ciphertext.to_vec());
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(nonce),
                aad,
                &mut buffer[..],
                Tag::from_slice(tag),
            )
            .map_err(|_| SymmetricError::AuthenticationFailure)?;

        Ok(buffer)
    }
}
