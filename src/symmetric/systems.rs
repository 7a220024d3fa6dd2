//! 具体的对称加密系统以及按套件分发

pub mod aes_gcm;
#[cfg(feature = "chacha")]
pub mod xchacha;

use crate::kdf::DerivedKey;
use crate::symmetric::errors::SymmetricError;
use crate::symmetric::traits::{Sealed, SymmetricCipher};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

use self::aes_gcm::AesGcmSystem;
#[cfg(feature = "chacha")]
use self::xchacha::XChaChaSystem;

/// AEAD suite recorded in every encrypted blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CipherSuite {
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    #[serde(rename = "xchacha20-poly1305")]
    XChaCha20Poly1305,
}

impl CipherSuite {
    pub fn id(self) -> u8 {
        match self {
            CipherSuite::Aes256Gcm => 1,
            CipherSuite::XChaCha20Poly1305 => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(CipherSuite::Aes256Gcm),
            2 => Some(CipherSuite::XChaCha20Poly1305),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CipherSuite::Aes256Gcm => AesGcmSystem::NAME,
            CipherSuite::XChaCha20Poly1305 => "XChaCha20-Poly1305",
        }
    }

    pub fn nonce_size(self) -> usize {
        match self {
            CipherSuite::Aes256Gcm => AesGcmSystem::NONCE_SIZE,
            CipherSuite::XChaCha20Poly1305 => 24,
        }
    }

    pub fn tag_size(self) -> usize {
        16
    }

    pub fn seal(
        self,
        key: &DerivedKey,
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<Sealed, SymmetricError> {
        match self {
            CipherSuite::Aes256Gcm => AesGcmSystem::seal(key, plaintext, aad),
            #[cfg(feature = "chacha")]
            CipherSuite::XChaCha20Poly1305 => XChaChaSystem::seal(key, plaintext, aad),
            #[cfg(not(feature = "chacha"))]
            CipherSuite::XChaCha20Poly1305 => Err(SymmetricError::Unsupported(self.name())),
        }
    }

    pub fn open(
        self,
        key: &DerivedKey,
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, SymmetricError> {
        match self {
            CipherSuite::Aes256Gcm => AesGcmSystem::open(key, nonce, ciphertext, tag, aad),
            #[cfg(feature = "chacha")]
            CipherSuite::XChaCha20Poly1305 => {
                XChaChaSystem::open(key, nonce, ciphertext, tag, aad)
            }
            #[cfg(not(feature = "chacha"))]
            CipherSuite::XChaCha20Poly1305 => Err(SymmetricError::Unsupported(self.name())),
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes256gcm" | "aes-256-gcm" | "aes" => Ok(CipherSuite::Aes256Gcm),
            "xchacha20poly1305" | "xchacha20-poly1305" | "xchacha" => {
                Ok(CipherSuite::XChaCha20Poly1305)
            }
            _ => Err(()),
        }
    }
}
