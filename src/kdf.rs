//! Master-password key derivation.
//!
//! A vault key is derived with Argon2id from the master password and a random,
//! non-secret salt. The cost parameters travel inside every encrypted blob so that
//! newer releases can raise them without locking users out of older vaults.

use crate::common::utils::{constant_time_eq, random_bytes};
use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroize;

/// Length of every derived key, in bytes.
pub const KEY_SIZE: usize = 32;

/// Length of freshly generated salts, in bytes.
pub const SALT_SIZE: usize = 16;

/// Shortest salt accepted when opening an existing blob.
pub const MIN_SALT_SIZE: usize = 8;

// Upper bounds on stored costs. A crafted vault file must not be able to make
// `unlock` allocate unbounded memory or spin forever.
const MAX_MEMORY_KIB: u32 = 2 * 1024 * 1024;
const MAX_ITERATIONS: u32 = 64;
const MAX_PARALLELISM: u32 = 16;

#[derive(Error, Debug)]
pub enum KdfError {
    #[error("invalid KDF parameters: {0}")]
    InvalidParams(String),

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("random source unavailable: {0}")]
    Rng(#[from] rand_core::OsError),
}

/// 密钥派生算法标识（写入密文块头部）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KdfAlgorithm {
    Argon2id = 1,
}

impl KdfAlgorithm {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(KdfAlgorithm::Argon2id),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

/// 密钥派生参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub algorithm: KdfAlgorithm,
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Number of passes.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl KdfParams {
    pub fn argon2id(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            algorithm: KdfAlgorithm::Argon2id,
            m_cost,
            t_cost,
            p_cost,
        }
    }

    /// Checks the costs against what Argon2 accepts and against the upper bounds
    /// this crate is willing to spend on a single unlock.
    pub fn check(&self) -> Result<(), KdfError> {
        if self.m_cost > MAX_MEMORY_KIB
            || self.t_cost > MAX_ITERATIONS
            || self.p_cost > MAX_PARALLELISM
        {
            return Err(KdfError::InvalidParams(format!(
                "costs m={} t={} p={} exceed the supported maximum",
                self.m_cost, self.t_cost, self.p_cost
            )));
        }
        self.argon2_params().map(|_| ())
    }

    fn argon2_params(&self) -> Result<Params, KdfError> {
        Params::new(self.m_cost, self.t_cost, self.p_cost, Some(KEY_SIZE))
            .map_err(|e| KdfError::InvalidParams(e.to_string()))
    }
}

/// A 256-bit key derived from the master password.
///
/// The key material lives in a `SecretBox` and is zeroed when the value is dropped.
pub struct DerivedKey(SecretBox<[u8; KEY_SIZE]>);

impl DerivedKey {
    pub(crate) fn expose(&self) -> &[u8; KEY_SIZE] {
        self.0.expose_secret()
    }

    /// Constant-time comparison against another derived key.
    pub fn matches(&self, other: &DerivedKey) -> bool {
        constant_time_eq(self.expose(), other.expose())
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// 生成新的随机盐
pub fn generate_salt() -> Result<Vec<u8>, KdfError> {
    Ok(random_bytes(SALT_SIZE)?)
}

/// Derives the vault key from `password` and `salt`.
///
/// Deterministic: identical inputs always produce the same key.
pub fn derive(
    password: &SecretString,
    salt: &[u8],
    params: &KdfParams,
) -> Result<DerivedKey, KdfError> {
    if salt.len() < MIN_SALT_SIZE {
        return Err(KdfError::InvalidParams(format!(
            "salt of {} bytes is too short",
            salt.len()
        )));
    }
    params.check()?;

    let argon2 = match params.algorithm {
        KdfAlgorithm::Argon2id => {
            Argon2::new(Algorithm::Argon2id, Version::V0x13, params.argon2_params()?)
        }
    };

    let mut output = Box::new([0u8; KEY_SIZE]);
    if let Err(e) =
        argon2.hash_password_into(password.expose_secret().as_bytes(), salt, &mut output[..])
    {
        output.zeroize();
        return Err(KdfError::Derivation(e.to_string()));
    }

    Ok(DerivedKey(SecretBox::new(output)))
}
