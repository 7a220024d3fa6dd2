//! Binary layout of the vault file.
//!
//! ```text
//! magic "BNKV" | version u8 | suite u8 | kdf u8 | m_cost u32 | t_cost u32 | p_cost u32
//! | salt_len u8 | salt | nonce_len u8 | nonce | ct_len u32 | ciphertext | tag_len u8 | tag
//! ```
//!
//! Integers are little-endian. Everything before `nonce_len` is the header, which is
//! bound into the AEAD as associated data.

use crate::kdf::{KdfAlgorithm, KdfParams, MIN_SALT_SIZE};
use crate::symmetric::{CipherSuite, Sealed};
use thiserror::Error;

pub const MAGIC: &[u8; 4] = b"BNKV";
pub const FORMAT_VERSION: u8 = 1;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("not a vault file")]
    BadMagic,

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown cipher suite id {0}")]
    UnknownCipher(u8),

    #[error("unknown KDF id {0}")]
    UnknownKdf(u8),

    #[error("file is truncated")]
    Truncated,

    #[error("unexpected trailing bytes")]
    TrailingBytes,

    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    #[error("{0} is too long to encode")]
    TooLong(&'static str),
}

/// 磁盘上唯一的数据表示：盐、KDF 参数、nonce、密文与认证标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub suite: CipherSuite,
    pub kdf: KdfParams,
    pub salt: Vec<u8>,
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

impl EncryptedBlob {
    /// Serialized header used as AEAD associated data.
    pub fn header(
        suite: CipherSuite,
        kdf: &KdfParams,
        salt: &[u8],
    ) -> Result<Vec<u8>, FormatError> {
        let mut out = Vec::with_capacity(4 + 3 + 12 + 1 + salt.len());
        out.extend_from_slice(MAGIC);
        out.push(FORMAT_VERSION);
        out.push(suite.id());
        out.push(kdf.algorithm.id());
        out.extend_from_slice(&kdf.m_cost.to_le_bytes());
        out.extend_from_slice(&kdf.t_cost.to_le_bytes());
        out.extend_from_slice(&kdf.p_cost.to_le_bytes());
        out.push(len_u8(salt, "salt")?);
        out.extend_from_slice(salt);
        Ok(out)
    }

    pub fn from_sealed(suite: CipherSuite, kdf: KdfParams, salt: Vec<u8>, sealed: Sealed) -> Self {
        Self {
            suite,
            kdf,
            salt,
            nonce: sealed.nonce,
            ciphertext: sealed.ciphertext,
            tag: sealed.tag,
        }
    }

    pub fn aad(&self) -> Result<Vec<u8>, FormatError> {
        Self::header(self.suite, &self.kdf, &self.salt)
    }

    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        let ct_len =
            u32::try_from(self.ciphertext.len()).map_err(|_| FormatError::TooLong("ciphertext"))?;
        let mut out = self.aad()?;
        out.reserve(1 + self.nonce.len() + 4 + self.ciphertext.len() + 1 + self.tag.len());
        out.push(len_u8(&self.nonce, "nonce")?);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&ct_len.to_le_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.push(len_u8(&self.tag, "tag")?);
        out.extend_from_slice(&self.tag);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut reader = Reader::new(bytes);

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(FormatError::BadMagic);
        }
        let version = reader.u8()?;
        if version != FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let suite_id = reader.u8()?;
        let suite = CipherSuite::from_id(suite_id).ok_or(FormatError::UnknownCipher(suite_id))?;
        let kdf_id = reader.u8()?;
        let algorithm = KdfAlgorithm::from_id(kdf_id).ok_or(FormatError::UnknownKdf(kdf_id))?;
        let kdf = KdfParams {
            algorithm,
            m_cost: reader.u32()?,
            t_cost: reader.u32()?,
            p_cost: reader.u32()?,
        };
        if kdf.check().is_err() {
            return Err(FormatError::InvalidField("kdf parameters"));
        }

        let salt_len = reader.u8()? as usize;
        if salt_len < MIN_SALT_SIZE {
            return Err(FormatError::InvalidField("salt"));
        }
        let salt = reader.take(salt_len)?.to_vec();

        let nonce_len = reader.u8()? as usize;
        if nonce_len != suite.nonce_size() {
            return Err(FormatError::InvalidField("nonce"));
        }
        let nonce = reader.take(nonce_len)?.to_vec();

        let ct_len = reader.u32()? as usize;
        let ciphertext = reader.take(ct_len)?.to_vec();

        let tag_len = reader.u8()? as usize;
        if tag_len != suite.tag_size() {
            return Err(FormatError::InvalidField("tag"));
        }
        let tag = reader.take(tag_len)?.to_vec();

        if !reader.is_empty() {
            return Err(FormatError::TrailingBytes);
        }

        Ok(Self {
            suite,
            kdf,
            salt,
            nonce,
            ciphertext,
            tag,
        })
    }
}

fn len_u8(field: &[u8], name: &'static str) -> Result<u8, FormatError> {
    u8::try_from(field.len()).map_err(|_| FormatError::TooLong(name))
}

struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if self.bytes.len() < len {
            return Err(FormatError::Truncated);
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, FormatError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
