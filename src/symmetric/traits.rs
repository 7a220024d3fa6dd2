use crate::kdf::DerivedKey;
use crate::symmetric::errors::SymmetricError;
use zeroize::Zeroizing;

/// 一次加密的输出：随机 nonce、密文和认证标签（均非秘密）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// 对称认证加密（AEAD）系统的公共特征
pub trait SymmetricCipher {
    /// 密钥的期望长度（以字节为单位）。
    const KEY_SIZE: usize;
    /// nonce 长度。
    const NONCE_SIZE: usize;
    /// 认证标签长度。
    const TAG_SIZE: usize;
    /// 写入密文块头部的名称。
    const NAME: &'static str;

    /// Encrypts `plaintext` under a freshly generated random nonce.
    ///
    /// `aad` is authenticated but not encrypted.
    fn seal(key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, SymmetricError>;

    /// Decrypts and verifies.
    ///
    /// Any mismatch (key, nonce, ciphertext, tag or `aad`) yields
    /// `SymmetricError::AuthenticationFailure` and no plaintext.
    fn open(
        key: &DerivedKey,
        nonce: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, SymmetricError>;
}
