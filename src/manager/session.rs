use crate::common::errors::{Result, VaultError};
use crate::kdf::{DerivedKey, KdfParams};
use crate::storage::{EncryptedBlob, FormatError};
use crate::symmetric::CipherSuite;
use crate::vault::{EntryCollection, EntryIndex};

/// 解锁状态下持有的全部秘密材料
///
/// Dropping the session wipes the key (via `SecretBox`) and every entry (via
/// `ZeroizeOnDrop`). Locking is nothing more than dropping it.
pub(crate) struct Session {
    pub key: DerivedKey,
    pub salt: Vec<u8>,
    pub kdf: KdfParams,
    pub suite: CipherSuite,
    pub index: EntryIndex,
}

impl Session {
    /// Seals the current index under the session's key with a fresh nonce.
    pub fn seal(&self) -> Result<EncryptedBlob> {
        seal_index(&self.key, self.suite, self.kdf, &self.salt, &self.index)
    }
}

pub(crate) fn seal_index(
    key: &DerivedKey,
    suite: CipherSuite,
    kdf: KdfParams,
    salt: &[u8],
    index: &EntryIndex,
) -> Result<EncryptedBlob> {
    let plaintext = EntryCollection::from_index(index).to_plaintext()?;
    let aad = EncryptedBlob::header(suite, &kdf, salt).map_err(format_fault)?;
    let sealed = suite.seal(key, &plaintext, &aad)?;
    Ok(EncryptedBlob::from_sealed(suite, kdf, salt.to_vec(), sealed))
}

/// Authenticates and decrypts `blob`, then parses the entries.
///
/// A wrong key and a tampered blob both come back as `AuthenticationFailure`.
pub(crate) fn open_blob(key: &DerivedKey, blob: &EncryptedBlob) -> Result<EntryIndex> {
    let aad = blob.aad().map_err(format_fault)?;
    let plaintext = blob
        .suite
        .open(key, &blob.nonce, &blob.ciphertext, &blob.tag, &aad)?;
    // 认证通过但内容无法解析时是 Internal，而不是密码错误
    EntryCollection::parse_index(&plaintext)
}

fn format_fault(err: FormatError) -> VaultError {
    VaultError::Internal(format!("vault header: {err}"))
}
