//! The storage module, defining how the vault is persisted.
// 中文: 存储模块，定义保险库如何持久化。

pub mod file_store;
pub mod format;
pub mod traits;

pub use self::file_store::FileVaultStore;
pub use self::format::{EncryptedBlob, FormatError};
pub use self::traits::{CancelFlag, StoreError, VaultStore};
