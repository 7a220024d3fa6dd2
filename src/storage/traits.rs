//! Traits for abstracting storage operations.
// 中文: 用于抽象存储操作的 Trait。

use super::format::{EncryptedBlob, FormatError};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored bytes are not a well-formed blob.
    #[error("vault file is malformed: {0}")]
    Corrupt(#[from] FormatError),

    /// The medium holding the vault is missing, unmounted or was pulled.
    #[error("storage device unavailable: {}", .0.display())]
    DeviceUnavailable(PathBuf),

    #[error("I/O error")]
    Io(#[source] std::io::Error),

    /// The caller gave up on the write before it was committed.
    #[error("write cancelled before commit")]
    Cancelled,
}

const PENDING: u8 = 0;
const COMMITTING: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared handshake deciding whether an in-flight write may commit.
///
/// The store claims the commit with [`CancelFlag::try_commit`] immediately before its
/// atomic commit step; the caller abandons the write with [`CancelFlag::cancel`]. Exactly
/// one of the two wins. A cancelled write never lands, and a caller whose cancel lost
/// knows the store is committing and must wait for the real outcome.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicU8>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandons the write. Returns `false` if the store already claimed the commit.
    pub fn cancel(&self) -> bool {
        match self
            .0
            .compare_exchange(PENDING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            Err(state) => state == CANCELLED,
        }
    }

    /// Claims the commit. Returns `false` if the caller already cancelled.
    pub fn try_commit(&self) -> bool {
        match self
            .0
            .compare_exchange(PENDING, COMMITTING, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => true,
            Err(state) => state == COMMITTING,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst) == CANCELLED
    }
}

/// Defines the universal interface for vault persistence behavior.
///
/// Implementations hold exactly one `EncryptedBlob`, or nothing at all (first run).
/// Calls may block on slow removable media; callers are expected to run them off the
/// async executor and bound them with a timeout.
///
/// 中文: 定义了保险库持久化行为的通用接口。
pub trait VaultStore: Send + Sync + 'static {
    /// Where the vault lives, for error reports.
    fn location(&self) -> PathBuf;

    /// Reads the committed blob.
    ///
    /// Returns `Ok(None)` only when the medium is present and holds no vault yet.
    /// A missing medium is `StoreError::DeviceUnavailable`, never `Ok(None)`.
    fn read(&self) -> Result<Option<EncryptedBlob>, StoreError>;

    /// Atomically replaces the committed blob.
    ///
    /// On any error the previously committed blob must remain intact and readable.
    fn write(&self, blob: &EncryptedBlob, cancel: &CancelFlag) -> Result<(), StoreError>;
}

impl<S: VaultStore + ?Sized> VaultStore for Arc<S> {
    fn location(&self) -> PathBuf {
        (**self).location()
    }

    fn read(&self) -> Result<Option<EncryptedBlob>, StoreError> {
        (**self).read()
    }

    fn write(&self, blob: &EncryptedBlob, cancel: &CancelFlag) -> Result<(), StoreError> {
        (**self).write(blob, cancel)
    }
}
