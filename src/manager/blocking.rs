//! 在阻塞线程池中执行 KDF 和磁盘 I/O，避免卡住异步执行器。

use crate::common::errors::{Result, VaultError};
use crate::kdf::{self, DerivedKey, KdfParams};
use crate::storage::{CancelFlag, EncryptedBlob, VaultStore};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::warn;

pub(crate) async fn derive_key(
    password: &SecretString,
    salt: Vec<u8>,
    params: KdfParams,
) -> Result<DerivedKey> {
    let password = SecretString::from(password.expose_secret().to_owned());
    let key = task::spawn_blocking(move || kdf::derive(&password, &salt, &params)).await??;
    Ok(key)
}

/// Reads the committed blob, giving up after `limit`.
///
/// A read that does not finish in time is reported as an unavailable device; the
/// blocked thread is left to finish on its own and its result is discarded.
pub(crate) async fn read_blob(
    store: &Arc<dyn VaultStore>,
    limit: Duration,
) -> Result<Option<EncryptedBlob>> {
    let worker = Arc::clone(store);
    let handle = task::spawn_blocking(move || worker.read());
    match tokio::time::timeout(limit, handle).await {
        Ok(joined) => Ok(joined??),
        Err(_) => {
            warn!(path = %store.location().display(), ?limit, "vault read timed out");
            Err(VaultError::DeviceUnavailable(store.location()))
        }
    }
}

/// Atomically replaces the committed blob, giving up after `limit`.
///
/// On timeout the write is cancelled before being reported as failed, so the store
/// never commits a blob whose write the caller already saw fail. If the store had
/// already claimed the commit, the cancel loses and this waits for the store's own
/// result instead: the caller learns what is really on disk.
pub(crate) async fn write_blob(
    store: &Arc<dyn VaultStore>,
    blob: EncryptedBlob,
    limit: Duration,
) -> Result<()> {
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();
    let worker = Arc::clone(store);
    let mut handle = task::spawn_blocking(move || worker.write(&blob, &worker_cancel));
    match tokio::time::timeout(limit, &mut handle).await {
        Ok(joined) => Ok(joined??),
        Err(_) if cancel.cancel() => {
            warn!(path = %store.location().display(), ?limit, "vault write timed out");
            Err(VaultError::DeviceUnavailable(store.location()))
        }
        Err(_) => {
            warn!(
                path = %store.location().display(),
                ?limit,
                "vault write overran its timeout while committing; waiting for the outcome"
            );
            Ok(handle.await??)
        }
    }
}
