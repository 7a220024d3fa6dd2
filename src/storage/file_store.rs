//! Vault file on removable media, replaced atomically.

use super::format::EncryptedBlob;
use super::traits::{CancelFlag, StoreError, VaultStore};
use crate::common::config::StorageConfig;
use crate::common::errors::ConfigError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores the vault as a single file.
///
/// Writes go to a temporary file in the same directory, are flushed to the device and
/// then renamed over the committed file. The rename is the commit point: until it
/// happens the previous vault is untouched, and a half-written temporary file is never
/// visible under the vault's name.
#[derive(Debug, Clone)]
pub struct FileVaultStore {
    path: PathBuf,
    file_permissions: u32,
}

impl FileVaultStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file_permissions: 0o600,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            path: config.resolve_vault_path()?,
            file_permissions: config.file_permissions,
        })
    }

    pub fn with_permissions(mut self, mode: u32) -> Self {
        self.file_permissions = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 保险库所在目录（通常是 U 盘挂载点或其子目录）
    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn ensure_medium(&self) -> Result<(), StoreError> {
        match fs::metadata(self.dir()) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::DeviceUnavailable(self.dir().to_path_buf())),
            Err(e) => Err(self.classify(e)),
        }
    }

    /// Sorts an I/O error into "the device is gone" or an ordinary I/O failure.
    fn classify(&self, err: io::Error) -> StoreError {
        if !self.dir().is_dir() || is_device_error(&err) {
            StoreError::DeviceUnavailable(self.dir().to_path_buf())
        } else {
            StoreError::Io(err)
        }
    }

    #[cfg(unix)]
    fn restrict_permissions(&self, file: &fs::File) -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(self.file_permissions))
    }

    #[cfg(not(unix))]
    fn restrict_permissions(&self, _file: &fs::File) -> io::Result<()> {
        Ok(())
    }
}

impl VaultStore for FileVaultStore {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn read(&self) -> Result<Option<EncryptedBlob>, StoreError> {
        self.ensure_medium()?;

        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(EncryptedBlob::decode(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // 目录仍在才算“尚未创建保险库”，否则是设备被拔出
                self.ensure_medium()?;
                Ok(None)
            }
            Err(e) => Err(self.classify(e)),
        }
    }

    fn write(&self, blob: &EncryptedBlob, cancel: &CancelFlag) -> Result<(), StoreError> {
        self.ensure_medium()?;
        let bytes = blob
            .encode()
            .map_err(|e| StoreError::Io(io::Error::new(io::ErrorKind::InvalidInput, e)))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".vault-")
            .suffix(".tmp")
            .tempfile_in(self.dir())
            .map_err(|e| self.classify(e))?;

        self.restrict_permissions(tmp.as_file())
            .map_err(|e| self.classify(e))?;
        tmp.write_all(&bytes).map_err(|e| self.classify(e))?;
        tmp.as_file().sync_all().map_err(|e| self.classify(e))?;

        // Last point at which the write can be abandoned; the temp file is removed on drop.
        // Once the commit is claimed the caller waits for the rename instead of giving up.
        if !cancel.try_commit() {
            return Err(StoreError::Cancelled);
        }

        tmp.persist(&self.path)
            .map_err(|e| self.classify(e.error))?;

        // 提交后目录同步失败不回滚：新文件已经就位
        if let Err(e) = sync_dir(self.dir()) {
            warn!(path = %self.path.display(), error = %e, "directory sync after commit failed");
        }

        debug!(path = %self.path.display(), bytes = bytes.len(), "vault blob committed");
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// OS error codes that mean the medium went away rather than a plain I/O failure.
fn is_device_error(err: &io::Error) -> bool {
    #[cfg(unix)]
    const DEVICE_CODES: &[i32] = &[
        5,  // EIO
        6,  // ENXIO
        19, // ENODEV
    ];
    #[cfg(windows)]
    const DEVICE_CODES: &[i32] = &[
        21,   // ERROR_NOT_READY
        55,   // ERROR_DEV_NOT_EXIST
        1167, // ERROR_DEVICE_NOT_CONNECTED
    ];
    #[cfg(not(any(unix, windows)))]
    const DEVICE_CODES: &[i32] = &[];

    err.raw_os_error()
        .is_some_and(|code| DEVICE_CODES.contains(&code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::KdfParams;
    use crate::symmetric::CipherSuite;
    use tempfile::tempdir;

    fn blob(marker: u8) -> EncryptedBlob {
        EncryptedBlob {
            suite: CipherSuite::Aes256Gcm,
            kdf: KdfParams::argon2id(1024, 1, 1),
            salt: vec![marker; 16],
            nonce: vec![marker; 12],
            ciphertext: vec![marker; 40],
            tag: vec![marker; 16],
        }
    }

    #[test]
    fn absent_file_on_present_medium_is_first_run() {
        let dir = tempdir().unwrap();
        let store = FileVaultStore::new(dir.path().join("vault.bunker"));
        assert!(store.read().unwrap().is_none());
    }

    #[test]
    fn missing_medium_is_device_unavailable() {
        let dir = tempdir().unwrap();
        let store = FileVaultStore::new(dir.path().join("unmounted").join("vault.bunker"));
        assert!(matches!(store.read(), Err(StoreError::DeviceUnavailable(_))));
        assert!(matches!(
            store.write(&blob(1), &CancelFlag::new()),
            Err(StoreError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn write_replaces_and_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = FileVaultStore::new(dir.path().join("vault.bunker"));

        store.write(&blob(1), &CancelFlag::new()).unwrap();
        store.write(&blob(2), &CancelFlag::new()).unwrap();
        assert_eq!(store.read().unwrap(), Some(blob(2)));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("vault.bunker")]);
    }

    #[test]
    fn cancelled_write_keeps_previous_blob() {
        let dir = tempdir().unwrap();
        let store = FileVaultStore::new(dir.path().join("vault.bunker"));
        store.write(&blob(1), &CancelFlag::new()).unwrap();

        let cancel = CancelFlag::new();
        assert!(cancel.cancel());
        assert!(matches!(
            store.write(&blob(2), &cancel),
            Err(StoreError::Cancelled)
        ));
        assert_eq!(store.read().unwrap(), Some(blob(1)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.bunker");
        fs::write(&path, b"{\"legacy\": true}").unwrap();
        let store = FileVaultStore::new(&path);
        assert!(matches!(store.read(), Err(StoreError::Corrupt(_))));
    }

    #[cfg(unix)]
    #[test]
    fn committed_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let store = FileVaultStore::new(dir.path().join("vault.bunker"));
        store.write(&blob(1), &CancelFlag::new()).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
