//!
//! 集成测试的通用辅助函数
//!
#![allow(dead_code)]

use bunker_vault::storage::{CancelFlag, EncryptedBlob, StoreError};
use bunker_vault::{FileVaultStore, KdfConfig, VaultConfig, VaultManager, VaultStore};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

pub const VAULT_FILE: &str = "vault.bunker";

/// 测试用的廉价 KDF 参数，避免每次解锁都花费 64 MiB 和数百毫秒
pub fn fast_config() -> VaultConfig {
    VaultConfig {
        kdf: KdfConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        ..VaultConfig::default()
    }
}

pub fn pw(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 故障注入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Fault {
    None = 0,
    /// 写入一半后失败（模拟磁盘写满或写入中断）
    PartialWrite = 1,
    /// 设备被拔出
    Unplugged = 2,
}

/// Wraps a real file store and injects failures on demand.
pub struct FaultyStore {
    inner: FileVaultStore,
    fault: AtomicU8,
    writes: AtomicUsize,
}

impl FaultyStore {
    pub fn new(path: &Path) -> Self {
        Self {
            inner: FileVaultStore::new(path),
            fault: AtomicU8::new(Fault::None as u8),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn set_fault(&self, fault: Fault) {
        self.fault.store(fault as u8, Ordering::SeqCst);
    }

    /// Number of writes that reached the committed file.
    pub fn committed_writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn current(&self) -> Fault {
        match self.fault.load(Ordering::SeqCst) {
            1 => Fault::PartialWrite,
            2 => Fault::Unplugged,
            _ => Fault::None,
        }
    }

    fn dir(&self) -> PathBuf {
        self.inner
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

impl VaultStore for FaultyStore {
    fn location(&self) -> PathBuf {
        self.inner.location()
    }

    fn read(&self) -> Result<Option<EncryptedBlob>, StoreError> {
        match self.current() {
            Fault::Unplugged => Err(StoreError::DeviceUnavailable(self.dir())),
            _ => self.inner.read(),
        }
    }

    fn write(&self, blob: &EncryptedBlob, cancel: &CancelFlag) -> Result<(), StoreError> {
        match self.current() {
            Fault::None => {
                self.inner.write(blob, cancel)?;
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Fault::PartialWrite => {
                // 半截数据落在旁边的临时文件里，已提交的文件不受影响
                let bytes = blob
                    .encode()
                    .map_err(|e| StoreError::Io(std::io::Error::other(e)))?;
                let torn = self.dir().join(".vault-torn.tmp");
                std::fs::write(&torn, &bytes[..bytes.len() / 2]).map_err(StoreError::Io)?;
                Err(StoreError::Io(std::io::Error::other("no space left on device")))
            }
            Fault::Unplugged => Err(StoreError::DeviceUnavailable(self.dir())),
        }
    }
}

/// A manager over a `FaultyStore` in `dir`, plus a handle to the store for fault control.
pub fn faulty_manager(dir: &Path) -> (VaultManager, Arc<FaultyStore>) {
    let store = Arc::new(FaultyStore::new(&dir.join(VAULT_FILE)));
    let manager = VaultManager::with_store(store.clone(), fast_config());
    (manager, store)
}

pub fn file_manager(dir: &Path) -> VaultManager {
    VaultManager::new(FileVaultStore::new(dir.join(VAULT_FILE)), fast_config())
}
