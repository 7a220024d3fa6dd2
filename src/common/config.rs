//!
//! # 通用配置模块
//!
//! 包含保险库所使用的核心配置结构。
//! 这些结构定义了密钥派生参数、加密套件以及存储行为。
//!
use crate::common::errors::ConfigError;
use crate::kdf::KdfParams;
use crate::symmetric::CipherSuite;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default vault file name, placed next to the executable on the removable drive.
pub const DEFAULT_VAULT_FILE: &str = "vault.bunker";

/// 存储配置
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// 保险库文件的完整路径；为空时使用可执行文件所在目录
    #[serde(default)]
    pub vault_path: Option<PathBuf>,
    /// 默认路径下的文件名
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// 单次磁盘读写的超时（毫秒）
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
    /// 持久化文件权限（Unix文件模式，如0o600）
    #[serde(default = "default_file_permissions")]
    pub file_permissions: u32,
}

fn default_file_name() -> String {
    DEFAULT_VAULT_FILE.to_string()
}

fn default_io_timeout_ms() -> u64 {
    10_000
}

fn default_file_permissions() -> u32 {
    0o600 // 等同于 -rw-------
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            vault_path: None,
            file_name: default_file_name(),
            io_timeout_ms: default_io_timeout_ms(),
            file_permissions: default_file_permissions(),
        }
    }
}

impl StorageConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    /// Resolves where the vault file lives.
    ///
    /// An explicit `vault_path` wins. Otherwise the file sits in the same directory as
    /// the running executable, so the program and its vault travel together on the drive.
    pub fn resolve_vault_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.vault_path {
            return Ok(path.clone());
        }
        let exe = std::env::current_exe().map_err(ConfigError::ExecutableDir)?;
        let dir = exe.parent().ok_or_else(|| {
            ConfigError::ExecutableDir(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "executable has no parent directory",
            ))
        })?;
        Ok(dir.join(&self.file_name))
    }
}

/// Argon2id 代价参数，仅作用于新生成的密文块（首次创建与修改主密码）
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KdfConfig {
    /// 内存代价（KiB）
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// 迭代次数
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// 并行度
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    65_536 // 64 MiB
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    1
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

impl KdfConfig {
    pub fn params(&self) -> KdfParams {
        KdfParams::argon2id(self.memory_kib, self.iterations, self.parallelism)
    }

    /// Rejects costs that the key derivation would refuse at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params()
            .check()
            .map_err(|e| ConfigError::Kdf(e.to_string()))
    }
}

/// 完整配置文件
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct VaultConfig {
    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,
    /// 密钥派生配置
    #[serde(default)]
    pub kdf: KdfConfig,
    /// 新密文块使用的加密套件
    #[serde(default)]
    pub cipher: CipherSuite,
}

impl VaultConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: VaultConfig = serde_json::from_str(&contents)?;
        config.kdf.validate()?;
        Ok(config)
    }

    /// 从环境变量加载配置（在默认值之上覆盖）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// 用环境变量覆盖当前配置
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BUNKER_VAULT_PATH") {
            self.storage.vault_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("BUNKER_IO_TIMEOUT_MS") {
            self.storage.io_timeout_ms = parse_var("BUNKER_IO_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("BUNKER_KDF_MEMORY_KIB") {
            self.kdf.memory_kib = parse_var("BUNKER_KDF_MEMORY_KIB", &value)?;
        }
        if let Some(value) = lookup("BUNKER_KDF_ITERATIONS") {
            self.kdf.iterations = parse_var("BUNKER_KDF_ITERATIONS", &value)?;
        }
        if let Some(value) = lookup("BUNKER_KDF_PARALLELISM") {
            self.kdf.parallelism = parse_var("BUNKER_KDF_PARALLELISM", &value)?;
        }
        if let Some(value) = lookup("BUNKER_CIPHER") {
            self.cipher = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BUNKER_CIPHER".to_string(),
                value,
            })?;
        }
        self.kdf.validate()?;
        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_sane() {
        let config = VaultConfig::default();
        assert_eq!(config.storage.file_name, DEFAULT_VAULT_FILE);
        assert_eq!(config.storage.file_permissions, 0o600);
        assert_eq!(config.storage.io_timeout(), Duration::from_secs(10));
        assert_eq!(config.kdf.memory_kib, 65_536);
        assert_eq!(config.cipher, CipherSuite::Aes256Gcm);
        assert!(config.kdf.validate().is_ok());
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = VaultConfig::default()
            .apply_vars(lookup_from(&[
                ("BUNKER_VAULT_PATH", "/media/usb/vault.bunker"),
                ("BUNKER_IO_TIMEOUT_MS", "2500"),
                ("BUNKER_KDF_MEMORY_KIB", "1024"),
                ("BUNKER_KDF_ITERATIONS", "2"),
            ]))
            .unwrap();

        assert_eq!(
            config.storage.vault_path,
            Some(PathBuf::from("/media/usb/vault.bunker"))
        );
        assert_eq!(config.storage.io_timeout_ms, 2500);
        assert_eq!(config.kdf.memory_kib, 1024);
        assert_eq!(config.kdf.iterations, 2);
        assert_eq!(config.kdf.parallelism, 1);
    }

    #[test]
    fn malformed_env_value_is_rejected() {
        let err = VaultConfig::default()
            .apply_vars(lookup_from(&[("BUNKER_KDF_ITERATIONS", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = VaultConfig::default()
            .apply_vars(lookup_from(&[("BUNKER_KDF_ITERATIONS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Kdf(_)));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "kdf": { "iterations": 4 } }"#).unwrap();

        let config = VaultConfig::from_file(&path).unwrap();
        assert_eq!(config.kdf.iterations, 4);
        assert_eq!(config.kdf.memory_kib, 65_536);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn explicit_vault_path_wins() {
        let storage = StorageConfig {
            vault_path: Some(PathBuf::from("/mnt/stick/secrets.bunker")),
            ..StorageConfig::default()
        };
        assert_eq!(
            storage.resolve_vault_path().unwrap(),
            PathBuf::from("/mnt/stick/secrets.bunker")
        );

        let beside_exe = StorageConfig::default().resolve_vault_path().unwrap();
        assert!(beside_exe.ends_with(DEFAULT_VAULT_FILE));
    }
}
