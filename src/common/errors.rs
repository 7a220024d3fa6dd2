use crate::kdf::KdfError;
use crate::storage::StoreError;
use crate::symmetric::errors::SymmetricError;
use std::path::PathBuf;
use thiserror::Error;

/// 保险库对调用方暴露的错误类型
///
/// `AuthenticationFailure` deliberately covers both a wrong master password and a
/// corrupted or tampered vault file; callers cannot tell the two apart.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("authentication failed")]
    AuthenticationFailure,

    #[error("storage device unavailable: {}", .0.display())]
    DeviceUnavailable(PathBuf),

    #[error("I/O failure")]
    IoFailure(#[source] std::io::Error),

    #[error("vault is locked")]
    NotUnlocked,

    #[error("entry not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = VaultError> = std::result::Result<T, E>;

// 所有底层错误都在这里被折叠成调用方可见的分类
impl From<StoreError> for VaultError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt(_) => VaultError::AuthenticationFailure,
            StoreError::DeviceUnavailable(path) => VaultError::DeviceUnavailable(path),
            StoreError::Io(e) => VaultError::IoFailure(e),
            StoreError::Cancelled => VaultError::IoFailure(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                "write abandoned before commit",
            )),
        }
    }
}

impl From<SymmetricError> for VaultError {
    fn from(err: SymmetricError) -> Self {
        match err {
            SymmetricError::AuthenticationFailure => VaultError::AuthenticationFailure,
            other => VaultError::Internal(other.to_string()),
        }
    }
}

impl From<KdfError> for VaultError {
    fn from(err: KdfError) -> Self {
        VaultError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Internal(format!("payload serialization: {err}"))
    }
}

impl From<tokio::task::JoinError> for VaultError {
    fn from(err: tokio::task::JoinError) -> Self {
        VaultError::Internal(format!("background task failed: {err}"))
    }
}

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("invalid KDF parameters: {0}")]
    Kdf(String),

    #[error("cannot locate the running executable")]
    ExecutableDir(#[source] std::io::Error),
}
