//! Defines the data structures exchanged between the vault engine and the presentation shell.
use crate::common::errors::VaultError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The category of a failed command, as the shell sees it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Wrong password, or a corrupted/tampered vault file. The two are not told apart.
    AuthenticationFailure,
    /// The removable medium is missing or was removed mid-operation.
    DeviceUnavailable,
    /// Write, flush or rename failed for some other reason (e.g. disk full).
    IoFailure,
    /// The command needs an unlocked vault.
    NotUnlocked,
    NotFound,
    InvalidInput,
    /// The command is not available in this build or configuration.
    Unsupported,
    Internal,
}

/// A failed command, ready to be serialized back to the shell.
///
/// The message is meant for display. It never contains passwords or entry contents.
#[derive(Error, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<VaultError> for CommandError {
    fn from(err: VaultError) -> Self {
        let kind = match &err {
            VaultError::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            VaultError::DeviceUnavailable(_) => ErrorKind::DeviceUnavailable,
            VaultError::IoFailure(_) => ErrorKind::IoFailure,
            VaultError::NotUnlocked => ErrorKind::NotUnlocked,
            VaultError::NotFound(_) => ErrorKind::NotFound,
            VaultError::InvalidInput(_) => ErrorKind::InvalidInput,
            VaultError::Internal(_) => ErrorKind::Internal,
        };
        Self::new(kind, err.to_string())
    }
}

/// 剪贴板透传：由宿主程序提供具体的系统调用实现
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), CommandError>;
}
