//! 面向展示层的命令入口
//!
//! Each method is one call the shell can issue. Failures come back as
//! [`CommandError`], which serializes cleanly for rendering.

use crate::common::errors::VaultError;
use crate::contract::{Clipboard, CommandError, ErrorKind};
use crate::manager::VaultManager;
use crate::vault::Entry;
use secrecy::SecretString;
use std::sync::Arc;

pub struct VaultCommands {
    manager: Arc<VaultManager>,
    clipboard: Option<Arc<dyn Clipboard>>,
}

impl VaultCommands {
    pub fn new(manager: Arc<VaultManager>) -> Self {
        Self {
            manager,
            clipboard: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn manager(&self) -> &Arc<VaultManager> {
        &self.manager
    }

    /// `Ok(false)` for a wrong password or a damaged vault file.
    pub async fn unlock(&self, password: String) -> Result<bool, CommandError> {
        let password = SecretString::from(password);
        accepted(self.manager.unlock(&password).await)
    }

    pub async fn lock(&self) {
        self.manager.lock().await;
    }

    /// `Ok(false)` when the old password is wrong; the vault is left untouched.
    pub async fn change_master_password(
        &self,
        old_password: String,
        new_password: String,
    ) -> Result<bool, CommandError> {
        let old_password = SecretString::from(old_password);
        let new_password = SecretString::from(new_password);
        accepted(
            self.manager
                .change_master_password(&old_password, &new_password)
                .await,
        )
    }

    pub async fn get_entries(&self, filter: Option<String>) -> Result<Vec<Entry>, CommandError> {
        Ok(self
            .manager
            .get_entries(filter.as_deref().unwrap_or_default())
            .await?)
    }

    pub async fn save_entry(&self, entry: Entry) -> Result<(), CommandError> {
        Ok(self.manager.save_entry(entry).await?)
    }

    pub async fn delete_entry(&self, id: String) -> Result<(), CommandError> {
        Ok(self.manager.delete_entry(&id).await?)
    }

    pub fn copy_to_clipboard(&self, text: &str) -> Result<(), CommandError> {
        match &self.clipboard {
            Some(clipboard) => clipboard.set_text(text),
            None => Err(CommandError::new(
                ErrorKind::Unsupported,
                "no clipboard available",
            )),
        }
    }
}

/// Folds an authentication failure into `false`; every other error stays an error.
fn accepted(result: Result<(), VaultError>) -> Result<bool, CommandError> {
    match result {
        Ok(()) => Ok(true),
        Err(VaultError::AuthenticationFailure) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{KdfConfig, VaultConfig};
    use crate::storage::FileVaultStore;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingClipboard(Mutex<Vec<String>>);

    impl Clipboard for RecordingClipboard {
        fn set_text(&self, text: &str) -> Result<(), CommandError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn commands(dir: &std::path::Path) -> VaultCommands {
        let config = VaultConfig {
            kdf: KdfConfig {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..VaultConfig::default()
        };
        let store = FileVaultStore::new(dir.join("vault.bunker"));
        VaultCommands::new(Arc::new(VaultManager::new(store, config)))
    }

    #[tokio::test]
    async fn wrong_password_is_false_not_an_error() {
        let dir = tempdir().unwrap();
        let cmds = commands(dir.path());
        assert!(cmds.unlock("right".into()).await.unwrap());
        cmds.lock().await;
        assert!(!cmds.unlock("wrong".into()).await.unwrap());
    }

    #[tokio::test]
    async fn locked_listing_is_a_contract_error() {
        let dir = tempdir().unwrap();
        let cmds = commands(dir.path());
        let err = cmds.get_entries(None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotUnlocked);
    }

    #[tokio::test]
    async fn change_password_reports_wrong_old_password_as_false() {
        let dir = tempdir().unwrap();
        let cmds = commands(dir.path());
        cmds.unlock("old".into()).await.unwrap();
        let rejected = cmds.change_master_password("nope".into(), "new".into());
        assert!(!rejected.await.unwrap());
        let accepted = cmds.change_master_password("old".into(), "new".into());
        assert!(accepted.await.unwrap());
    }

    #[test]
    fn clipboard_is_forwarded_when_present() {
        let dir = tempdir().unwrap();
        let recorder = Arc::new(RecordingClipboard::default());
        let cmds = commands(dir.path()).with_clipboard(recorder.clone());

        cmds.copy_to_clipboard("hunter2").unwrap();
        assert_eq!(*recorder.0.lock().unwrap(), vec!["hunter2".to_string()]);
    }

    #[test]
    fn clipboard_is_unsupported_without_backend() {
        let dir = tempdir().unwrap();
        let err = commands(dir.path()).copy_to_clipboard("x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unsupported);
    }
}
