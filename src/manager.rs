//! # 保险库管理器
//!
//! `VaultManager` owns the locked/unlocked state machine. Every operation runs inside
//! one async critical section, so saves, deletes, unlocks and password changes are
//! strictly serialized against each other. Slow work (key derivation and disk I/O)
//! runs on the blocking pool while the critical section is held.
//!
//! Every mutation is write-through: the in-memory index is changed, the whole index is
//! sealed and committed to the store, and the in-memory change is undone if the commit
//! fails. After any failed operation the index and the file agree again.

mod blocking;
mod session;

use self::session::{Session, open_blob, seal_index};
use crate::common::config::VaultConfig;
use crate::common::errors::{ConfigError, Result, VaultError};
use crate::kdf;
use crate::storage::{FileVaultStore, VaultStore};
use crate::vault::{Entry, EntryIndex};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct VaultManager {
    store: Arc<dyn VaultStore>,
    config: VaultConfig,
    /// `None` while locked.
    session: Mutex<Option<Session>>,
}

impl VaultManager {
    /// Creates a locked manager on top of `store`.
    pub fn new<S: VaultStore>(store: S, config: VaultConfig) -> Self {
        Self::with_store(Arc::new(store), config)
    }

    pub fn with_store(store: Arc<dyn VaultStore>, config: VaultConfig) -> Self {
        Self {
            store,
            config,
            session: Mutex::new(None),
        }
    }

    /// Creates a locked manager backed by the vault file the configuration points at.
    pub fn from_config(config: VaultConfig) -> std::result::Result<Self, ConfigError> {
        config.kdf.validate()?;
        let store = FileVaultStore::from_config(&config.storage)?;
        info!(path = %store.path().display(), "vault manager ready");
        Ok(Self::new(store, config))
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub async fn is_unlocked(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Whether a vault has already been created on the medium.
    pub async fn vault_exists(&self) -> Result<bool> {
        let blob = blocking::read_blob(&self.store, self.config.storage.io_timeout()).await?;
        Ok(blob.is_some())
    }

    /// Unlocks the vault, creating an empty one on first run.
    ///
    /// A wrong password and a damaged vault file both fail with
    /// `VaultError::AuthenticationFailure`; in either case the manager stays locked.
    /// Unlocking while already unlocked discards the current session first.
    pub async fn unlock(&self, password: &SecretString) -> Result<()> {
        let mut guard = self.session.lock().await;
        if guard.take().is_some() {
            debug!("discarding active session before unlocking again");
        }

        let limit = self.config.storage.io_timeout();
        let existing = match blocking::read_blob(&self.store, limit).await {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "unlock failed while reading the vault");
                return Err(e);
            }
        };

        let session = match existing {
            Some(blob) => {
                let key = blocking::derive_key(password, blob.salt.clone(), blob.kdf).await?;
                let index = match open_blob(&key, &blob) {
                    Ok(index) => index,
                    Err(e) => {
                        warn!(error = %e, "unlock rejected");
                        return Err(e);
                    }
                };
                info!(entries = index.len(), "vault unlocked");
                Session {
                    key,
                    salt: blob.salt,
                    kdf: blob.kdf,
                    suite: blob.suite,
                    index,
                }
            }
            None => {
                if password.expose_secret().is_empty() {
                    return Err(VaultError::InvalidInput(
                        "master password must not be empty".into(),
                    ));
                }
                let salt = kdf::generate_salt()?;
                let params = self.config.kdf.params();
                let key = blocking::derive_key(password, salt.clone(), params).await?;
                let session = Session {
                    key,
                    salt,
                    kdf: params,
                    suite: self.config.cipher,
                    index: EntryIndex::new(),
                };
                // 首次运行：只有写入成功才进入解锁状态
                blocking::write_blob(&self.store, session.seal()?, limit).await?;
                info!(cipher = %session.suite, "created new vault");
                session
            }
        };

        *guard = Some(session);
        Ok(())
    }

    /// Drops the session and wipes the key and all entries. Idempotent.
    pub async fn lock(&self) {
        if self.session.lock().await.take().is_some() {
            info!("vault locked");
        }
    }

    /// Entries whose link or user contains `filter`, ignoring case.
    ///
    /// An empty filter returns every entry. Ordered by link, user, then id.
    pub async fn get_entries(&self, filter: &str) -> Result<Vec<Entry>> {
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(VaultError::NotUnlocked)?;
        Ok(session.index.filter(filter))
    }

    pub async fn get_entry(&self, id: &str) -> Result<Entry> {
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(VaultError::NotUnlocked)?;
        session
            .index
            .get(id)
            .cloned()
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    /// Inserts or replaces the entry with the same id and commits the vault.
    pub async fn save_entry(&self, entry: Entry) -> Result<()> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(VaultError::NotUnlocked)?;
        if entry.id.trim().is_empty() {
            return Err(VaultError::InvalidInput("entry id must not be empty".into()));
        }

        let id = entry.id.clone();
        let previous = session.index.upsert(entry);
        let replaced = previous.is_some();
        if let Err(e) = self.commit(session).await {
            session.index.restore(&id, previous);
            warn!(%id, error = %e, "save rolled back");
            return Err(e);
        }
        debug!(%id, replaced, "entry saved");
        Ok(())
    }

    /// Removes the entry with `id` and commits the vault.
    ///
    /// Deleting an id that does not exist succeeds without touching the store.
    pub async fn delete_entry(&self, id: &str) -> Result<()> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(VaultError::NotUnlocked)?;

        let Some(removed) = session.index.remove(id) else {
            debug!(%id, "delete of unknown entry ignored");
            return Ok(());
        };
        if let Err(e) = self.commit(session).await {
            session.index.restore(id, Some(removed));
            warn!(%id, error = %e, "delete rolled back");
            return Err(e);
        }
        debug!(%id, "entry deleted");
        Ok(())
    }

    /// Re-encrypts the vault under a key derived from `new_password`.
    ///
    /// A fresh salt is drawn and the configured KDF costs and cipher are applied, so
    /// rotating also upgrades older vaults. If the commit fails the vault, the session
    /// and the old password stay exactly as they were.
    pub async fn change_master_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<()> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(VaultError::NotUnlocked)?;
        if new_password.expose_secret().is_empty() {
            return Err(VaultError::InvalidInput(
                "new master password must not be empty".into(),
            ));
        }

        let candidate =
            blocking::derive_key(old_password, session.salt.clone(), session.kdf).await?;
        if !candidate.matches(&session.key) {
            warn!("master password change rejected");
            return Err(VaultError::AuthenticationFailure);
        }

        let salt = kdf::generate_salt()?;
        let params = self.config.kdf.params();
        let suite = self.config.cipher;
        let key = blocking::derive_key(new_password, salt.clone(), params).await?;
        let blob = seal_index(&key, suite, params, &salt, &session.index)?;

        // 写入前确认新密文可以用新密钥打开
        match open_blob(&key, &blob) {
            Ok(check) if check.len() == session.index.len() => {}
            _ => {
                return Err(VaultError::Internal(
                    "re-encrypted vault failed verification".into(),
                ));
            }
        }

        blocking::write_blob(&self.store, blob, self.config.storage.io_timeout()).await?;

        session.key = key;
        session.salt = salt;
        session.kdf = params;
        session.suite = suite;
        info!(cipher = %suite, "master password changed");
        Ok(())
    }

    async fn commit(&self, session: &Session) -> Result<()> {
        let blob = session.seal()?;
        blocking::write_blob(&self.store, blob, self.config.storage.io_timeout()).await
    }
}
